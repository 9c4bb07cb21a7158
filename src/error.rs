use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid timestamp '{value}': {reason}")]
    Parse { value: String, reason: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("issue {0} not found in source")]
    IssueNotFound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FlowError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse_error",
            Self::MissingField(_) => "missing_field",
            Self::IssueNotFound(_) => "issue_not_found",
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvalidDate(_) => "invalid_date",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Yaml(_) => "yaml_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
