use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Environment variable consulted when no `--config` path is given.
pub const CONFIG_ENV: &str = "FLOWTIME_CONFIG";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Exact,
    /// Trims surrounding whitespace and ignores case.
    CaseInsensitive,
}

/// How a workflow status is recognized in changelog items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRule {
    pub name: String,
    #[serde(default, rename = "match")]
    pub mode: MatchMode,
}

impl StatusRule {
    pub fn exact(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: MatchMode::Exact,
        }
    }

    pub fn case_insensitive(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: MatchMode::CaseInsensitive,
        }
    }

    pub fn matches(&self, status: Option<&str>) -> bool {
        let Some(status) = status else {
            return false;
        };
        match self.mode {
            MatchMode::Exact => status == self.name,
            MatchMode::CaseInsensitive => status.trim().eq_ignore_ascii_case(self.name.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusRules {
    pub in_progress: StatusRule,
    pub in_review: StatusRule,
    pub done: StatusRule,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self {
            in_progress: StatusRule::exact("In Progress"),
            in_review: StatusRule::case_insensitive("In Review"),
            done: StatusRule::exact("Done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub statuses: StatusRules,
    /// Offset applied to date-only window bounds, e.g. `+00:00` or `-0500`.
    pub reference_offset: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            statuses: StatusRules::default(),
            reference_offset: "+00:00".to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Load from an explicit path, falling back to `$FLOWTIME_CONFIG`, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(&path)?;
        let config = Self::from_yaml(&raw).map_err(|err| match err {
            FlowError::Yaml(yaml_err) => {
                FlowError::InvalidConfig(format!("{}: {yaml_err}", path.display()))
            }
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded workflow config");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, rule) in [
            ("in_progress", &self.statuses.in_progress),
            ("in_review", &self.statuses.in_review),
            ("done", &self.statuses.done),
        ] {
            if rule.name.trim().is_empty() {
                return Err(FlowError::InvalidConfig(format!(
                    "statuses.{label}.name cannot be empty"
                )));
            }
        }
        self.offset()?;
        Ok(())
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        self.reference_offset.trim().parse().map_err(|_| {
            FlowError::InvalidConfig(format!(
                "reference_offset '{}' is not a +HH:MM offset",
                self.reference_offset
            ))
        })
    }
}
