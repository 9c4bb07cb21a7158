pub mod files;
pub mod jira;
pub mod query;

pub use files::IssueSource;
pub use jira::{RawIssue, parse_document};
pub use query::IssueQuery;
