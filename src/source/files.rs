use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FlowError, Result};
use crate::model::IssueRecord;
use crate::source::jira::{RawIssue, parse_document};

/// Issue payloads exported from the tracker onto disk.
///
/// Layout: either a single JSON document, or a directory whose `*.json` files are
/// read in file-name order. Each document may hold one issue, an array of issues,
/// or a search response.
pub struct IssueSource {
    root: PathBuf,
}

impl IssueSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FlowError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("issue source '{}' does not exist", path.display()),
            )));
        }
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    pub fn document_paths(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    pub fn read_raw(&self) -> Result<Vec<RawIssue>> {
        let mut issues = Vec::new();
        for path in self.document_paths()? {
            let data = fs::read_to_string(&path)?;
            let parsed = parse_document(&data)?;
            tracing::debug!(
                path = %path.display(),
                issues = parsed.len(),
                "read issue document"
            );
            issues.extend(parsed);
        }
        Ok(issues)
    }

    /// Every issue in the source, converted to typed records.
    ///
    /// A malformed timestamp or missing creation date fails the whole load.
    pub fn list_all(&self) -> Result<Vec<IssueRecord>> {
        self.read_raw()?
            .into_iter()
            .map(IssueRecord::try_from)
            .collect()
    }

    /// Look up one issue by key without converting the others.
    pub fn read(&self, key: &str) -> Result<IssueRecord> {
        let raw = self
            .read_raw()?
            .into_iter()
            .find(|issue| issue.key == key)
            .ok_or_else(|| FlowError::IssueNotFound(key.to_string()))?;
        IssueRecord::try_from(raw)
    }
}
