//! Review files for documents that need manual correction.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::issues::IssueLog;

/// Output directories of the review workflow.
#[derive(Debug, Clone)]
pub struct ReviewDirs {
    pub logs: PathBuf,
    pub text: PathBuf,
}

impl ReviewDirs {
    pub fn log_path(&self, id: &str) -> PathBuf {
        self.logs.join(format!("{id}-log.json"))
    }

    pub fn text_path(&self, id: &str) -> PathBuf {
        self.text.join(format!("{id}.txt"))
    }
}

/// Persist the issue log and raw text of a flagged document, or remove a
/// stale log for a clean one. Returns the number of logged issues.
///
/// An existing raw-text file is never overwritten: it may carry reviewer edits.
pub fn write_review(dirs: &ReviewDirs, id: &str, issues: &IssueLog, text: &str) -> Result<usize> {
    let log_path = dirs.log_path(id);
    if issues.is_clean() {
        if log_path.exists() {
            fs::remove_file(&log_path)?;
        }
        return Ok(0);
    }

    write_if_absent(&dirs.text_path(id), text)?;
    fs::create_dir_all(&dirs.logs)?;
    fs::write(&log_path, serde_json::to_string_pretty(issues)?)?;
    Ok(issues.total())
}

fn write_if_absent(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::Field;
    use tempfile::TempDir;

    fn dirs(root: &Path) -> ReviewDirs {
        ReviewDirs {
            logs: root.join("logs"),
            text: root.join("txt"),
        }
    }

    #[test]
    fn flagged_document_writes_log_and_text() {
        let root = TempDir::new().unwrap();
        let dirs = dirs(root.path());
        let mut issues = IssueLog::new();
        issues.log(Field::Abstract, "Abstract is empty");

        let count = write_review(&dirs, "p1", &issues, "raw text").unwrap();
        assert_eq!(count, 1);
        assert!(dirs.log_path("p1").exists());
        assert_eq!(fs::read_to_string(dirs.text_path("p1")).unwrap(), "raw text");
    }

    #[test]
    fn existing_text_is_kept() {
        let root = TempDir::new().unwrap();
        let dirs = dirs(root.path());
        fs::create_dir_all(&dirs.text).unwrap();
        fs::write(dirs.text_path("p1"), "edited by reviewer").unwrap();

        let mut issues = IssueLog::new();
        issues.log(Field::Keywords, "x");
        write_review(&dirs, "p1", &issues, "fresh extraction").unwrap();

        assert_eq!(
            fs::read_to_string(dirs.text_path("p1")).unwrap(),
            "edited by reviewer"
        );
    }

    #[test]
    fn clean_document_removes_stale_log() {
        let root = TempDir::new().unwrap();
        let dirs = dirs(root.path());
        fs::create_dir_all(&dirs.logs).unwrap();
        fs::write(dirs.log_path("p1"), "{}").unwrap();

        let count = write_review(&dirs, "p1", &IssueLog::new(), "raw").unwrap();
        assert_eq!(count, 0);
        assert!(!dirs.log_path("p1").exists());
        assert!(!dirs.text_path("p1").exists());
    }
}
