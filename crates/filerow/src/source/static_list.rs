//! Static mode: a pre-resolved, validated file list.

use super::NextFile;
use crate::vfs::FileSystem;
use crate::{FilerowError, Result};
use tracing::error;

/// An ordered list of file locations, validated up front.
///
/// Validation is fail-fast: a run never starts against a list with missing
/// or unreadable files, and the error names every offending path at once.
#[derive(Debug)]
pub struct StaticFileList {
    files: Vec<String>,
    index: usize,
}

impl StaticFileList {
    /// Validate and build the list.
    ///
    /// Files reported non-existent are collected and raised as one
    /// configuration error; files that exist but are not accessible are
    /// checked second and raised the same way.
    pub fn new(files: Vec<String>, fs: &dyn FileSystem) -> Result<Self> {
        let missing: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|f| !fs.exists(f))
            .collect();
        if !missing.is_empty() {
            let message = format!("required files do not exist: {}", missing.join(", "));
            error!("{message}");
            return Err(FilerowError::configuration(message));
        }

        let inaccessible: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|f| !fs.readable(f))
            .collect();
        if !inaccessible.is_empty() {
            let message = format!(
                "required files are not accessible: {}",
                inaccessible.join(", ")
            );
            error!("{message}");
            return Err(FilerowError::configuration(message));
        }

        Ok(Self { files, index: 0 })
    }

    /// Pop the next entry by index; `None` once the list is consumed.
    pub fn next_file(&mut self) -> Option<NextFile> {
        let location = self.files.get(self.index)?.clone();
        self.index += 1;
        Some(NextFile {
            location,
            passthrough: None,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::LocalFileSystem;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_pops_in_input_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let files = vec![
            b.to_str().unwrap().to_string(),
            a.to_str().unwrap().to_string(),
        ];
        let mut list = StaticFileList::new(files.clone(), &LocalFileSystem::new()).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.next_file().unwrap().location, files[0]);
        assert_eq!(list.next_file().unwrap().location, files[1]);
        assert!(list.next_file().is_none());
        assert!(list.next_file().is_none());
    }

    #[test]
    fn test_missing_files_listed_in_one_error() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present.txt");
        fs::write(&present, "x").unwrap();

        let files = vec![
            present.to_str().unwrap().to_string(),
            "/nonexistent/one.txt".to_string(),
            "/nonexistent/two.txt".to_string(),
        ];
        let err = StaticFileList::new(files, &LocalFileSystem::new()).unwrap_err();

        assert!(matches!(err, FilerowError::Configuration { .. }));
        let message = err.to_string();
        assert!(message.contains("/nonexistent/one.txt"));
        assert!(message.contains("/nonexistent/two.txt"));
        assert!(!message.contains("present.txt"));
    }

    #[test]
    fn test_static_has_no_passthrough() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, "a").unwrap();

        let mut list = StaticFileList::new(
            vec![a.to_str().unwrap().to_string()],
            &LocalFileSystem::new(),
        )
        .unwrap();
        assert!(list.next_file().unwrap().passthrough.is_none());
    }
}
