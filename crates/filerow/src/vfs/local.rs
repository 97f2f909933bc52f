//! Local file system implementation, handling plain paths and `file://` URIs.

use super::{FileHandle, FileInfo, FileSystem};
use crate::Result;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// The local disk, addressed by plain paths or `file://` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn resolve(&self, location: &str) -> PathBuf {
        PathBuf::from(strip_file_scheme(location))
    }
}

fn strip_file_scheme(location: &str) -> &str {
    location.strip_prefix("file://").unwrap_or(location)
}

impl FileSystem for LocalFileSystem {
    fn open(&self, location: &str) -> Result<Box<dyn FileHandle>> {
        let path = self.resolve(location);
        let file = File::open(&path)?;
        Ok(Box::new(LocalFileHandle {
            location: location.to_string(),
            path,
            file,
        }))
    }

    fn exists(&self, location: &str) -> bool {
        self.resolve(location).exists()
    }

    fn readable(&self, location: &str) -> bool {
        File::open(self.resolve(location)).is_ok()
    }
}

struct LocalFileHandle {
    location: String,
    path: PathBuf,
    file: File,
}

impl FileHandle for LocalFileHandle {
    fn location(&self) -> &str {
        &self.location
    }

    fn info(&self) -> Result<FileInfo> {
        let metadata = self.file.metadata()?;
        let absolute = std::path::absolute(&self.path)?;
        let base_name = file_name_of(&absolute);
        Ok(FileInfo {
            size: metadata.len(),
            // Dotfile convention; Windows hidden attributes are out of scope
            // for the local backend.
            hidden: base_name.starts_with('.'),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            extension: absolute
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
            parent_path: absolute
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            path: absolute.display().to_string(),
            uri: format!("file://{}", absolute.display()),
            root_uri: "file:///".to_string(),
            base_name,
        })
    }

    fn reader(&mut self) -> Result<Box<dyn Read + '_>> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(Box::new(&mut self.file))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
