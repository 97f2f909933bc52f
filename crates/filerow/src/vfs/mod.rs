//! Virtual file system seam.
//!
//! The stage never touches `std::fs` directly; it goes through the
//! [`FileSystem`] and [`FileHandle`] traits so remote or in-memory file
//! systems can be plugged in. Closing a handle is `Drop`.

mod local;

pub use local::LocalFileSystem;

use crate::Result;
use chrono::{DateTime, Utc};
use std::io::Read;

/// A stat snapshot taken when a file is opened.
///
/// All enrichment attributes are computed in one call; columns that are not
/// configured simply never read their attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// Size in bytes.
    pub size: u64,
    /// Whether the file is hidden.
    pub hidden: bool,
    /// Last modification time, if the file system reports one.
    pub modified: Option<DateTime<Utc>>,
    /// Base name including the extension, e.g. `report.txt`.
    pub base_name: String,
    /// Extension without the leading dot; empty when there is none.
    pub extension: String,
    /// Parent directory as a path string.
    pub parent_path: String,
    /// Full path or location string as the file system renders it.
    pub path: String,
    /// Absolute URI of the file.
    pub uri: String,
    /// Root URI of the file system the file lives on.
    pub root_uri: String,
}

/// An open file. Dropping the handle closes it.
pub trait FileHandle {
    /// The location string this handle was opened from.
    fn location(&self) -> &str;

    /// Stat the open file.
    fn info(&self) -> Result<FileInfo>;

    /// A byte reader over the file content, starting at the beginning.
    fn reader(&mut self) -> Result<Box<dyn Read + '_>>;
}

/// Where files are opened from.
pub trait FileSystem {
    /// Open a file by location (plain path or URI).
    fn open(&self, location: &str) -> Result<Box<dyn FileHandle>>;

    /// Whether the location currently exists.
    fn exists(&self, location: &str) -> bool;

    /// Whether the location exists and is readable by this process.
    fn readable(&self, location: &str) -> bool;
}
