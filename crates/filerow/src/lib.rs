//! Filerow - File-to-Row Pipeline Stage
//!
//! Filerow turns a set of files into one typed output record per file:
//! extracted text content, derived file metadata, and pass-through upstream
//! fields, interleaved into one invariant column layout. Per-file assembly
//! failures can be routed to an error side channel so a single bad file does
//! not abort the run.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use filerow::{FieldSpec, FileRowStage, PlainTextExtractor, Produced, StageConfig};
//! use filerow::vfs::LocalFileSystem;
//!
//! # fn main() -> filerow::Result<()> {
//! let config = StageConfig {
//!     fields: vec![FieldSpec::content("content"), FieldSpec::size("bytes")],
//!     ..Default::default()
//! };
//! let mut stage = FileRowStage::from_files(
//!     vec!["notes.txt".to_string()],
//!     Box::new(LocalFileSystem::new()),
//!     Box::new(PlainTextExtractor::new()),
//!     config,
//! )?;
//! while let Produced::Row(row) = stage.produce_one()? {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): stage loop, file cursor, row assembly, layout, config
//! - **Sources** (`source`): static file list or streamed upstream filenames
//! - **VFS** (`vfs`): file system seam, ships a local-disk implementation
//! - **Extraction** (`extract`): content parser seam, ships plain text
//!
//! Two driving modes share one stage contract: *static mode* iterates a
//! pre-resolved, fail-fast-validated file list; *streamed mode* pulls one
//! upstream record per file and reads the filename from a configured field,
//! passing the record's columns through into the output row.

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extract;
pub mod source;
pub mod types;
pub mod vfs;

pub use error::{FilerowError, Result};
pub use types::*;

pub use core::assemble::build_row;
pub use core::config::{EnrichmentFields, FieldSource, FieldSpec, StageConfig, TrimType};
pub use core::cursor::{Advance, FileCursor, OpenFile};
pub use core::layout::{EnrichmentKind, RowLayout};
pub use core::stage::{FileRowStage, Produced};

pub use extract::{ContentExtractor, Extraction, OutputFormat, PlainTextExtractor};
pub use source::{FileSource, MemoryRecordStream, NextFile, RecordStream};
pub use vfs::{FileHandle, FileInfo, FileSystem, LocalFileSystem};
