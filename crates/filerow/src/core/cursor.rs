//! File lifecycle: open, stat, extract, skip, stop.

use crate::extract::{ContentExtractor, Extraction, OutputFormat};
use crate::source::FileSource;
use crate::types::Row;
use crate::vfs::{FileHandle, FileInfo, FileSystem};
use crate::{FilerowError, Result};
use tracing::{debug, error, warn};

/// The currently open file and everything derived from it.
///
/// Exactly one instance is live at a time; the handle closes when the cursor
/// advances again or is dropped.
pub struct OpenFile {
    /// Held so the file stays open while its row is assembled.
    pub handle: Box<dyn FileHandle>,
    /// The location string the file was opened from.
    pub location: String,
    /// Stat snapshot taken at open time.
    pub info: FileInfo,
    /// Extracted text and metadata.
    pub extraction: Extraction,
    /// The upstream record that named this file (streamed mode only).
    pub passthrough: Option<Row>,
    /// 1-based index of this file within the run, counting skipped files.
    pub sequence: u64,
}

/// Outcome of advancing the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Opened,
    Exhausted,
}

/// Drives file iteration for one run.
///
/// Any error during open, stat, or extract is fatal: the cursor stops and no
/// further files are attempted. Per-row assembly errors are handled one
/// layer up and never reach the cursor.
pub struct FileCursor {
    source: FileSource,
    fs: Box<dyn FileSystem>,
    extractor: Box<dyn ContentExtractor>,
    format: OutputFormat,
    ignore_empty: bool,
    open: Option<OpenFile>,
    sequence: u64,
    empty_skipped: u64,
}

impl FileCursor {
    pub fn new(
        source: FileSource,
        fs: Box<dyn FileSystem>,
        extractor: Box<dyn ContentExtractor>,
        format: OutputFormat,
        ignore_empty: bool,
    ) -> Self {
        Self {
            source,
            fs,
            extractor,
            format,
            ignore_empty,
            open: None,
            sequence: 0,
            empty_skipped: 0,
        }
    }

    /// Close the current file and open the next one.
    ///
    /// Empty files are skipped in a loop (not recursion) when the
    /// ignore-empty policy is on, so an arbitrarily long run of empty files
    /// cannot overflow the stack.
    pub fn advance(&mut self) -> Result<Advance> {
        // The previous handle must be released before the next open; at
        // most one file is open at any time.
        self.open = None;

        loop {
            let Some(next) = self.source.next_file()? else {
                debug!("finished processing");
                return Ok(Advance::Exhausted);
            };

            debug!(location = %next.location, "opening file");
            let mut handle = self.fs.open(&next.location).inspect_err(|e| {
                error!(location = %next.location, error = %e, "unable to open file");
            })?;
            let info = handle.info().inspect_err(|e| {
                error!(location = %next.location, error = %e, "unable to stat file");
            })?;
            self.sequence += 1;

            if self.ignore_empty && info.size == 0 {
                warn!(location = %next.location, "file is empty, skipping");
                self.empty_skipped += 1;
                continue;
            }

            let extraction = self.extract(handle.as_mut(), &next.location)?;
            debug!(location = %next.location, bytes = info.size, "file opened");

            self.open = Some(OpenFile {
                handle,
                location: next.location,
                info,
                extraction,
                passthrough: next.passthrough,
                sequence: self.sequence,
            });
            return Ok(Advance::Opened);
        }
    }

    fn extract(&mut self, handle: &mut dyn FileHandle, location: &str) -> Result<Extraction> {
        let mut reader = handle.reader()?;
        self.extractor
            .extract(reader.as_mut(), self.format)
            .inspect_err(|e| match e {
                FilerowError::ResourceExhausted { .. } => {
                    error!(location = %location, "not enough resources to extract file content");
                }
                other => {
                    error!(location = %location, error = %other, "error getting file content");
                }
            })
    }

    /// The currently open file, if the last advance returned `Opened`.
    pub fn current(&self) -> Option<&OpenFile> {
        self.open.as_ref()
    }

    /// The upstream passthrough schema, `None` in static mode.
    pub fn passthrough_schema(&self) -> Option<&crate::types::Schema> {
        self.source.passthrough_schema()
    }

    /// How many empty files the ignore-empty policy has skipped so far.
    pub fn empty_files_skipped(&self) -> u64 {
        self.empty_skipped
    }
}
