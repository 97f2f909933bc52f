//! File sources: where filenames come from.
//!
//! A run is driven either by a pre-resolved static file list or by filenames
//! streamed in from an upstream record field. Both share the one
//! [`FileSource::next_file`] contract consumed by the cursor.

mod static_list;
mod streamed;

pub use static_list::StaticFileList;
pub use streamed::StreamedFilenames;

use crate::Result;
use crate::types::{Row, Schema};
use std::collections::VecDeque;

/// The next file to open, plus the upstream record that named it (streamed
/// mode only).
#[derive(Debug, Clone, PartialEq)]
pub struct NextFile {
    pub location: String,
    pub passthrough: Option<Row>,
}

/// A pull-one upstream record stream (streamed mode only).
///
/// `next_record` returning `Ok(None)` signals end-of-stream.
pub trait RecordStream {
    fn schema(&self) -> &Schema;
    fn next_record(&mut self) -> Result<Option<Row>>;
}

/// An in-memory [`RecordStream`], used by tests and small drivers.
#[derive(Debug, Clone)]
pub struct MemoryRecordStream {
    schema: Schema,
    rows: VecDeque<Row>,
}

impl MemoryRecordStream {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows: rows.into(),
        }
    }
}

impl RecordStream for MemoryRecordStream {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next_record(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

/// The two driving modes, behind one `next_file` contract.
pub enum FileSource {
    Static(StaticFileList),
    Streamed(StreamedFilenames),
}

impl FileSource {
    /// Pull the next file to open; `None` means the source is exhausted.
    pub fn next_file(&mut self) -> Result<Option<NextFile>> {
        match self {
            FileSource::Static(list) => Ok(list.next_file()),
            FileSource::Streamed(streamed) => streamed.next_file(),
        }
    }

    /// The upstream schema whose columns pass through into the output row;
    /// `None` in static mode.
    pub fn passthrough_schema(&self) -> Option<&Schema> {
        match self {
            FileSource::Static(_) => None,
            FileSource::Streamed(streamed) => Some(streamed.schema()),
        }
    }
}
