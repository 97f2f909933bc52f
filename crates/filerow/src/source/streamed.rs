//! Streamed mode: filenames pulled from an upstream record field.

use super::{NextFile, RecordStream};
use crate::types::Schema;
use crate::{FilerowError, Result};
use tracing::debug;

/// Pulls one upstream record per file and reads the filename from a
/// configured field.
///
/// The field name is resolved to a column index on the first pulled record
/// only; the index is cached for the rest of the run. An unresolvable field
/// is a fatal configuration error, never a per-row error.
pub struct StreamedFilenames {
    stream: Box<dyn RecordStream>,
    filename_field: String,
    field_index: Option<usize>,
}

impl std::fmt::Debug for StreamedFilenames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamedFilenames")
            .field("filename_field", &self.filename_field)
            .field("field_index", &self.field_index)
            .finish_non_exhaustive()
    }
}

impl StreamedFilenames {
    pub fn new(stream: Box<dyn RecordStream>, filename_field: impl Into<String>) -> Result<Self> {
        let filename_field = filename_field.into();
        if filename_field.is_empty() {
            return Err(FilerowError::configuration(
                "streamed mode requires a filename field name",
            ));
        }
        Ok(Self {
            stream,
            filename_field,
            field_index: None,
        })
    }

    pub fn schema(&self) -> &Schema {
        self.stream.schema()
    }

    pub fn next_file(&mut self) -> Result<Option<NextFile>> {
        let Some(record) = self.stream.next_record()? else {
            return Ok(None);
        };

        let index = match self.field_index {
            Some(index) => index,
            None => {
                let index = self.stream.schema().index_of(&self.filename_field).ok_or_else(|| {
                    FilerowError::configuration(format!(
                        "filename field [{}] not found in the upstream schema",
                        self.filename_field
                    ))
                })?;
                self.field_index = Some(index);
                index
            }
        };

        let value = record.get(index).ok_or_else(|| {
            FilerowError::configuration(format!(
                "upstream record is narrower than its schema; no column {index}"
            ))
        })?;
        if value.is_null() {
            return Err(FilerowError::configuration(format!(
                "filename field [{}] is null",
                self.filename_field
            )));
        }
        let location = value.to_string();
        debug!(field = %self.filename_field, %location, "streamed filename");

        Ok(Some(NextFile {
            location,
            passthrough: Some(record),
        }))
    }
}
