//! The pipeline stage: per-demand row production with error isolation.

use super::assemble::build_row;
use super::config::{StageConfig, active_name};
use super::cursor::{Advance, FileCursor};
use super::layout::RowLayout;
use crate::extract::ContentExtractor;
use crate::source::{FileSource, RecordStream, StaticFileList, StreamedFilenames};
use crate::types::{ERROR_CODE, ErrorRecord, Row, Schema, StageStats};
use crate::vfs::FileSystem;
use crate::{FilerowError, Result};
use tracing::{debug, error, warn};

/// What one demand for a row produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Produced {
    /// A main-channel row.
    Row(Row),
    /// A record for the error side channel; the run continues.
    RoutedError(ErrorRecord),
    /// No more rows will be produced.
    EndOfStream,
}

/// A file-to-row pipeline stage.
///
/// Pull-driven and synchronous: each [`produce_one`](Self::produce_one) call
/// advances to the next file, extracts it, and assembles one row. Per-row
/// assembly faults are routed to the error side channel when
/// `route_errors` is set; everything else is fatal and ends the run. The
/// stage is not safe for concurrent invocation and must be confined to a
/// single worker. Dropping it releases the open file handle.
pub struct FileRowStage {
    cursor: FileCursor,
    config: StageConfig,
    layout: RowLayout,
    output_schema: Schema,
    previous: Option<Row>,
    finished: bool,
    files_opened: u64,
    rows_emitted: u64,
    errors_routed: u64,
    result_files: Vec<String>,
}

impl std::fmt::Debug for FileRowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRowStage")
            .field("finished", &self.finished)
            .field("files_opened", &self.files_opened)
            .field("rows_emitted", &self.rows_emitted)
            .field("errors_routed", &self.errors_routed)
            .field("result_files", &self.result_files)
            .finish_non_exhaustive()
    }
}

impl FileRowStage {
    /// Static mode: run over a pre-resolved file list.
    ///
    /// The whole list is validated here; missing or inaccessible files fail
    /// construction with a configuration error naming every offending path.
    pub fn from_files(
        files: Vec<String>,
        fs: Box<dyn FileSystem>,
        extractor: Box<dyn ContentExtractor>,
        config: StageConfig,
    ) -> Result<Self> {
        let list = StaticFileList::new(files, fs.as_ref())?;
        let cursor = FileCursor::new(
            FileSource::Static(list),
            fs,
            extractor,
            config.output_format,
            config.ignore_empty_files,
        );
        Ok(Self::assemble_stage(cursor, config))
    }

    /// Streamed mode: run over filenames pulled from an upstream record
    /// field named by `config.filename_field`.
    pub fn from_stream(
        stream: Box<dyn RecordStream>,
        fs: Box<dyn FileSystem>,
        extractor: Box<dyn ContentExtractor>,
        config: StageConfig,
    ) -> Result<Self> {
        let filename_field = config.filename_field.clone().unwrap_or_default();
        let streamed = StreamedFilenames::new(stream, filename_field)?;
        let cursor = FileCursor::new(
            FileSource::Streamed(streamed),
            fs,
            extractor,
            config.output_format,
            config.ignore_empty_files,
        );
        Ok(Self::assemble_stage(cursor, config))
    }

    fn assemble_stage(cursor: FileCursor, config: StageConfig) -> Self {
        let layout = RowLayout::new(&config, cursor.passthrough_schema());
        let output_schema = layout.output_schema();
        Self {
            cursor,
            config,
            layout,
            output_schema,
            previous: None,
            finished: false,
            files_opened: 0,
            rows_emitted: 0,
            errors_routed: 0,
            result_files: Vec::new(),
        }
    }

    /// Produce one row, one routed error record, or end-of-stream.
    ///
    /// Once the row limit is reached, behaves as end-of-stream without
    /// opening further files. A fatal error marks the stage finished;
    /// subsequent calls return `EndOfStream`.
    pub fn produce_one(&mut self) -> Result<Produced> {
        if self.finished {
            return Ok(Produced::EndOfStream);
        }
        if let Some(limit) = self.config.row_limit {
            if self.rows_emitted >= limit {
                debug!(limit, "row limit reached");
                self.finished = true;
                return Ok(Produced::EndOfStream);
            }
        }

        match self.cursor.advance() {
            Err(e) => {
                self.finished = true;
                Err(e)
            }
            Ok(Advance::Exhausted) => {
                self.finished = true;
                Ok(Produced::EndOfStream)
            }
            Ok(Advance::Opened) => self.assemble_current(),
        }
    }

    fn assemble_current(&mut self) -> Result<Produced> {
        let Some(open) = self.cursor.current() else {
            self.finished = true;
            return Err(FilerowError::extraction("cursor has no open file after advance"));
        };
        self.files_opened += 1;

        // Row numbers are 1-based and count main-channel rows only.
        let row_number = (self.rows_emitted + 1) as i64;
        match build_row(
            &self.layout,
            &self.config.fields,
            open,
            row_number,
            self.previous.as_ref(),
        ) {
            Ok(row) => {
                if self.config.track_result_files {
                    self.result_files.push(open.info.uri.clone());
                }
                self.previous = Some(row.clone());
                self.rows_emitted += 1;
                Ok(Produced::Row(row))
            }
            Err(e) if e.is_recoverable() && self.config.route_errors => {
                warn!(location = %open.location, error = %e, "routing failed row to the error channel");
                self.errors_routed += 1;
                Ok(Produced::RoutedError(ErrorRecord {
                    row: Vec::new(),
                    error_message: format!("Error encountered : {e}"),
                    field_name: active_name(&self.config.enrichment.filename)
                        .unwrap_or_default()
                        .to_string(),
                    error_code: ERROR_CODE.to_string(),
                }))
            }
            Err(e) => {
                error!(location = %open.location, error = %e, "error in stage run");
                self.finished = true;
                Err(e)
            }
        }
    }

    /// Drain the stage, collecting main-channel rows and routed error
    /// records.
    pub fn run_to_end(&mut self) -> Result<(Vec<Row>, Vec<ErrorRecord>)> {
        let mut rows = Vec::new();
        let mut errors = Vec::new();
        loop {
            match self.produce_one()? {
                Produced::Row(row) => rows.push(row),
                Produced::RoutedError(record) => errors.push(record),
                Produced::EndOfStream => break,
            }
        }
        Ok((rows, errors))
    }

    /// The derived output schema, fixed at construction.
    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    /// Run counters so far.
    pub fn stats(&self) -> StageStats {
        StageStats {
            files_opened: self.files_opened,
            rows_emitted: self.rows_emitted,
            empty_files_skipped: self.cursor.empty_files_skipped(),
            errors_routed: self.errors_routed,
        }
    }

    /// URIs of files that produced a main-channel row, when
    /// `track_result_files` is set.
    pub fn result_files(&self) -> &[String] {
        &self.result_files
    }
}
