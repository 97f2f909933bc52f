//! Stage configuration: field specs, enrichment columns, and file loading.
//!
//! Configuration is read-only once a stage is constructed. It can be loaded
//! from TOML, YAML, or JSON files, discovered in parent directories, or
//! built programmatically.

use crate::extract::OutputFormat;
use crate::types::ValueType;
use crate::{FilerowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where a field column's raw value comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// The extracted text of the current file.
    #[default]
    Content,
    /// The file's byte size, rendered as a decimal string.
    Size,
}

/// How a content field trims the extracted text before conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimType {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl TrimType {
    /// Apply the trim to a string slice. Idempotent.
    pub fn apply<'a>(&self, s: &'a str) -> &'a str {
        match self {
            TrimType::None => s,
            TrimType::Left => s.trim_start(),
            TrimType::Right => s.trim_end(),
            TrimType::Both => s.trim(),
        }
    }
}

/// One extracted-content output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output column name.
    pub name: String,

    /// Raw value source.
    #[serde(default)]
    pub source: FieldSource,

    /// Trim applied to the shared content view before conversion.
    #[serde(default)]
    pub trim: TrimType,

    /// Target semantic type of the column.
    #[serde(default = "default_string_type")]
    pub target_type: ValueType,

    /// Null-carry-forward: when conversion yields Null and a previous row
    /// exists, reuse the previous row's value for this column.
    #[serde(default)]
    pub repeat: bool,
}

fn default_string_type() -> ValueType {
    ValueType::String
}

impl FieldSpec {
    /// A content-sourced String column with no trim.
    pub fn content(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: FieldSource::Content,
            trim: TrimType::None,
            target_type: ValueType::String,
            repeat: false,
        }
    }

    /// A size-sourced Integer column.
    pub fn size(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: FieldSource::Size,
            trim: TrimType::None,
            target_type: ValueType::Integer,
            repeat: false,
        }
    }

    pub fn with_trim(mut self, trim: TrimType) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_target_type(mut self, target_type: ValueType) -> Self {
        self.target_type = target_type;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// Independently-togglable output columns derived from file metadata.
///
/// Each column is active iff its configured output name is non-empty. The
/// columns always appear in the canonical order defined by
/// [`crate::core::layout::EnrichmentKind::CANONICAL_ORDER`], regardless of
/// which ones are active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentFields {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub row_number: Option<String>,
    #[serde(default)]
    pub short_filename: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub hidden: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub root_uri: Option<String>,
    /// Output name for the extractor metadata serialized as a flat JSON
    /// object.
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Normalize a configured output name: `None` and `""` both mean "off".
pub(crate) fn active_name(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

/// Full configuration surface of one stage run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Extracted-content columns, in output order.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    /// File-metadata enrichment columns.
    #[serde(default)]
    pub enrichment: EnrichmentFields,

    /// Rendering of extracted content.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Skip zero-byte files instead of emitting a row for them.
    #[serde(default)]
    pub ignore_empty_files: bool,

    /// Stop after this many main-channel rows (None = unlimited).
    #[serde(default)]
    pub row_limit: Option<u64>,

    /// Route per-row assembly failures to the error side channel instead of
    /// aborting the run.
    #[serde(default)]
    pub route_errors: bool,

    /// Upstream column holding the filename (streamed mode only).
    #[serde(default)]
    pub filename_field: Option<String>,

    /// Record the URI of every file that produced a main-channel row.
    #[serde(default)]
    pub track_result_files: bool,
}

impl StageConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FilerowError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            FilerowError::configuration(format!("Invalid TOML in {}: {}", path.as_ref().display(), e))
        })
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FilerowError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_yaml_ng::from_str(&content).map_err(|e| {
            FilerowError::configuration(format!("Invalid YAML in {}: {}", path.as_ref().display(), e))
        })
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FilerowError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            FilerowError::configuration(format!("Invalid JSON in {}: {}", path.as_ref().display(), e))
        })
    }

    /// Discover `filerow.toml` in the current directory or any parent.
    ///
    /// Returns `None` when no config file is found.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(FilerowError::Io)?;

        loop {
            let filerow_toml = current.join("filerow.toml");
            if filerow_toml.exists() {
                return Ok(Some(Self::from_toml_file(filerow_toml)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}
