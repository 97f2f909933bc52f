//! Core value and schema types shared across the crate.

use crate::{FilerowError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cell value in an output row.
///
/// Serializes untagged, so rows render as plain JSON scalars; dates render
/// as RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => f.write_str(&d.to_rfc3339()),
        }
    }
}

/// The semantic target type of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Number,
    Boolean,
    Date,
}

impl ValueType {
    /// Convert a raw string into a typed [`Value`].
    ///
    /// This is the single conversion rule used for every field column:
    /// - a missing raw value is `Null` for every target type;
    /// - `String` is the identity (an empty string stays an empty string);
    /// - `Integer`/`Number` trim then parse, mapping an empty string to
    ///   `Null` and a parse failure to a `Conversion` error;
    /// - `Boolean` treats `y`/`yes`/`true`/`1` (case-insensitive) as true,
    ///   any other non-empty string as false, and empty as `Null`;
    /// - `Date` parses RFC 3339, empty maps to `Null`.
    pub fn convert(&self, raw: Option<&str>) -> Result<Value> {
        let Some(raw) = raw else {
            return Ok(Value::Null);
        };
        match self {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Integer => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                trimmed.parse::<i64>().map(Value::Integer).map_err(|e| {
                    FilerowError::conversion_with_source(
                        format!("cannot convert {trimmed:?} to Integer"),
                        e,
                    )
                })
            }
            ValueType::Number => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                trimmed.parse::<f64>().map(Value::Number).map_err(|e| {
                    FilerowError::conversion_with_source(
                        format!("cannot convert {trimmed:?} to Number"),
                        e,
                    )
                })
            }
            ValueType::Boolean => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                let truthy = matches!(
                    trimmed.to_ascii_lowercase().as_str(),
                    "y" | "yes" | "true" | "1"
                );
                Ok(Value::Boolean(truthy))
            }
            ValueType::Date => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                DateTime::parse_from_rfc3339(trimmed)
                    .map(|d| Value::Date(d.with_timezone(&Utc)))
                    .map_err(|e| {
                        FilerowError::conversion_with_source(
                            format!("cannot convert {trimmed:?} to Date"),
                            e,
                        )
                    })
            }
        }
    }
}

/// One ordered output record.
pub type Row = Vec<Value>;

/// A named, typed column in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub value_type: ValueType,
}

impl Column {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// An ordered set of named, typed columns.
///
/// Used both for the upstream record schema (streamed mode) and for the
/// derived output schema of the stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve a column name to its index.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Error code carried by every routed error record.
pub const ERROR_CODE: &str = "001";

/// A synthetic record routed to the error side channel when per-row
/// assembly fails and error routing is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Empty value row; the main channel never carries partial rows.
    pub row: Row,
    /// Human-readable description, prefixed with `Error encountered :`.
    pub error_message: String,
    /// The configured filename output-column name, empty when unconfigured.
    pub field_name: String,
    /// Fixed error code, always [`ERROR_CODE`].
    pub error_code: String,
}

/// Run counters maintained by the stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub files_opened: u64,
    pub rows_emitted: u64,
    pub empty_files_skipped: u64,
    pub errors_routed: u64,
}
