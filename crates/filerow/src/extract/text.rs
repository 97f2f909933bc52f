//! Built-in plain-text extractor.

use super::{ContentExtractor, Extraction, OutputFormat};
use crate::{FilerowError, Result};
use indexmap::IndexMap;
use std::io::Read;

/// Extracts UTF-8 text (lossy) from a byte stream.
///
/// Metadata keys produced: `content-type` (sniffed from the leading bytes,
/// falling back to `text/plain`), `byte-count`, `line-count`, `word-count`.
///
/// `max_bytes` bounds the in-memory buffer; exceeding it raises
/// `ResourceExhausted` rather than ordinary extraction failure, so the stage
/// can log and abort the run the same way it would for an out-of-memory
/// condition in an external parser.
#[derive(Debug, Clone)]
pub struct PlainTextExtractor {
    max_bytes: Option<u64>,
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self { max_bytes: None }
    }

    /// Cap the number of bytes buffered per file.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes: Some(max_bytes),
        }
    }

    fn read_all(&self, reader: &mut dyn Read) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        match self.max_bytes {
            None => {
                reader.read_to_end(&mut bytes)?;
            }
            Some(limit) => {
                // Read one byte past the limit to distinguish "exactly at
                // the limit" from "over it".
                reader.take(limit + 1).read_to_end(&mut bytes)?;
                if bytes.len() as u64 > limit {
                    return Err(FilerowError::resource_exhausted(format!(
                        "file content exceeds the {limit}-byte extraction limit"
                    )));
                }
            }
        }
        Ok(bytes)
    }
}

impl ContentExtractor for PlainTextExtractor {
    fn extract(&mut self, reader: &mut dyn Read, format: OutputFormat) -> Result<Extraction> {
        let bytes = self.read_all(reader)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let mut metadata = IndexMap::new();
        let content_type = infer::get(&bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "text/plain".to_string());
        metadata.insert("content-type".to_string(), content_type);
        metadata.insert("byte-count".to_string(), bytes.len().to_string());
        metadata.insert("line-count".to_string(), text.lines().count().to_string());
        metadata.insert(
            "word-count".to_string(),
            text.split_whitespace().count().to_string(),
        );

        let text = match format {
            OutputFormat::Text => text,
            OutputFormat::Html => format!(
                "<html><body><pre>{}</pre></body></html>",
                escape_markup(&text)
            ),
            OutputFormat::Xml => format!("<document>{}</document>", escape_markup(&text)),
        };

        Ok(Extraction { text, metadata })
    }
}

fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
