//! Content extraction seam.
//!
//! The stage treats the parser as a black box behind [`ContentExtractor`]:
//! it hands over a byte reader and a target output format and gets back the
//! extracted text plus a key/value metadata set. The built-in
//! [`PlainTextExtractor`] covers plain text; richer parsers plug in through
//! the same trait.

mod text;

pub use text::PlainTextExtractor;

use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// How extracted content should be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Xml,
}

/// The result of extracting one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted text, rendered in the requested output format.
    pub text: String,
    /// Flat metadata describing the parsed file; insertion-ordered.
    pub metadata: IndexMap<String, String>,
}

/// A black-box content parser.
///
/// Implementations signal out-of-memory-class conditions with
/// `FilerowError::ResourceExhausted`, which the stage treats as fatal and
/// logs distinctly from ordinary extraction failure.
pub trait ContentExtractor {
    fn extract(&mut self, reader: &mut dyn Read, format: OutputFormat) -> Result<Extraction>;
}
