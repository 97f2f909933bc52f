//! Error types for filerow.
//!
//! All errors in the crate use `FilerowError`, which preserves error chains
//! with `#[source]` attributes and keeps the fatal/recoverable split explicit:
//!
//! - **System errors MUST always bubble up unchanged:** `FilerowError::Io`
//!   (from `std::io::Error`) indicates a real system problem and is never
//!   wrapped or suppressed.
//! - **Fatal run errors** terminate iteration: `Configuration` (bad field
//!   names, missing required files), `Extraction` (open/stat/parse faults
//!   mid-run), `ResourceExhausted` (the extractor ran out of memory-class
//!   resources).
//! - **Recoverable per-row errors** can be routed to the error side channel
//!   instead of aborting: `Conversion` and `Serialization`.
//!
//! # Example
//!
//! ```rust
//! use filerow::{FilerowError, Result};
//!
//! fn parse_limit(raw: &str) -> Result<u64> {
//!     raw.parse()
//!         .map_err(|_| FilerowError::configuration(format!("invalid row limit: {raw}")))
//! }
//! ```
use thiserror::Error;

/// Result type alias using `FilerowError`.
pub type Result<T> = std::result::Result<T, FilerowError>;

/// Main error type for all filerow operations.
///
/// # Variants
///
/// - `Io` - File system and I/O errors (always bubble up)
/// - `Configuration` - Invalid configuration: unresolved filename field,
///   missing/inaccessible required files, malformed config files
/// - `Extraction` - Open/stat/extract faults mid-run (fatal to the run)
/// - `ResourceExhausted` - The extractor's out-of-memory-class signal,
///   distinguishable from ordinary extraction failure
/// - `Conversion` - Per-row type conversion failure (recoverable)
/// - `Serialization` - JSON serialization errors (recoverable, per-row)
#[derive(Debug, Error)]
pub enum FilerowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Extraction error: {message}")]
    Extraction {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Resource exhausted: {message}")]
    ResourceExhausted { message: String },

    #[error("Conversion error: {message}")]
    Conversion {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<serde_json::Error> for FilerowError {
    fn from(err: serde_json::Error) -> Self {
        FilerowError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $name_with_source:ident, $variant:ident) => {
        #[doc = concat!("Create a `", stringify!($variant), "` error")]
        pub fn $name<S: Into<String>>(message: S) -> Self {
            Self::$variant {
                message: message.into(),
                source: None,
            }
        }

        #[doc = concat!("Create a `", stringify!($variant), "` error with source")]
        pub fn $name_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
            message: S,
            source: E,
        ) -> Self {
            Self::$variant {
                message: message.into(),
                source: Some(Box::new(source)),
            }
        }
    };
}

impl FilerowError {
    error_constructor!(configuration, configuration_with_source, Configuration);
    error_constructor!(extraction, extraction_with_source, Extraction);
    error_constructor!(conversion, conversion_with_source, Conversion);
    error_constructor!(serialization, serialization_with_source, Serialization);

    /// Create a `ResourceExhausted` error.
    pub fn resource_exhausted<S: Into<String>>(message: S) -> Self {
        Self::ResourceExhausted { message: message.into() }
    }

    /// Whether this error is a per-row assembly fault that the stage may
    /// route to the error side channel instead of aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Conversion { .. } | Self::Serialization { .. })
    }
}
