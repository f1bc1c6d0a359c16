//! Crate-level error type.
//!
//! Only document-level failures live here: anything that makes the whole
//! run meaningless (unreadable package, malformed slide XML, a schema that
//! cannot be turned into field descriptors). Per-field failures are
//! recovered locally and reported through [`crate::fill::FieldError`].
use thiserror::Error;

/// Main error type for deckfill operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Schema or report (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fill options could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Package part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Malformed document structure (no slides, inconsistent tables, ...)
    #[error("Structural error: {0}")]
    Structural(String),

    /// Template schema that cannot be turned into field descriptors
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

/// Result type for deckfill operations.
pub type Result<T> = std::result::Result<T, Error>;
