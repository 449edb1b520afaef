//! Error types and handling for the PDF masking library

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for masking operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for masking operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Layout error: {0}")]
    LayoutError(#[from] LayoutError),

    #[error("PDF error: {0}")]
    PdfError(String),

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("{reason} ({drawn} of {planned} rectangle(s) already drawn stay in the output)")]
    PartiallyMasked {
        drawn: usize,
        planned: usize,
        reason: String,
    },

    #[error("Cannot write output {}: {reason}", .path.display())]
    OutputError { path: PathBuf, reason: String },

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// Wraps any displayable lopdf failure
    pub fn pdf<E: std::fmt::Display>(e: E) -> Self {
        Error::PdfError(e.to_string())
    }
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("Malformed layout JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Character '{key}' has a bbox with {len} values, expected 4")]
    InvalidBBox { key: String, len: usize },
}
