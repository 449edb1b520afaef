//! PDF field masking
//!
//! Covers target strings in a PDF with opaque rectangles, using the
//! character-level layout JSON produced by an upstream OCR/layout extractor
//! to locate each character. Masking is visual only; the text layer under
//! a rectangle is left in place.
//!
//! ```no_run
//! use pdfmask::pipeline::{run, MaskJob};
//! use pdfmask::utils::logging::TracingSink;
//!
//! let job = MaskJob::new("input.pdf", "chars.json", vec!["张三".into()], "masked.pdf");
//! let report = run(&job, &TracingSink)?;
//! println!("masked {} occurrence(s)", report.total);
//! # Ok::<(), pdfmask::error::Error>(())
//! ```

// Configuration and core pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Matching and drawing
pub mod canvas;
pub mod masker;
pub mod matcher;

// Reporting
pub mod report;

// Shared utilities
pub mod utils;

// Re-exports for crate consumers
pub use canvas::{MaskBackend, PdfCanvas};
pub use config::{MaskColor, MaskConfig};
pub use error::{Error, Result};
pub use masker::Masker;
pub use matcher::{find_occurrences, normalize_char, Occurrence};
pub use pipeline::{run, MaskJob};
pub use report::{MaskReport, TargetOutcome, TargetStatus};
pub use types::{BBox, CharRecord, LayoutDocument, PageLayout};
pub use utils::{LogSink, MemorySink, TracingSink};
