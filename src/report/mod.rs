//! Per-target outcomes of a masking run

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::matcher::Occurrence;
use crate::utils::logging::{LogLevel, LogSink};

pub mod formatter;

pub use formatter::ReportFormatter;

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    PlainText,
    Json,
}

/// What happened to one target string
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    Found,
    NotFound,
    Failed { reason: String },
}

/// One target string and the occurrences masked for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetOutcome {
    pub target: String,
    #[serde(flatten)]
    pub status: TargetStatus,
    pub count: usize,
    pub occurrences: Vec<Occurrence>,
}

impl TargetOutcome {
    pub fn from_occurrences(target: &str, occurrences: Vec<Occurrence>) -> Self {
        let status = if occurrences.is_empty() {
            TargetStatus::NotFound
        } else {
            TargetStatus::Found
        };
        Self {
            target: target.to_string(),
            status,
            count: occurrences.len(),
            occurrences,
        }
    }

    /// A failed target counts as zero occurrences
    pub fn failed(target: &str, reason: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            status: TargetStatus::Failed {
                reason: reason.into(),
            },
            count: 0,
            occurrences: Vec::new(),
        }
    }

    /// Summary line and the level it should be logged at
    pub fn summary_line(&self) -> (LogLevel, String) {
        match &self.status {
            TargetStatus::Found => (
                LogLevel::Info,
                format!("✓ '{}': {} occurrence(s)", self.target, self.count),
            ),
            TargetStatus::NotFound => (
                LogLevel::Warn,
                format!("✗ '{}': not found (未找到)", self.target),
            ),
            TargetStatus::Failed { reason } => (
                LogLevel::Warn,
                format!("✗ '{}': failed: {}", self.target, reason),
            ),
        }
    }
}

/// Complete result of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaskReport {
    pub generated_at: String,
    pub dry_run: bool,
    pub targets: Vec<TargetOutcome>,
    pub total: usize,
}

impl MaskReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            dry_run,
            ..Default::default()
        }
    }

    pub fn push(&mut self, outcome: TargetOutcome) {
        self.total += outcome.count;
        self.targets.push(outcome);
    }

    pub fn outcome(&self, target: &str) -> Option<&TargetOutcome> {
        self.targets.iter().find(|outcome| outcome.target == target)
    }

    pub fn count_for(&self, target: &str) -> usize {
        self.outcome(target).map_or(0, |outcome| outcome.count)
    }

    pub fn not_found(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.targets
            .iter()
            .filter(|outcome| outcome.status == TargetStatus::NotFound)
    }

    pub fn failed(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.targets
            .iter()
            .filter(|outcome| matches!(outcome.status, TargetStatus::Failed { .. }))
    }

    pub fn total_line(&self) -> String {
        if self.dry_run {
            format!("Total found (dry run, nothing written): {}", self.total)
        } else {
            format!("Total masked: {}", self.total)
        }
    }

    /// Emits the per-target summary followed by the total
    pub fn log_summary(&self, sink: &dyn LogSink) {
        for outcome in &self.targets {
            let (level, line) = outcome.summary_line();
            sink.log(level, &line);
        }
        sink.info(&self.total_line());
    }

    pub fn write_to(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let rendered = ReportFormatter::format(self, format)?;
        fs::write(path, rendered).map_err(|e| Error::OutputError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
