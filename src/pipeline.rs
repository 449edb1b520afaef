//! Masking pipeline: load -> mask every target -> save
//!
//! Input errors abort before anything is drawn; the output file only
//! appears once the whole document has been written successfully.

use std::path::PathBuf;
use tracing::instrument;

use crate::{
    canvas::{MaskBackend, PdfCanvas},
    config::MaskConfig,
    error::{Error, Result},
    masker::Masker,
    report::MaskReport,
    types::LayoutDocument,
    utils::logging::LogSink,
};

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct MaskJob {
    pub pdf_path: PathBuf,
    pub layout_path: PathBuf,
    pub targets: Vec<String>,
    pub output_path: PathBuf,
    pub config: MaskConfig,
}

impl MaskJob {
    pub fn new(
        pdf_path: impl Into<PathBuf>,
        layout_path: impl Into<PathBuf>,
        targets: Vec<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            layout_path: layout_path.into(),
            targets,
            output_path: output_path.into(),
            config: MaskConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MaskConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if self.targets.is_empty() {
            return Err(Error::InvalidConfiguration(
                "at least one target string is required".into(),
            ));
        }
        if self.targets.iter().any(|t| t.is_empty()) {
            return Err(Error::InvalidConfiguration(
                "target strings must not be empty".into(),
            ));
        }
        if !self.config.dry_run && self.output_path == self.pdf_path {
            return Err(Error::InvalidConfiguration(
                "output path must differ from the input PDF".into(),
            ));
        }
        Ok(())
    }
}

/// Runs one job end to end
#[instrument(skip(job, sink), fields(pdf = %job.pdf_path.display()))]
pub fn run(job: &MaskJob, sink: &dyn LogSink) -> Result<MaskReport> {
    job.validate()?;

    let mut canvas = PdfCanvas::load(&job.pdf_path)?;
    sink.info(&format!(
        "Loaded PDF {} ({} pages)",
        job.pdf_path.display(),
        canvas.page_count()
    ));

    let layout = LayoutDocument::load(&job.layout_path)?;
    sink.info(&format!(
        "Loaded layout {} ({} characters on {} pages)",
        job.layout_path.display(),
        layout.char_count(),
        layout.pages().len()
    ));

    let report = Masker::new(&layout, &job.config, sink).mask_all(&mut canvas, job.targets.as_slice());

    if job.config.dry_run {
        sink.info("Dry run: no output written");
    } else {
        canvas.save(&job.output_path)?;
        sink.info(&format!("Masked PDF saved to {}", job.output_path.display()));
    }

    report.log_summary(sink);
    Ok(report)
}
