//! Matcher/Masker: finds every target string and paints over it
//!
//! Targets are isolated from one another. A target whose plan or drawing
//! fails is reported as failed (zero occurrences) and the next target is
//! still processed.

use crate::canvas::MaskBackend;
use crate::config::MaskConfig;
use crate::error::{Error, Result};
use crate::matcher::{find_in_page, Occurrence};
use crate::report::{MaskReport, TargetOutcome};
use crate::types::LayoutDocument;
use crate::utils::logging::LogSink;

/// Masks target strings of one layout onto a drawing backend
pub struct Masker<'a> {
    layout: &'a LayoutDocument,
    config: &'a MaskConfig,
    sink: &'a dyn LogSink,
}

impl<'a> Masker<'a> {
    pub fn new(layout: &'a LayoutDocument, config: &'a MaskConfig, sink: &'a dyn LogSink) -> Self {
        Self {
            layout,
            config,
            sink,
        }
    }

    /// Every occurrence of `target`, page by page
    pub fn plan(&self, target: &str) -> Vec<Occurrence> {
        let chars: Vec<char> = target.chars().collect();
        let mut occurrences = Vec::new();

        for page in self.layout.pages() {
            let found = find_in_page(page, &chars);
            if self.config.verbose {
                self.sink.debug(&format!(
                    "page {}: {} record(s), {} match(es) for '{}'",
                    page.index,
                    page.len(),
                    found.len(),
                    target
                ));
            }
            occurrences.extend(found);
        }
        occurrences
    }

    /// Plans and draws one target. Pages are checked before anything is
    /// drawn, so an out-of-range page leaves the target untouched. A backend
    /// failure after some rectangles were painted is reported as
    /// [`Error::PartiallyMasked`].
    pub fn mask_target<B: MaskBackend>(&self, backend: &mut B, target: &str) -> Result<Vec<Occurrence>> {
        let occurrences = self.plan(target);

        let page_count = backend.page_count();
        if let Some(bad) = occurrences.iter().find(|o| o.page_index >= page_count) {
            return Err(Error::PageOutOfRange {
                page: bad.page_index,
                page_count,
            });
        }

        if self.config.dry_run {
            return Ok(occurrences);
        }

        let padding = f64::from(self.config.padding);
        for (drawn, occurrence) in occurrences.iter().enumerate() {
            let rect = occurrence.bbox.pad_horizontal(padding);
            if let Err(e) = backend.fill_rect(occurrence.page_index, &rect, self.config.color) {
                if drawn == 0 {
                    return Err(e);
                }
                return Err(Error::PartiallyMasked {
                    drawn,
                    planned: occurrences.len(),
                    reason: e.to_string(),
                });
            }
            if self.config.verbose {
                self.sink.debug(&format!(
                    "masked '{}' on page {} at {}",
                    target, occurrence.page_index, rect
                ));
            }
        }
        Ok(occurrences)
    }

    /// Processes every target in order and collects the outcomes
    pub fn mask_all<B, S>(&self, backend: &mut B, targets: &[S]) -> MaskReport
    where
        B: MaskBackend,
        S: AsRef<str>,
    {
        let mut report = MaskReport::new(self.config.dry_run);

        for target in targets {
            let target = target.as_ref();
            let outcome = match self.mask_target(backend, target) {
                Ok(occurrences) => {
                    if occurrences.is_empty() {
                        self.sink.warn(&format!("not found: '{}'", target));
                    } else {
                        self.sink.info(&format!(
                            "'{}': {} occurrence(s)",
                            target,
                            occurrences.len()
                        ));
                    }
                    TargetOutcome::from_occurrences(target, occurrences)
                }
                Err(e) => {
                    self.sink.error(&format!("failed to mask '{}': {}", target, e));
                    TargetOutcome::failed(target, e.to_string())
                }
            };
            report.push(outcome);
        }
        report
    }
}
