//! Locating target strings among extracted characters

use serde::Serialize;

use crate::types::BBox;

pub mod normalize;
pub mod search;

pub use normalize::normalize_char;
pub use search::{find_in_page, find_occurrences};

/// One located run of records matching a target on one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub page_index: usize,
    /// Index of the first matched record within the page
    pub start: usize,
    /// One past the last matched record
    pub end: usize,
    /// Union of the matched records' boxes
    pub bbox: BBox,
}

impl Occurrence {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
