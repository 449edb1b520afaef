//! Sliding-window occurrence search
//!
//! Every start position is tested independently, so overlapping occurrences
//! are all reported: `"aa"` occurs twice in `"aaa"`. Occurrences never cross
//! a page boundary.

use crate::types::{BBox, CharRecord, LayoutDocument, PageLayout};

use super::Occurrence;

/// All occurrences of `target` on one page, in start order
pub fn find_in_page(page: &PageLayout, target: &[char]) -> Vec<Occurrence> {
    if target.is_empty() {
        return Vec::new();
    }

    page.records()
        .windows(target.len())
        .enumerate()
        .filter(|(_, window)| window_matches(window, target))
        .filter_map(|(start, window)| {
            BBox::union_all(window.iter().map(|record| &record.bbox)).map(|bbox| Occurrence {
                page_index: page.index,
                start,
                end: start + target.len(),
                bbox,
            })
        })
        .collect()
}

/// All occurrences of `target` across the layout, page by page
pub fn find_occurrences(layout: &LayoutDocument, target: &str) -> Vec<Occurrence> {
    let target: Vec<char> = target.chars().collect();
    layout
        .pages()
        .iter()
        .flat_map(|page| find_in_page(page, &target))
        .collect()
}

fn window_matches(window: &[CharRecord], target: &[char]) -> bool {
    window
        .iter()
        .zip(target)
        .all(|(record, expected)| record.matches(*expected))
}
