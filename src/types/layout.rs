//! Character-level layout model
//!
//! The upstream extractor writes one JSON object whose keys are characters in
//! reading order. Repeated characters get a `_<n>` suffix so keys stay unique:
//!
//! ```json
//! {
//!   "张":   { "bbox": [10, 10, 20, 20], "page_index": 0, "md_index": 0 },
//!   "三":   { "bbox": [20, 10, 30, 20], "page_index": 0, "md_index": 1 },
//!   "张_1": { "bbox": [10, 40, 20, 50], "page_index": 1, "md_index": 7 }
//! }
//! ```
//!
//! The whole document is decoded once into [`LayoutDocument`]; a malformed
//! entry fails the load instead of surfacing later during matching.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, LayoutError, Result};
use crate::matcher::normalize_char;

/// Axis-aligned rectangle in page space, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct BBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Smallest box covering both
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Smallest box covering every input, `None` for an empty input
    pub fn union_all<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes.into_iter().fold(None, |acc, bbox| match acc {
            None => Some(*bbox),
            Some(current) => Some(current.union(bbox)),
        })
    }

    /// Widens the box by `ratio * width` on the left and on the right
    pub fn pad_horizontal(&self, ratio: f64) -> BBox {
        let extra = self.width() * ratio;
        BBox {
            left: self.left - extra,
            right: self.right + extra,
            ..*self
        }
    }
}

impl From<[f64; 4]> for BBox {
    fn from([left, top, right, bottom]: [f64; 4]) -> Self {
        BBox::new(left, top, right, bottom)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.left, bbox.top, bbox.right, bbox.bottom]
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}, {:.2}, {:.2}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// One extracted glyph on one page
#[derive(Debug, Clone, PartialEq)]
pub struct CharRecord {
    /// Key as written by the extractor, possibly suffixed (`张_1`)
    pub key: String,
    /// Key with any disambiguating suffix removed
    pub normalized: String,
    pub bbox: BBox,
    pub page_index: usize,
    /// Offset of the character in the extractor's markdown output
    pub md_index: Option<usize>,
}

impl CharRecord {
    pub fn new(key: impl Into<String>, bbox: BBox, page_index: usize) -> Self {
        let key = key.into();
        let normalized = normalize_char(&key).to_string();
        Self {
            key,
            normalized,
            bbox,
            page_index,
            md_index: None,
        }
    }

    /// True when the normalized character is exactly `c`
    pub fn matches(&self, c: char) -> bool {
        let mut chars = self.normalized.chars();
        chars.next() == Some(c) && chars.next().is_none()
    }
}

/// All records of one page in reading order
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub index: usize,
    records: Vec<CharRecord>,
}

impl PageLayout {
    pub fn new(index: usize, records: Vec<CharRecord>) -> Self {
        Self { index, records }
    }

    pub fn records(&self) -> &[CharRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Concatenated normalized characters, handy for diagnostics
    pub fn text(&self) -> String {
        self.records.iter().map(|r| r.normalized.as_str()).collect()
    }
}

/// Every page of the layout, ordered by page index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutDocument {
    pages: Vec<PageLayout>,
}

impl LayoutDocument {
    /// Groups records by page, keeping their relative order within a page
    pub fn from_records(records: impl IntoIterator<Item = CharRecord>) -> Self {
        let mut by_page: BTreeMap<usize, Vec<CharRecord>> = BTreeMap::new();
        for record in records {
            by_page.entry(record.page_index).or_default().push(record);
        }
        Self {
            pages: by_page
                .into_iter()
                .map(|(index, records)| PageLayout::new(index, records))
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> std::result::Result<Self, LayoutError> {
        let entries: OrderedEntries = serde_json::from_str(json)?;
        entries.into_layout()
    }

    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, LayoutError> {
        let entries: OrderedEntries = serde_json::from_reader(reader)?;
        entries.into_layout()
    }

    /// Reads and decodes a layout file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file))?)
    }

    pub fn pages(&self) -> &[PageLayout] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&PageLayout> {
        self.pages.iter().find(|page| page.index == index)
    }

    pub fn char_count(&self) -> usize {
        self.pages.iter().map(PageLayout::len).sum()
    }

    /// Records whose raw key contains `term`, ignoring case. An absent or
    /// empty term selects every record. Pages come in index order.
    pub fn search_keys(&self, term: Option<&str>) -> Vec<&CharRecord> {
        let needle = term.map(str::to_lowercase).filter(|t| !t.is_empty());
        self.pages
            .iter()
            .flat_map(|page| page.records.iter())
            .filter(|record| match &needle {
                Some(needle) => record.key.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect()
    }
}

/// Value side of one layout entry
#[derive(Debug, Deserialize)]
struct RawEntry {
    bbox: Vec<f64>,
    page_index: usize,
    #[serde(default)]
    md_index: Option<usize>,
}

/// Layout entries in document order; a plain map would lose the order
struct OrderedEntries(Vec<(String, RawEntry)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping characters to {bbox, page_index}")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, entry)) = map.next_entry::<String, RawEntry>()? {
                    entries.push((key, entry));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl OrderedEntries {
    fn into_layout(self) -> std::result::Result<LayoutDocument, LayoutError> {
        let records = self
            .0
            .into_iter()
            .map(|(key, raw)| {
                let bbox = match raw.bbox.as_slice() {
                    [left, top, right, bottom, ..] => BBox::new(*left, *top, *right, *bottom),
                    other => {
                        return Err(LayoutError::InvalidBBox {
                            key,
                            len: other.len(),
                        })
                    }
                };
                let mut record = CharRecord::new(key, bbox, raw.page_index);
                record.md_index = raw.md_index;
                Ok(record)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(LayoutDocument::from_records(records))
    }
}
