//! Opaque rectangle drawing on top of existing PDF pages
//!
//! Layout boxes use a top-left origin with y growing downward. They are
//! mapped into PDF user space relative to the page's visible box (CropBox
//! intersected with MediaBox) before drawing. Page rotation is not applied.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::config::MaskColor;
use crate::error::{Error, Result};
use crate::types::BBox;

/// US Letter, used when a page and its ancestors carry no MediaBox
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Anything that can paint an opaque rectangle on a page
pub trait MaskBackend {
    fn page_count(&self) -> usize;

    /// Paints `rect` (layout coordinates) on the zero-based `page_index`
    fn fill_rect(&mut self, page_index: usize, rect: &BBox, color: MaskColor) -> Result<()>;
}

/// `lopdf`-backed canvas over a loaded document
#[derive(Debug)]
pub struct PdfCanvas {
    document: Document,
    source: Option<PathBuf>,
    /// Zero-based page index to page object
    pages: Vec<ObjectId>,
    /// Pages whose original content is already isolated in `q`/`Q`
    wrapped: HashSet<ObjectId>,
    rects_drawn: usize,
}

impl PdfCanvas {
    /// Loads a PDF from disk; the file itself is never written
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        let document = Document::load(path).map_err(Error::pdf)?;
        let mut canvas = Self::from_document(document);
        canvas.source = Some(path.to_path_buf());
        Ok(canvas)
    }

    pub fn from_document(document: Document) -> Self {
        let pages: BTreeMap<u32, ObjectId> = document.get_pages();
        Self {
            pages: pages.into_values().collect(),
            document,
            source: None,
            wrapped: HashSet::new(),
            rects_drawn: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn rects_drawn(&self) -> usize {
        self.rects_drawn
    }

    /// Page bounds `[llx, lly, urx, ury]` in PDF user space
    pub fn media_box(&self, page_index: usize) -> Result<[f32; 4]> {
        let page_id = self.page_id(page_index)?;
        Ok(self
            .inherited_rect(page_id, b"MediaBox")?
            .unwrap_or(DEFAULT_MEDIA_BOX))
    }

    /// Visible region of the page: CropBox intersected with MediaBox, both
    /// inheritable. Layout coordinates are relative to this box.
    pub fn visible_box(&self, page_index: usize) -> Result<[f32; 4]> {
        let page_id = self.page_id(page_index)?;
        let media = self
            .inherited_rect(page_id, b"MediaBox")?
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let crop = match self.inherited_rect(page_id, b"CropBox")? {
            Some(crop) => crop,
            None => return Ok(media),
        };

        let visible = [
            crop[0].max(media[0]),
            crop[1].max(media[1]),
            crop[2].min(media[2]),
            crop[3].min(media[3]),
        ];
        if visible[0] >= visible[2] || visible[1] >= visible[3] {
            debug!("CropBox {:?} misses MediaBox {:?}, using MediaBox", crop, media);
            return Ok(media);
        }
        Ok(visible)
    }

    /// Looks `key` up on the page, then on its `/Parent` chain
    fn inherited_rect(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<[f32; 4]>> {
        let mut current = Some(page_id);
        let mut visited = HashSet::new();

        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let dict = self.document.get_object(id).and_then(Object::as_dict).map_err(Error::pdf)?;
            if let Ok(rect) = dict.get(key) {
                return self.read_rect(key, rect).map(Some);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        Ok(None)
    }

    /// Writes the document to `output` through a temporary sibling file, so a
    /// failed save never leaves a partial output behind. An untouched document
    /// is copied byte for byte from its source.
    #[instrument(skip(self))]
    pub fn save(&mut self, output: &Path) -> Result<()> {
        let output_error = |reason: String| Error::OutputError {
            path: output.to_path_buf(),
            reason,
        };

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| output_error(e.to_string()))?;
        }

        let file_name = output
            .file_name()
            .ok_or_else(|| output_error("not a file path".into()))?;
        let temp_path = output.with_file_name(format!(".{}.partial", file_name.to_string_lossy()));

        let written = match (&self.source, self.rects_drawn) {
            (Some(source), 0) => fs::copy(source, &temp_path).map(|_| ()).map_err(|e| e.to_string()),
            _ => self.document.save(&temp_path).map(|_| ()).map_err(|e| e.to_string()),
        };

        let result = written.and_then(|()| fs::rename(&temp_path, output).map_err(|e| e.to_string()));
        if let Err(reason) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(output_error(reason));
        }
        debug!("saved {} rectangles to {}", self.rects_drawn, output.display());
        Ok(())
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange {
                page: page_index,
                page_count: self.pages.len(),
            })
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).map_err(Error::pdf),
            other => Ok(other),
        }
    }

    fn read_rect(&self, key: &[u8], object: &Object) -> Result<[f32; 4]> {
        let name = String::from_utf8_lossy(key);
        let values = self.resolve(object)?.as_array().map_err(Error::pdf)?;
        let mut rect = [0.0f32; 4];
        if values.len() != 4 {
            return Err(Error::PdfError(format!(
                "{} has {} entries",
                name,
                values.len()
            )));
        }
        for (slot, value) in rect.iter_mut().zip(values) {
            *slot = match self.resolve(value)? {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r as f32,
                other => {
                    return Err(Error::PdfError(format!(
                        "{} entry is not a number: {:?}",
                        name, other
                    )))
                }
            };
        }
        // Normalise so llx <= urx and lly <= ury
        Ok([
            rect[0].min(rect[2]),
            rect[1].min(rect[3]),
            rect[0].max(rect[2]),
            rect[1].max(rect[3]),
        ])
    }

    /// Current `/Contents` of a page as a list of stream references. An
    /// indirect array is spliced in so the result never points at an array.
    fn content_refs(&self, page: &Dictionary) -> Result<Vec<Object>> {
        let contents = match page.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };
        match contents {
            Object::Array(items) => Ok(items.clone()),
            Object::Reference(id) => match self.document.get_object(*id).map_err(Error::pdf)? {
                Object::Array(items) => Ok(items.clone()),
                _ => Ok(vec![contents.clone()]),
            },
            _ => Ok(Vec::new()),
        }
    }

    fn add_content_stream(&mut self, operations: Vec<Operation>) -> Result<Object> {
        let bytes = Content { operations }.encode().map_err(Error::pdf)?;
        let id = self.document.add_object(Stream::new(Dictionary::new(), bytes));
        Ok(Object::Reference(id))
    }

    /// Appends one content stream to the page, isolating the original
    /// content in a save/restore pair on first use
    fn append_to_page(&mut self, page_id: ObjectId, operations: Vec<Operation>) -> Result<()> {
        let overlay = self.add_content_stream(operations)?;

        let page = self
            .document
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(Error::pdf)?;
        let mut contents = self.content_refs(page)?;

        if self.wrapped.insert(page_id) && !contents.is_empty() {
            let open = self.add_content_stream(vec![Operation::new("q", vec![])])?;
            let close = self.add_content_stream(vec![Operation::new("Q", vec![])])?;
            contents.insert(0, open);
            contents.push(close);
        }
        contents.push(overlay);

        let page = self
            .document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(Error::pdf)?;
        page.set("Contents", Object::Array(contents));
        Ok(())
    }
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

impl MaskBackend for PdfCanvas {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn fill_rect(&mut self, page_index: usize, rect: &BBox, color: MaskColor) -> Result<()> {
        let page_id = self.page_id(page_index)?;
        let [llx, lly, urx, ury] = self.visible_box(page_index)?;

        // Layout space -> PDF user space, clamped to the visible box
        let x0 = (rect.left as f32 + llx).clamp(llx, urx);
        let x1 = (rect.right as f32 + llx).clamp(llx, urx);
        let y_top = (ury - rect.top as f32).clamp(lly, ury);
        let y_bottom = (ury - rect.bottom as f32).clamp(lly, ury);

        let x = x0.min(x1);
        let y = y_top.min(y_bottom);
        let width = (x1 - x0).abs();
        let height = (y_top - y_bottom).abs();

        let [r, g, b] = color.components();
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("rg", vec![real(r), real(g), real(b)]),
            Operation::new("RG", vec![real(r), real(g), real(b)]),
            Operation::new("re", vec![real(x), real(y), real(width), real(height)]),
            Operation::new("B", vec![]),
            Operation::new("Q", vec![]),
        ];
        self.append_to_page(page_id, operations)?;
        self.rects_drawn += 1;
        Ok(())
    }
}
