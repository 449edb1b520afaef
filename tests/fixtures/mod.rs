use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PAGE_WIDTH: i64 = 600;
pub const PAGE_HEIGHT: i64 = 800;

/// Scratch directory holding one input PDF and one layout file
pub struct TestFixtures {
    dir: TempDir,
}

impl TestFixtures {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `input.pdf` with `page_count` text pages and returns its path
    pub fn pdf(&self, page_count: usize) -> PathBuf {
        let path = self.path("input.pdf");
        write_pdf(&path, page_count);
        path
    }

    /// Writes `chars.json` and returns its path
    pub fn layout(&self, json: &str) -> PathBuf {
        let path = self.path("chars.json");
        fs::write(&path, json).unwrap();
        path
    }
}

pub fn write_pdf(path: &Path, page_count: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for index in 0..page_count {
        let text = format!("BT /F1 12 Tf 72 700 Td (page {} 张三) Tj ET", index);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), text.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_count as i64),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// `/Contents` of a zero-based page, always as a list
pub fn page_contents(path: &Path, page_index: usize) -> Vec<Object> {
    let doc = Document::load(path).unwrap();
    let page_id = *doc.get_pages().values().nth(page_index).unwrap();
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    match page.get(b"Contents").unwrap() {
        Object::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Two characters on page 0, as in the upstream tool's documentation
pub const ZHANG_SAN: &str = r#"{
    "张": {"bbox": [10, 10, 20, 20], "page_index": 0, "md_index": 0},
    "三": {"bbox": [20, 10, 30, 20], "page_index": 0, "md_index": 1}
}"#;

/// "张三" once on each of two pages, plus unrelated characters
pub const TWO_PAGES: &str = r#"{
    "合": {"bbox": [10, 10, 20, 20], "page_index": 0},
    "同": {"bbox": [20, 10, 30, 20], "page_index": 0},
    "张": {"bbox": [40, 10, 50, 20], "page_index": 0},
    "三": {"bbox": [50, 10, 60, 20], "page_index": 0},
    "张_1": {"bbox": [100, 300, 112, 314], "page_index": 1},
    "三_1": {"bbox": [112, 302, 124, 316], "page_index": 1},
    "签": {"bbox": [130, 300, 142, 314], "page_index": 1}
}"#;
