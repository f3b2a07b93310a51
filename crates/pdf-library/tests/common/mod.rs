#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_library::*;
use std::sync::Arc;

/// Build an in-memory PDF with `num_pages` empty Letter pages
pub fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize test PDF");
    bytes
}

pub fn pdf_upload(name: &str, pages: usize) -> UploadFile {
    UploadFile::new(name, PDF_MIME_TYPE, create_test_pdf(pages))
}

/// Renderer that always fails, to exercise the placeholder fallback
pub struct FailingRenderer;

impl CoverRenderer for FailingRenderer {
    fn render(&self, _bytes: &[u8], _name: &str) -> Result<CoverImage> {
        Err(LibraryError::Render("no renderer in tests".to_string()))
    }
}

/// Renderer returning a fixed tiny cover
pub struct FixedRenderer;

impl CoverRenderer for FixedRenderer {
    fn render(&self, _bytes: &[u8], _name: &str) -> Result<CoverImage> {
        Ok(CoverImage {
            mime_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8, 0xff],
        })
    }
}

pub fn memory_library() -> Library<MemoryStore> {
    Library::new(LibraryConfig::default(), MemoryStore::new()).with_renderer(Arc::new(FixedRenderer))
}

pub fn sample_record(id: &str) -> PdfRecord {
    PdfRecord {
        id: id.to_string(),
        name: format!("{id}.pdf"),
        mime_type: PDF_MIME_TYPE.to_string(),
        upload_date: chrono::Utc::now(),
        size: 4,
        cover_image: None,
        current_page: None,
    }
}

pub fn sample_document(id: &str) -> PdfDocument {
    PdfDocument {
        record: sample_record(id),
        file: Arc::from(b"%PDF".to_vec()),
    }
}

/// Memory store that fails writes of one file name and, optionally, every read
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_put_name: Option<String>,
    fail_get: bool,
}

impl FlakyStore {
    pub fn failing_put(name: &str) -> Self {
        Self {
            fail_put_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_get() -> Self {
        Self {
            fail_get: true,
            ..Default::default()
        }
    }
}

impl ObjectStore for FlakyStore {
    async fn put(&self, document: &PdfDocument) -> Result<()> {
        if self.fail_put_name.as_deref() == Some(document.record.name.as_str()) {
            return Err(LibraryError::Render("disk full".to_string()));
        }
        self.inner.put(document).await
    }

    async fn put_record(&self, record: &PdfRecord) -> Result<()> {
        self.inner.put_record(record).await
    }

    async fn get(&self, id: &str) -> Result<Option<PdfDocument>> {
        if self.fail_get {
            return Err(LibraryError::Render("database unavailable".to_string()));
        }
        self.inner.get(id).await
    }

    async fn get_record(&self, id: &str) -> Result<Option<PdfRecord>> {
        self.inner.get_record(id).await
    }

    async fn get_all(&self) -> Result<Vec<PdfRecord>> {
        self.inner.get_all().await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }
}

impl SettingsStore for FlakyStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_setting(key).await
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set_setting(key, value).await
    }
}

pub fn flaky_library(store: FlakyStore) -> Library<FlakyStore> {
    Library::new(LibraryConfig::default(), store).with_renderer(Arc::new(FixedRenderer))
}
