use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::blob::{BlobRegistry, BlobUrl};
use crate::config::LibraryConfig;
use crate::cover::{CoverRenderer, default_renderer, generate_cover};
use crate::model::{PdfDocument, PdfListItem, PdfRecord, UploadFile, generate_id};
use crate::order::{ORDER_KEY, apply_order, order_ids, parse_order, reorder};
use crate::store::{FsStore, ObjectStore, SettingsStore};
use crate::types::{LibraryError, Result};
use crate::validate::validate_upload;

/// Batch upload progress: files finished (successfully or not) out of total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub uploaded: usize,
    pub total: usize,
}

impl UploadProgress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.uploaded as f32 / self.total as f32 * 100.0
    }

    pub fn fraction(&self) -> f32 {
        self.percent() / 100.0
    }
}

/// Outcome of uploading a set of files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUploadReport {
    /// (file name, new id)
    pub succeeded: Vec<(String, String)>,
    /// (file name, error message)
    pub failed: Vec<(String, String)>,
    /// Files refused by validation; never uploaded
    pub rejected: Vec<String>,
}

impl BatchUploadReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// The PDF library: document store plus the operations the front ends use
pub struct Library<S> {
    config: LibraryConfig,
    store: S,
    renderer: Arc<dyn CoverRenderer>,
    blobs: BlobRegistry,
}

impl Library<FsStore> {
    /// Open the on-disk library in `config.data_dir`
    pub async fn open(config: LibraryConfig) -> Result<Self> {
        config.validate()?;
        let store = FsStore::open(&config.data_dir).await?;
        Ok(Self::new(config, store))
    }
}

impl<S: ObjectStore + SettingsStore> Library<S> {
    pub fn new(config: LibraryConfig, store: S) -> Self {
        let renderer = default_renderer(&config);
        Self {
            config,
            store,
            renderer,
            blobs: BlobRegistry::new(),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn CoverRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and store one file; returns the new document id
    pub async fn upload(&self, file: UploadFile) -> Result<String> {
        validate_upload(&file, &self.config)?;
        self.store_upload(file).await
    }

    async fn store_upload(&self, file: UploadFile) -> Result<String> {
        let id = generate_id();
        let size = file.size();
        log::info!("Uploading PDF: {} Size: {}", file.name, size);

        let bytes: Arc<[u8]> = Arc::from(file.bytes);
        let cover = generate_cover(
            Arc::clone(&self.renderer),
            Arc::clone(&bytes),
            &file.name,
            &self.config,
        )
        .await?;

        let record = PdfRecord {
            id: id.clone(),
            name: file.name,
            mime_type: file.mime_type,
            upload_date: Utc::now(),
            size,
            cover_image: Some(cover),
            current_page: None,
        };
        self.store
            .put(&PdfDocument {
                record,
                file: bytes,
            })
            .await?;

        log::info!("PDF uploaded successfully with ID: {}", id);
        Ok(id)
    }

    /// Upload many files concurrently.
    ///
    /// Invalid files are reported in `rejected` and skipped. `on_progress`
    /// fires once per attempted file, after it finishes either way.
    pub async fn upload_batch<F>(&self, files: Vec<UploadFile>, on_progress: F) -> BatchUploadReport
    where
        F: Fn(UploadProgress) + Sync,
    {
        let mut report = BatchUploadReport::default();
        let mut valid = Vec::with_capacity(files.len());
        for file in files {
            match validate_upload(&file, &self.config) {
                Ok(()) => valid.push(file),
                Err(e) => {
                    log::warn!("Rejected upload: {}", e);
                    report.rejected.push(file.name);
                }
            }
        }

        let total = valid.len();
        if total == 0 {
            return report;
        }
        log::info!("Starting batch upload of {} PDFs", total);

        let finished = AtomicUsize::new(0);
        let uploads = valid.into_iter().enumerate().map(|(index, file)| {
            let finished = &finished;
            let on_progress = &on_progress;
            async move {
                let name = file.name.clone();
                let result = self.store_upload(file).await;
                if let Err(e) = &result {
                    log::error!("Error uploading PDF {} ({}): {}", index + 1, name, e);
                }
                let uploaded = finished.fetch_add(1, Ordering::SeqCst) + 1;
                on_progress(UploadProgress { uploaded, total });
                (name, result)
            }
        });

        for (name, result) in futures::future::join_all(uploads).await {
            match result {
                Ok(id) => report.succeeded.push((name, id)),
                Err(e) => report.failed.push((name, e.to_string())),
            }
        }

        log::info!(
            "Batch upload completed: {} successful, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    /// All documents as list items, in the saved display order
    pub async fn list(&self) -> Result<Vec<PdfListItem>> {
        let items: Vec<PdfListItem> = self
            .store
            .get_all()
            .await?
            .iter()
            .map(PdfListItem::from)
            .collect();

        Ok(match self.saved_order().await {
            Some(order) => apply_order(items, &order),
            None => items,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<PdfDocument>> {
        self.store.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        log::info!("PDF deleted successfully with ID: {}", id);
        Ok(())
    }

    /// Delete every document; returns how many were removed
    pub async fn clear_all(&self) -> Result<usize> {
        let items = self.list().await?;
        for item in &items {
            self.store.delete(&item.id).await?;
        }
        log::info!("All PDFs deleted successfully ({})", items.len());
        Ok(items.len())
    }

    /// Remember the last viewed page (1-based) for a document
    pub async fn save_current_page(&self, id: &str, page: u32) -> Result<()> {
        let mut record = self
            .store
            .get_record(id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        record.current_page = Some(page);
        self.store.put_record(&record).await?;
        log::debug!("Current page saved: {} for {}", page, id);
        Ok(())
    }

    /// Last viewed page, if one was saved
    pub async fn current_page(&self, id: &str) -> Result<Option<u32>> {
        Ok(self
            .store
            .get_record(id)
            .await?
            .and_then(|record| record.current_page)
            .filter(|page| *page > 0))
    }

    pub async fn save_order(&self, items: &[PdfListItem]) -> Result<()> {
        let json = serde_json::to_string(&order_ids(items))?;
        self.store.set_setting(ORDER_KEY, &json).await
    }

    /// The saved display order; read or parse failures count as no order
    pub async fn saved_order(&self) -> Option<Vec<String>> {
        match self.store.get_setting(ORDER_KEY).await {
            Ok(Some(raw)) => parse_order(&raw),
            Ok(None) => None,
            Err(e) => {
                log::error!("Error loading PDF order: {}", e);
                None
            }
        }
    }

    /// Move one entry of a displayed list and persist the new order.
    ///
    /// Saving the order is best-effort: a failure is logged, the in-memory
    /// move stands.
    pub async fn move_item(&self, items: &mut Vec<PdfListItem>, from: usize, to: usize) -> Result<()> {
        reorder(items, from, to)?;
        if let Err(e) = self.save_order(items).await {
            log::error!("Error saving PDF order: {}", e);
        }
        Ok(())
    }

    pub fn create_blob_url(&self, document: &PdfDocument) -> Result<BlobUrl> {
        self.blobs.create(document)
    }

    pub fn resolve_blob_url(&self, url: &BlobUrl) -> Option<Arc<[u8]>> {
        self.blobs.resolve(url)
    }

    pub fn revoke_blob_url(&self, url: &BlobUrl) -> bool {
        self.blobs.revoke(url)
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Number of pages in a stored document
    pub async fn page_count(&self, document: &PdfDocument) -> Result<usize> {
        let bytes = Arc::clone(&document.file);
        let count = tokio::task::spawn_blocking(move || {
            let doc = lopdf::Document::load_mem(&bytes)?;
            Ok::<_, LibraryError>(doc.get_pages().len())
        })
        .await??;
        Ok(count)
    }
}
