//! Viewer session: which document is open, its blob URL, and the page shown.
//!
//! The session does not render anything. A front end opens a session, hands
//! the blob URL's bytes to its renderer, and reports renderer events back via
//! [`ViewerSession::on_pdf_loaded`], [`ViewerSession::on_pdf_loading_failed`]
//! and [`ViewerSession::on_page_change`]. Page changes are persisted so the
//! next session resumes where this one stopped.

use crate::blob::BlobUrl;
use crate::library::Library;
use crate::model::PdfDocument;
use crate::store::{ObjectStore, SettingsStore};

pub const NO_ID_MESSAGE: &str = "No PDF ID provided";
pub const NOT_FOUND_MESSAGE: &str = "PDF not found in database";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load PDF from database";
pub const RENDER_FAILED_MESSAGE: &str = "Failed to render PDF in viewer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub struct ViewerSession {
    document: Option<PdfDocument>,
    blob_url: Option<BlobUrl>,
    current_page: u32,
    page_count: Option<u32>,
    status: ViewerStatus,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self {
            document: None,
            blob_url: None,
            current_page: 1,
            page_count: None,
            status: ViewerStatus::Loading,
        }
    }
}

impl ViewerSession {
    /// Load a document for viewing and restore its saved page
    pub async fn open<S>(library: &Library<S>, id: Option<&str>) -> Self
    where
        S: ObjectStore + SettingsStore,
    {
        let mut session = Self::default();
        match id {
            Some(id) => session.load(library, id).await,
            None => session.status = ViewerStatus::Failed(NO_ID_MESSAGE.to_string()),
        }
        session
    }

    async fn load<S>(&mut self, library: &Library<S>, id: &str)
    where
        S: ObjectStore + SettingsStore,
    {
        self.status = ViewerStatus::Loading;

        let document = match library.get(id).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                self.status = ViewerStatus::Failed(NOT_FOUND_MESSAGE.to_string());
                return;
            }
            Err(e) => {
                log::error!("Error loading PDF {}: {}", id, e);
                self.status = ViewerStatus::Failed(LOAD_FAILED_MESSAGE.to_string());
                return;
            }
        };

        if let Some(previous) = self.blob_url.take() {
            library.revoke_blob_url(&previous);
        }
        self.blob_url = match library.create_blob_url(&document) {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("Error creating blob URL for {}: {}", id, e);
                None
            }
        };

        match library.current_page(id).await {
            Ok(Some(page)) => self.current_page = page,
            Ok(None) => {}
            Err(e) => log::warn!("Could not read saved page for {}: {}", id, e),
        }

        log::info!("PDF loaded successfully: {}", document.name());
        self.document = Some(document);
        self.status = if self.blob_url.is_some() {
            ViewerStatus::Ready
        } else {
            ViewerStatus::Failed(LOAD_FAILED_MESSAGE.to_string())
        };
    }

    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    pub fn document(&self) -> Option<&PdfDocument> {
        self.document.as_ref()
    }

    pub fn blob_url(&self) -> Option<&BlobUrl> {
        self.blob_url.as_ref()
    }

    /// 1-based page currently shown
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    /// Title for the header bar
    pub fn title(&self) -> &str {
        self.document
            .as_ref()
            .map(|d| d.name())
            .unwrap_or("Loading...")
    }

    /// The renderer finished loading the document
    pub fn on_pdf_loaded(&mut self, page_count: u32) {
        log::debug!("PDF loaded in viewer with {} pages", page_count);
        self.page_count = Some(page_count);
        if page_count > 0 {
            self.current_page = self.current_page.clamp(1, page_count);
        }
    }

    pub fn on_pdf_loading_failed(&mut self, reason: &str) {
        log::error!("PDF loading failed: {}", reason);
        self.status = ViewerStatus::Failed(RENDER_FAILED_MESSAGE.to_string());
    }

    /// The renderer moved to another page; remember it
    pub async fn on_page_change<S>(&mut self, library: &Library<S>, page: u32)
    where
        S: ObjectStore + SettingsStore,
    {
        self.current_page = page;
        self.save_current_page(library).await;
    }

    /// Persist the current page. Errors are logged, never returned.
    pub async fn save_current_page<S>(&self, library: &Library<S>)
    where
        S: ObjectStore + SettingsStore,
    {
        let Some(document) = &self.document else {
            return;
        };
        if self.current_page == 0 {
            return;
        }

        match library
            .save_current_page(document.id(), self.current_page)
            .await
        {
            Ok(()) => log::debug!("Current page saved: {}", self.current_page),
            Err(e) => log::error!("Error saving current page: {}", e),
        }
    }

    /// Save the page and release the blob URL
    pub async fn close<S>(mut self, library: &Library<S>)
    where
        S: ObjectStore + SettingsStore,
    {
        self.save_current_page(library).await;
        if let Some(url) = self.blob_url.take() {
            library.revoke_blob_url(&url);
        }
    }
}
