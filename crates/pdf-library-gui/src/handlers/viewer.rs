use pdf_async_runtime::PdfUpdate;
use pdf_library::viewer::RENDER_FAILED_MESSAGE;
use pdf_library::{ViewerSession, ViewerStatus};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::viewer::{CachedPage, PageCache};
use crate::worker::AppLibrary;

#[cfg(feature = "pdf-viewer")]
use pdf_library::with_pdfium;
#[cfg(feature = "pdf-viewer")]
use pdfium_render::prelude::*;

#[cfg(feature = "pdf-viewer")]
const RENDER_WIDTH: i32 = 800;
#[cfg(feature = "pdf-viewer")]
const RENDER_MAX_HEIGHT: i32 = 1100;

/// Worker-side state of the open document
#[derive(Default)]
pub struct ViewerWorkerState {
    session: Option<ViewerSession>,
    cache: PageCache,
}

impl ViewerWorkerState {
    /// Id of the open document, empty when none is open
    fn document_id(&self) -> String {
        self.session
            .as_ref()
            .and_then(|session| session.document())
            .map(|document| document.id().to_string())
            .unwrap_or_default()
    }

    fn bytes(&self, library: &AppLibrary) -> Option<Arc<[u8]>> {
        let url = self.session.as_ref()?.blob_url()?;
        library.resolve_blob_url(url)
    }
}

#[cfg(feature = "pdf-viewer")]
fn count_pages(bytes: &[u8]) -> Result<usize, PdfiumError> {
    with_pdfium(|pdfium| {
        let document = pdfium.load_pdf_from_byte_slice(bytes, None)?;
        Ok(document.pages().len() as usize)
    })
}

#[cfg(feature = "pdf-viewer")]
fn render_page(bytes: &[u8], page_index: usize) -> Result<CachedPage, PdfiumError> {
    with_pdfium(|pdfium| {
        let document = pdfium.load_pdf_from_byte_slice(bytes, None)?;
        let page = document.pages().get(page_index as u16)?;

        let config = PdfRenderConfig::new()
            .set_target_width(RENDER_WIDTH)
            .set_maximum_height(RENDER_MAX_HEIGHT);

        let bitmap = page.render_with_config(&config)?;
        Ok(CachedPage {
            rgba_data: bitmap.as_rgba_bytes().to_vec(),
            width: bitmap.width() as usize,
            height: bitmap.height() as usize,
        })
    })
}

pub async fn handle_open(
    id: String,
    library: &AppLibrary,
    state: &mut ViewerWorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    if let Some(previous) = state.session.take() {
        previous.close(library).await;
    }
    state.cache.clear();

    let mut session = ViewerSession::open(library, Some(id.as_str())).await;
    if let ViewerStatus::Failed(message) = session.status() {
        let _ = update_tx.send(PdfUpdate::ViewerFailed {
            message: message.clone(),
        });
        state.session = Some(session);
        return;
    }

    let bytes = session
        .blob_url()
        .and_then(|url| library.resolve_blob_url(url));
    let Some(bytes) = bytes else {
        session.on_pdf_loading_failed("blob URL missing");
        let _ = update_tx.send(PdfUpdate::ViewerFailed {
            message: RENDER_FAILED_MESSAGE.to_string(),
        });
        state.session = Some(session);
        return;
    };

    match load_page_count(bytes).await {
        Ok(page_count) => {
            session.on_pdf_loaded(page_count as u32);
            let _ = update_tx.send(PdfUpdate::ViewerOpened {
                id,
                name: session.title().to_string(),
                page_count,
                current_page: session.current_page(),
            });
        }
        Err(reason) => {
            session.on_pdf_loading_failed(&reason);
            let _ = update_tx.send(PdfUpdate::ViewerFailed {
                message: RENDER_FAILED_MESSAGE.to_string(),
            });
        }
    }
    state.session = Some(session);
}

#[cfg(feature = "pdf-viewer")]
async fn load_page_count(bytes: Arc<[u8]>) -> Result<usize, String> {
    match tokio::task::spawn_blocking(move || count_pages(&bytes)).await {
        Ok(Ok(count)) => Ok(count),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("Task join error: {}", e)),
    }
}

#[cfg(not(feature = "pdf-viewer"))]
async fn load_page_count(_bytes: Arc<[u8]>) -> Result<usize, String> {
    Err("PDF viewer not available (pdf-viewer feature disabled)".to_string())
}

#[cfg(feature = "pdf-viewer")]
pub async fn handle_render_page(
    page_index: usize,
    library: &AppLibrary,
    state: &mut ViewerWorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let id = state.document_id();
    if let Some(cached) = state.cache.get(page_index) {
        let _ = update_tx.send(PdfUpdate::ViewerPageRendered {
            id,
            page_index,
            width: cached.width,
            height: cached.height,
            rgba_data: cached.rgba_data.clone(),
        });
        return;
    }

    let Some(bytes) = state.bytes(library) else {
        let _ = update_tx.send(PdfUpdate::ViewerPageFailed {
            id,
            page_index,
            message: "No document open".to_string(),
        });
        return;
    };

    let message = match tokio::task::spawn_blocking(move || render_page(&bytes, page_index)).await {
        Ok(Ok(page)) => {
            state.cache.insert(page_index, page.clone());
            let _ = update_tx.send(PdfUpdate::ViewerPageRendered {
                id,
                page_index,
                width: page.width,
                height: page.height,
                rgba_data: page.rgba_data,
            });
            return;
        }
        Ok(Err(e)) => format!("Failed to render page: {}", e),
        Err(e) => format!("Task join error: {}", e),
    };
    log::error!("Page {} of {}: {}", page_index + 1, id, message);
    let _ = update_tx.send(PdfUpdate::ViewerPageFailed {
        id,
        page_index,
        message,
    });
}

/// Prefetch pages into cache without sending updates to UI
#[cfg(feature = "pdf-viewer")]
pub async fn handle_prefetch_pages(
    page_indices: Vec<usize>,
    library: &AppLibrary,
    state: &mut ViewerWorkerState,
) {
    for page_index in page_indices {
        if state.cache.contains(page_index) {
            continue;
        }
        let Some(bytes) = state.bytes(library) else {
            return;
        };

        match tokio::task::spawn_blocking(move || render_page(&bytes, page_index)).await {
            Ok(Ok(page)) => {
                state.cache.insert(page_index, page);
                log::debug!(
                    "Prefetched page {} into cache ({} cached)",
                    page_index,
                    state.cache.len()
                );
            }
            Ok(Err(e)) => log::warn!("Failed to prefetch page {}: {}", page_index, e),
            Err(e) => log::warn!("Prefetch task join error for page {}: {}", page_index, e),
        }
    }
}

pub async fn handle_page_changed(page: u32, library: &AppLibrary, state: &mut ViewerWorkerState) {
    if let Some(session) = state.session.as_mut() {
        session.on_page_change(library, page).await;
    }
}

pub async fn handle_close(
    library: &AppLibrary,
    state: &mut ViewerWorkerState,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    if let Some(session) = state.session.take() {
        session.close(library).await;
    }
    state.cache.clear();
    let _ = update_tx.send(PdfUpdate::ViewerClosed);
}

#[cfg(not(feature = "pdf-viewer"))]
pub async fn handle_viewer_unavailable(update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    let _ = update_tx.send(PdfUpdate::Error {
        message: "PDF viewer not available (pdf-viewer feature disabled)".to_string(),
    });
}
