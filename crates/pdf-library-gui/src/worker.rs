use pdf_async_runtime::{PdfCommand, PdfUpdate};
use pdf_library::{FsStore, Library};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::handlers;
use crate::handlers::viewer::ViewerWorkerState;

pub type AppLibrary = Library<FsStore>;

/// Async worker task that processes library commands and sends updates
pub async fn worker_task(
    library: Arc<AppLibrary>,
    mut command_rx: mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: mpsc::UnboundedSender<PdfUpdate>,
) {
    let mut viewer_state = ViewerWorkerState::default();

    while let Some(cmd) = command_rx.recv().await {
        process_command(
            cmd,
            &library,
            &mut viewer_state,
            &mut command_rx,
            &update_tx,
        )
        .await;
    }

    // UI went away; make sure the last page is persisted
    handlers::viewer::handle_close(&library, &mut viewer_state, &update_tx).await;
}

async fn process_command(
    cmd: PdfCommand,
    library: &AppLibrary,
    viewer_state: &mut ViewerWorkerState,
    #[cfg_attr(not(feature = "pdf-viewer"), allow(unused_variables))]
    command_rx: &mut mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match cmd {
        PdfCommand::LibraryRefresh => {
            handlers::library::handle_refresh(library, update_tx).await;
        }
        PdfCommand::Upload { paths } => {
            handlers::library::handle_upload(paths, library, update_tx).await;
        }
        PdfCommand::Delete { id } => {
            handlers::library::handle_delete(id, library, update_tx).await;
        }
        PdfCommand::ClearAll => {
            handlers::library::handle_clear_all(library, update_tx).await;
        }
        PdfCommand::Reorder { items, from, to } => {
            handlers::library::handle_reorder(items, from, to, library, update_tx).await;
        }
        PdfCommand::ViewerOpen { id } => {
            handlers::viewer::handle_open(id, library, viewer_state, update_tx).await;
        }
        #[cfg(feature = "pdf-viewer")]
        PdfCommand::ViewerRenderPage { mut page_index } => {
            // Deduplicate render commands - keep the most recent one
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let PdfCommand::ViewerRenderPage {
                    page_index: new_page_index,
                } = next_cmd
                {
                    log::debug!("Discarding queued page render, using newer request");
                    page_index = new_page_index;
                } else if let PdfCommand::ViewerPrefetchPages { .. } = next_cmd {
                    log::debug!("Discarding prefetch during page navigation");
                } else {
                    // Can't requeue, so handle it before the render
                    Box::pin(process_command(
                        next_cmd,
                        library,
                        viewer_state,
                        command_rx,
                        update_tx,
                    ))
                    .await;
                }
            }

            handlers::viewer::handle_render_page(page_index, library, viewer_state, update_tx)
                .await;
        }
        #[cfg(feature = "pdf-viewer")]
        PdfCommand::ViewerPrefetchPages { page_indices } => {
            handlers::viewer::handle_prefetch_pages(page_indices, library, viewer_state).await;
        }
        #[cfg(not(feature = "pdf-viewer"))]
        PdfCommand::ViewerRenderPage { .. } | PdfCommand::ViewerPrefetchPages { .. } => {
            handlers::viewer::handle_viewer_unavailable(update_tx).await;
        }
        PdfCommand::ViewerPageChanged { page } => {
            handlers::viewer::handle_page_changed(page, library, viewer_state).await;
        }
        PdfCommand::ViewerClose => {
            handlers::viewer::handle_close(library, viewer_state, update_tx).await;
        }
    }
}
