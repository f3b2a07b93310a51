use pdf_async_runtime::{PdfListItem, PdfUpdate};
use pdf_library::{BatchUploadReport, UploadFile};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::worker::AppLibrary;

pub async fn handle_refresh(library: &AppLibrary, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    match library.list().await {
        Ok(items) => {
            let _ = update_tx.send(PdfUpdate::LibraryLoaded { items });
        }
        Err(e) => {
            log::error!("Error loading PDFs: {}", e);
            let _ = update_tx.send(PdfUpdate::Error {
                message: format!("Failed to load library: {}", e),
            });
        }
    }
}

pub async fn handle_upload(
    paths: Vec<PathBuf>,
    library: &AppLibrary,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let mut files = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match UploadFile::from_path(&path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                log::error!("Error reading {}: {}", path.display(), e);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                unreadable.push((name, e.to_string()));
            }
        }
    }

    let progress_tx = update_tx.clone();
    let mut report = library
        .upload_batch(files, move |progress| {
            let _ = progress_tx.send(PdfUpdate::upload_progress(progress));
        })
        .await;
    report.failed.extend(unreadable);

    if !report.rejected.is_empty() {
        let _ = update_tx.send(PdfUpdate::FilesRejected {
            names: report.rejected.clone(),
        });
    }

    let uploaded_any = !report.succeeded.is_empty();
    let _ = update_tx.send(PdfUpdate::UploadFinished { report });

    if uploaded_any {
        handle_refresh(library, update_tx).await;
    }
}

pub async fn handle_delete(
    id: String,
    library: &AppLibrary,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match library.delete(&id).await {
        Ok(()) => {
            let _ = update_tx.send(PdfUpdate::Deleted { id });
            handle_refresh(library, update_tx).await;
        }
        Err(e) => {
            log::error!("Error deleting PDF: {}", e);
            let _ = update_tx.send(PdfUpdate::Error {
                message: "Failed to delete PDF. Please try again.".to_string(),
            });
        }
    }
}

pub async fn handle_clear_all(library: &AppLibrary, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    match library.clear_all().await {
        Ok(count) => {
            let _ = update_tx.send(PdfUpdate::Cleared { count });
        }
        Err(e) => {
            log::error!("Error deleting all PDFs: {}", e);
            let _ = update_tx.send(PdfUpdate::Error {
                message: "Failed to delete some PDFs. Please try again.".to_string(),
            });
        }
    }
    // Partial failures still changed the listing
    handle_refresh(library, update_tx).await;
}

pub async fn handle_reorder(
    mut items: Vec<PdfListItem>,
    from: usize,
    to: usize,
    library: &AppLibrary,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match library.move_item(&mut items, from, to).await {
        Ok(()) => {
            let _ = update_tx.send(PdfUpdate::LibraryLoaded { items });
        }
        Err(e) => {
            let _ = update_tx.send(PdfUpdate::Error {
                message: format!("Could not move PDF: {}", e),
            });
        }
    }
}

/// Summary line for the status bar after a batch finishes
pub fn describe_report(report: &BatchUploadReport) -> String {
    match (report.succeeded.len(), report.failed.len()) {
        (0, 0) => "No PDFs uploaded".to_string(),
        (1, 0) => format!("Uploaded {}", report.succeeded[0].0),
        (ok, 0) => format!("Uploaded {} PDFs", ok),
        (ok, _) => {
            let failed: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
            format!(
                "Uploaded {} PDFs. Failed to upload some files: {}. Please try uploading them individually.",
                ok,
                failed.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_report() {
        let mut report = BatchUploadReport::default();
        assert_eq!(describe_report(&report), "No PDFs uploaded");

        report.succeeded.push(("a.pdf".into(), "id1".into()));
        assert_eq!(describe_report(&report), "Uploaded a.pdf");

        report.succeeded.push(("b.pdf".into(), "id2".into()));
        assert_eq!(describe_report(&report), "Uploaded 2 PDFs");

        report.failed.push(("c.pdf".into(), "boom".into()));
        assert!(describe_report(&report).contains("c.pdf"));
    }
}
