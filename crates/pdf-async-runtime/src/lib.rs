use std::path::PathBuf;

// Re-export types from the library crate
pub use pdf_library::{BatchUploadReport, PdfListItem, UploadProgress};

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PdfCommand {
    /// Reload the library listing in saved order
    LibraryRefresh,
    Upload {
        paths: Vec<PathBuf>,
    },
    Delete {
        id: String,
    },
    ClearAll,
    /// Move one entry of the displayed list and persist the new order
    Reorder {
        items: Vec<PdfListItem>,
        from: usize,
        to: usize,
    },
    ViewerOpen {
        id: String,
    },
    ViewerRenderPage {
        page_index: usize,
    },
    /// Prefetch pages for faster navigation (lower priority than direct renders)
    ViewerPrefetchPages {
        page_indices: Vec<usize>,
    },
    /// The user moved to another page (1-based); persisted by the worker
    ViewerPageChanged {
        page: u32,
    },
    ViewerClose,
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum PdfUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    LibraryLoaded {
        items: Vec<PdfListItem>,
    },
    UploadFinished {
        report: BatchUploadReport,
    },
    /// Files refused before upload (not PDFs, or empty)
    FilesRejected {
        names: Vec<String>,
    },
    Deleted {
        id: String,
    },
    Cleared {
        count: usize,
    },
    Error {
        message: String,
    },
    ViewerOpened {
        id: String,
        name: String,
        page_count: usize,
        /// Page to show first (1-based)
        current_page: u32,
    },
    ViewerPageRendered {
        /// Document the page belongs to
        id: String,
        page_index: usize,
        width: usize,
        height: usize,
        rgba_data: Vec<u8>,
    },
    ViewerFailed {
        message: String,
    },
    /// A page of an open document could not be rendered
    ViewerPageFailed {
        id: String,
        page_index: usize,
        message: String,
    },
    ViewerClosed,
}

impl PdfUpdate {
    pub fn upload_progress(progress: UploadProgress) -> Self {
        PdfUpdate::Progress {
            operation: format!("Uploading {}/{}", progress.uploaded, progress.total),
            current: progress.uploaded,
            total: progress.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_progress_update() {
        let update = PdfUpdate::upload_progress(UploadProgress {
            uploaded: 2,
            total: 5,
        });
        match update {
            PdfUpdate::Progress {
                operation,
                current,
                total,
            } => {
                assert_eq!(operation, "Uploading 2/5");
                assert_eq!(current, 2);
                assert_eq!(total, 5);
            }
            other => panic!("Expected Progress, got {other:?}"),
        }
    }
}
