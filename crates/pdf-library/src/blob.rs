use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::model::PdfDocument;
use crate::types::{LibraryError, Result};

const BLOB_SCHEME_PREFIX: &str = "blob:pdf-library/";

/// Temporary handle to in-memory PDF bytes, valid until revoked
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live blob URLs for the current session
#[derive(Debug, Default)]
pub struct BlobRegistry {
    blobs: Mutex<HashMap<BlobUrl, Arc<[u8]>>>,
    next: AtomicU64,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> MutexGuard<'_, HashMap<BlobUrl, Arc<[u8]>>> {
        self.blobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register the document's bytes and hand back a URL for them
    pub fn create(&self, document: &PdfDocument) -> Result<BlobUrl> {
        if document.file.is_empty() {
            log::error!(
                "Invalid file object for blob URL creation: {}",
                document.name()
            );
            return Err(LibraryError::InvalidFile(document.name().to_string()));
        }

        let serial = self.next.fetch_add(1, Ordering::SeqCst);
        let nonce: u32 = rand::thread_rng().r#gen();
        let url = BlobUrl(format!("{BLOB_SCHEME_PREFIX}{serial}-{nonce:08x}"));

        self.blobs().insert(url.clone(), Arc::clone(&document.file));
        Ok(url)
    }

    pub fn resolve(&self, url: &BlobUrl) -> Option<Arc<[u8]>> {
        self.blobs().get(url).cloned()
    }

    /// Release the bytes behind `url`. Returns false if it was not live.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        self.blobs().remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs().is_empty()
    }
}
