use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::model::{PdfDocument, PdfRecord};
use crate::store::{ObjectStore, SettingsStore};
use crate::types::{LibraryError, Result};

/// In-memory store, used by tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, (PdfRecord, Arc<[u8]>)>>,
    settings: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, BTreeMap<String, (PdfRecord, Arc<[u8]>)>> {
        // A poisoned lock only means another thread panicked mid-update of a plain map
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn settings(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ObjectStore for MemoryStore {
    async fn put(&self, document: &PdfDocument) -> Result<()> {
        self.documents().insert(
            document.record.id.clone(),
            (document.record.clone(), Arc::clone(&document.file)),
        );
        Ok(())
    }

    async fn put_record(&self, record: &PdfRecord) -> Result<()> {
        match self.documents().get_mut(&record.id) {
            Some(entry) => {
                entry.0 = record.clone();
                Ok(())
            }
            None => Err(LibraryError::NotFound(record.id.clone())),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<PdfDocument>> {
        Ok(self
            .documents()
            .get(id)
            .map(|(record, file)| PdfDocument {
                record: record.clone(),
                file: Arc::clone(file),
            }))
    }

    async fn get_record(&self, id: &str) -> Result<Option<PdfRecord>> {
        Ok(self.documents().get(id).map(|(record, _)| record.clone()))
    }

    async fn get_all(&self) -> Result<Vec<PdfRecord>> {
        Ok(self
            .documents()
            .values()
            .map(|(record, _)| record.clone())
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.documents().remove(id);
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings().get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.settings().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
