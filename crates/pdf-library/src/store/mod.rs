//! Persistent key-value storage for PDF documents.
//!
//! Two stores sit behind the library:
//!
//! - [`ObjectStore`] - documents keyed by id (record metadata plus file bytes)
//! - [`SettingsStore`] - small string values such as the saved display order
//!
//! Both backends here implement both traits. Durability is whatever the
//! backend provides; errors are passed through unchanged.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::future::Future;

use crate::model::{PdfDocument, PdfRecord};
use crate::types::Result;

pub trait ObjectStore: Send + Sync {
    /// Insert or replace a document (record and bytes)
    fn put(&self, document: &PdfDocument) -> impl Future<Output = Result<()>> + Send;

    /// Replace the metadata of an existing document, leaving its bytes alone
    fn put_record(&self, record: &PdfRecord) -> impl Future<Output = Result<()>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<Option<PdfDocument>>> + Send;

    fn get_record(&self, id: &str) -> impl Future<Output = Result<Option<PdfRecord>>> + Send;

    /// All records in ascending id order
    fn get_all(&self) -> impl Future<Output = Result<Vec<PdfRecord>>> + Send;

    /// Remove a document. Removing a missing id is not an error.
    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn set_setting(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;
}
