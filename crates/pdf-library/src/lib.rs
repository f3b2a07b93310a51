pub mod blob;
mod config;
pub mod cover;
mod format;
pub mod grid;
mod library;
mod model;
pub mod order;
pub mod store;
mod types;
mod validate;
pub mod viewer;

pub use blob::{BlobRegistry, BlobUrl};
pub use config::LibraryConfig;
pub use cover::{CoverImage, CoverRenderer, PlaceholderCoverRenderer, decode_data_url};
#[cfg(feature = "pdfium")]
pub use cover::{PdfiumCoverRenderer, init_pdfium, with_pdfium};
pub use format::format_file_size;
pub use library::{BatchUploadReport, Library, UploadProgress};
pub use model::*;
pub use store::{FsStore, MemoryStore, ObjectStore, SettingsStore};
pub use types::*;
pub use validate::{is_valid_upload, validate_upload};
pub use viewer::{ViewerSession, ViewerStatus};
