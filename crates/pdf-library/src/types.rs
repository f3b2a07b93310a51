use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Invalid upload: {0}")]
    Validation(#[from] ValidationError),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("PDF not found: {0}")]
    NotFound(String),
    #[error("Invalid id: {0:?}")]
    InvalidId(String),
    #[error("Index {index} out of range for {len} items")]
    InvalidIndex { index: usize, len: usize },
    #[error("Invalid file object: {0}")]
    InvalidFile(String),
    #[error("Invalid data URL")]
    InvalidDataUrl,
}

/// Reasons an incoming file is refused before it reaches the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyFile(String),
    #[error("{name} is not a PDF (type: {mime_type})")]
    NotPdf { name: String, mime_type: String },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
