use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Result;

pub const PDF_MIME_TYPE: &str = "application/pdf";
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Persisted metadata for one stored PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub upload_date: DateTime<Utc>,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Last viewed page (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
}

/// A record together with its file contents
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub record: PdfRecord,
    pub file: Arc<[u8]>,
}

impl PdfDocument {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}

/// Listing projection of a record, without the page position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfListItem {
    pub id: String,
    pub name: String,
    pub upload_date: DateTime<Utc>,
    pub size: u64,
    pub cover_image: Option<String>,
}

impl From<&PdfRecord> for PdfListItem {
    fn from(record: &PdfRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            upload_date: record.upload_date,
            size: record.size,
            cover_image: record.cover_image.clone(),
        }
    }
}

/// A file offered for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            mime_type: mime_type_for_path(path).to_string(),
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// MIME type a file picker would report for this path
pub fn mime_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MIME_TYPE,
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Generate a document id: base-36 millisecond timestamp plus a random base-36 tail.
pub fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let tail: u64 = rand::thread_rng().r#gen();

    // Fixed-width tail keeps ids the same length within a millisecond
    let tail = to_base36(tail);
    format!("{}{:0>13}", to_base36(millis), tail)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u64::MAX), "3w5e11264sgsf");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generated_id_is_lowercase_alphanumeric() {
        let id = generate_id();
        assert!(id.len() > 13);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path(Path::new("book.pdf")), PDF_MIME_TYPE);
        assert_eq!(mime_type_for_path(Path::new("BOOK.PDF")), PDF_MIME_TYPE);
        assert_eq!(
            mime_type_for_path(Path::new("notes.txt")),
            "application/octet-stream"
        );
        assert_eq!(
            mime_type_for_path(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_list_item_projection() {
        let record = PdfRecord {
            id: "abc".into(),
            name: "a.pdf".into(),
            mime_type: PDF_MIME_TYPE.into(),
            upload_date: Utc::now(),
            size: 42,
            cover_image: Some("data:image/png;base64,AA==".into()),
            current_page: Some(7),
        };
        let item = PdfListItem::from(&record);
        assert_eq!(item.id, "abc");
        assert_eq!(item.size, 42);
        assert_eq!(item.cover_image, record.cover_image);
    }
}
