use crate::config::LibraryConfig;
use crate::format::format_file_size;
use crate::model::{PDF_MIME_TYPE, UploadFile};
use crate::types::ValidationError;

/// Check that an incoming file can be stored as a PDF.
///
/// Oversized files are accepted; they are only reported in the log.
pub fn validate_upload(file: &UploadFile, config: &LibraryConfig) -> Result<(), ValidationError> {
    if file.name.is_empty() || file.bytes.is_empty() {
        return Err(ValidationError::EmptyFile(file.name.clone()));
    }

    if file.mime_type != PDF_MIME_TYPE {
        return Err(ValidationError::NotPdf {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }

    if file.size() > config.large_file_warning_bytes {
        log::warn!(
            "PDF file is very large: {} ({})",
            file.name,
            format_file_size(file.size())
        );
    }

    Ok(())
}

pub fn is_valid_upload(file: &UploadFile, config: &LibraryConfig) -> bool {
    validate_upload(file, config).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LibraryConfig {
        LibraryConfig {
            large_file_warning_bytes: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_accepts_pdf() {
        let file = UploadFile::new("a.pdf", PDF_MIME_TYPE, b"%PDF-1.4".to_vec());
        assert!(validate_upload(&file, &config()).is_ok());
    }

    #[test]
    fn test_rejects_empty_bytes() {
        let file = UploadFile::new("a.pdf", PDF_MIME_TYPE, Vec::new());
        assert_eq!(
            validate_upload(&file, &config()),
            Err(ValidationError::EmptyFile("a.pdf".into()))
        );
    }

    #[test]
    fn test_rejects_wrong_mime_type() {
        let file = UploadFile::new("a.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(
            validate_upload(&file, &config()),
            Err(ValidationError::NotPdf { .. })
        ));
        assert!(!is_valid_upload(&file, &config()));
    }

    #[test]
    fn test_large_file_is_still_accepted() {
        let file = UploadFile::new("big.pdf", PDF_MIME_TYPE, vec![b'x'; 64]);
        assert!(is_valid_upload(&file, &config()));
    }
}
