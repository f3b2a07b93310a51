use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::model::{PdfDocument, PdfRecord};
use crate::store::{ObjectStore, SettingsStore};
use crate::types::{LibraryError, Result};

const DOCUMENTS_DIR: &str = "pdfs";
const SETTINGS_FILE: &str = "settings.json";
const RECORD_EXT: &str = "json";
const FILE_EXT: &str = "pdf";

/// Directory-backed store.
///
/// Layout under the root:
///
/// ```text
/// pdfs/<id>.json    record metadata
/// pdfs/<id>.pdf     file bytes
/// settings.json     string settings map
/// ```
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    settings_lock: Mutex<()>,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join(DOCUMENTS_DIR)).await?;
        log::debug!("Opened document store at {}", root.display());
        Ok(Self {
            root,
            settings_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.documents_dir().join(format!("{}.{}", checked_id(id)?, RECORD_EXT)))
    }

    fn file_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.documents_dir().join(format!("{}.{}", checked_id(id)?, FILE_EXT)))
    }

    fn documents_dir(&self) -> PathBuf {
        self.root.join(DOCUMENTS_DIR)
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    async fn read_settings(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(self.settings_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ids become file names, so anything that could escape the directory is refused
fn checked_id(id: &str) -> Result<&str> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(LibraryError::InvalidId(id.to_string()))
    }
}

/// Write via a sibling temp file and rename, so readers never see a partial file
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_record(path: &Path) -> Result<Option<PdfRecord>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl ObjectStore for FsStore {
    async fn put(&self, document: &PdfDocument) -> Result<()> {
        let id = &document.record.id;
        // Bytes first: a record is only visible once its file exists
        write_atomic(&self.file_path(id)?, &document.file).await?;
        let json = serde_json::to_vec_pretty(&document.record)?;
        write_atomic(&self.record_path(id)?, &json).await?;
        Ok(())
    }

    async fn put_record(&self, record: &PdfRecord) -> Result<()> {
        let path = self.record_path(&record.id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(LibraryError::NotFound(record.id.clone()));
        }
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&path, &json).await
    }

    async fn get(&self, id: &str) -> Result<Option<PdfDocument>> {
        let Some(record) = self.get_record(id).await? else {
            return Ok(None);
        };
        let file = match tokio::fs::read(self.file_path(id)?).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(PdfDocument {
            record,
            file: Arc::from(file),
        }))
    }

    async fn get_record(&self, id: &str) -> Result<Option<PdfRecord>> {
        if checked_id(id).is_err() {
            return Ok(None);
        }
        read_record(&self.record_path(id)?).await
    }

    async fn get_all(&self) -> Result<Vec<PdfRecord>> {
        let mut entries = tokio::fs::read_dir(self.documents_dir()).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            match read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if checked_id(id).is_err() {
            return Ok(());
        }
        remove_if_exists(&self.record_path(id)?).await?;
        remove_if_exists(&self.file_path(id)?).await?;
        Ok(())
    }
}

impl SettingsStore for FsStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.settings_lock.lock().await;
        Ok(self.read_settings().await?.remove(key))
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.settings_lock.lock().await;
        let mut settings = self.read_settings().await?;
        settings.insert(key.to_string(), value.to_string());
        let json = serde_json::to_vec_pretty(&settings)?;
        write_atomic(&self.settings_path(), &json).await
    }
}
