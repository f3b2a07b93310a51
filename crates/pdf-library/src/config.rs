use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{LibraryError, Result};

const APP_DIR_NAME: &str = "pdf-library";

/// Library configuration, persisted as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory holding the document store and settings
    pub data_dir: PathBuf,
    /// Cover thumbnail bounding box in pixels
    pub cover_max_width: u32,
    pub cover_max_height: u32,
    /// JPEG quality for rendered covers (1-100)
    pub cover_jpeg_quality: u8,
    /// Uploads above this size are accepted but logged as a warning
    pub large_file_warning_bytes: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cover_max_width: 200,
            cover_max_height: 280,
            cover_jpeg_quality: 80,
            large_file_warning_bytes: 100 * 1024 * 1024,
        }
    }
}

impl LibraryConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
    }

    /// Load config from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| LibraryError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config, or return defaults when the file does not exist
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await? {
            Self::load(path).await
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LibraryError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cover_max_width == 0 || self.cover_max_height == 0 {
            return Err(LibraryError::Config(
                "Cover dimensions must be non-zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.cover_jpeg_quality) {
            return Err(LibraryError::Config(format!(
                "Cover JPEG quality must be between 1 and 100, got {}",
                self.cover_jpeg_quality
            )));
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("pdf-library-data"))
}
