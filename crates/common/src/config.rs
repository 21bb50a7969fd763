//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BirthcardError, BirthcardResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote spreadsheet/storage backend.
    pub storage: StorageConfig,

    /// Background template images.
    pub templates: TemplateConfig,

    /// Font files for the two text layers.
    #[serde(default)]
    pub fonts: FontConfig,

    /// Directory where locally exported images are written.
    pub export_dir: PathBuf,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Storage backend endpoint and the sheet layout it writes into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Script endpoint receiving `uploadFile` / `updateCell` actions.
    pub endpoint: String,

    /// Folder that uploaded images are stored in.
    pub folder_id: String,

    /// Sheet holding the patient records.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// 1-based column that receives the uploaded image URL (8 = column H).
    #[serde(default = "default_image_column")]
    pub image_column: u32,
}

/// Template image locations, one per gender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub boy: PathBuf,
    pub girl: PathBuf,
}

/// Optional TrueType fonts. A missing entry falls back to the built-in bitmap font.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontConfig {
    pub cast: Option<PathBuf>,
    pub date: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "birthcard=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

fn default_sheet_name() -> String {
    "Data".to_string()
}

fn default_image_column() -> u32 {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            templates: TemplateConfig::default(),
            fonts: FontConfig::default(),
            export_dir: default_export_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            folder_id: String::new(),
            sheet_name: default_sheet_name(),
            image_column: default_image_column(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        let base = data_dir().join("templates");
        Self {
            boy: base.join("baby_boy.png"),
            girl: base.join("baby_girl.png"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl StorageConfig {
    /// Check that the backend can actually be reached before attempting an upload.
    pub fn validate(&self) -> BirthcardResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(BirthcardError::config("storage.endpoint is not set"));
        }
        if self.folder_id.trim().is_empty() {
            return Err(BirthcardError::config("storage.folder_id is not set"));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(BirthcardError::config("storage.sheet_name is empty"));
        }
        if self.image_column == 0 {
            return Err(BirthcardError::config(
                "storage.image_column is 1-based and must be at least 1",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> BirthcardResult<Self> {
        if !path.exists() {
            return Err(BirthcardError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> BirthcardResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> BirthcardResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("birthcard").join("config.json")
}

fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("birthcard")
}

/// Default local export directory.
fn default_export_dir() -> PathBuf {
    data_dir().join("exports")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults_match_sheet_layout() {
        let storage = StorageConfig::default();
        assert_eq!(storage.sheet_name, "Data");
        assert_eq!(storage.image_column, 8);
    }

    #[test]
    fn test_validate_rejects_missing_endpoint() {
        let storage = StorageConfig {
            folder_id: "folder".into(),
            ..StorageConfig::default()
        };
        assert!(matches!(
            storage.validate(),
            Err(BirthcardError::Config { .. })
        ));

        let storage = StorageConfig {
            endpoint: "https://script.example/exec".into(),
            folder_id: "folder".into(),
            ..StorageConfig::default()
        };
        assert!(storage.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{
            "storage": { "endpoint": "https://script.example/exec", "folder_id": "abc" },
            "templates": { "boy": "/t/boy.png", "girl": "/t/girl.png" },
            "export_dir": "/tmp/out",
            "logging": { "level": "debug", "json": false, "file": null }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.storage.sheet_name, "Data");
        assert_eq!(config.storage.image_column, 8);
        assert!(config.fonts.cast.is_none());
        assert_eq!(config.templates.girl, PathBuf::from("/t/girl.png"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("birthcard_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.storage.endpoint = "https://script.example/exec".into();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.storage.endpoint, "https://script.example/exec");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("birthcard_missing_config.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(BirthcardError::FileNotFound { .. })
        ));
    }
}
