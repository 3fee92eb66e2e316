//! Application configuration
//!
//! Settings are read from an optional JSON file. Every field has a default,
//! so a partial file only overrides what it names.

use crate::utils::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Encoding settings passed to every recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodingConfig {
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub audio_bits_per_second: u32,
    pub video_bits_per_second: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            mime_type: "video/webm".to_string(),
            audio_bits_per_second: 128_000,
            video_bits_per_second: 2_500_000,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub encoding: EncodingConfig,

    /// Recording timer period in milliseconds
    pub tick_interval_ms: u64,

    /// File name (without extension) used for downloads
    pub download_file_stem: String,

    /// Capacity of the session event channel
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            encoding: EncodingConfig::default(),
            tick_interval_ms: 1000,
            download_file_stem: "recorded-video".to_string(),
            event_capacity: 100,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;

        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(AppError::Config("tickIntervalMs must be positive".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(AppError::Config("eventCapacity must be positive".to_string()));
        }
        if self.download_file_stem.trim().is_empty() {
            return Err(AppError::Config("downloadFileStem must not be empty".to_string()));
        }
        if self.encoding.mime_type.trim().is_empty() {
            return Err(AppError::Config("mimeType must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "encoding": { "mimeType": "video/mp4" } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.encoding.mime_type, "video/mp4");
        assert_eq!(config.encoding.width, 1280);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.download_file_stem, "recorded-video");
    }

    #[test]
    fn test_rejects_zero_interval() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "tickIntervalMs": 0 }"#).unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let config = AppConfig::load_or_default(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }
}
