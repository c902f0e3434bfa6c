//! Application Configuration
//!
//! User settings stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::OcrModel;

/// Address the detection service listens on by default
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8095";

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Detection service connection
    pub server: ServerSettings,
    /// Detection request defaults
    pub detection: DetectionSettings,
    /// Text extraction defaults
    pub ocr: OcrSettings,
    /// Annotated image export
    pub export: ExportSettings,
}

/// Detection service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL, endpoint paths are appended to it
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

/// Detection-related settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Prompt filled into the prompt bar on start-up
    pub default_prompt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Model preselected in the OCR panel
    pub model: OcrModel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Target directory, the app data directory when unset
    pub directory: Option<PathBuf>,
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.base_url, "http://127.0.0.1:8095");
        assert!(config.detection.default_prompt.is_empty());
        assert_eq!(config.ocr.model, OcrModel::Doctr);
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.server.base_url = "http://gpu-box:9000".to_string();
        config.detection.default_prompt = "cat, dog".to_string();
        config.ocr.model = OcrModel::Paddle;
        config.export.directory = Some(PathBuf::from("/tmp/exports"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("model = \"paddle\""));

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let parsed: AppConfig =
            toml::from_str("[detection]\ndefault_prompt = \"person\"\n").unwrap();
        assert_eq!(parsed.detection.default_prompt, "person");
        assert_eq!(parsed.server.base_url, DEFAULT_SERVER_URL);
        assert_eq!(parsed.ocr.model, OcrModel::Doctr);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.ocr.model = OcrModel::EasyOcr;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();

        let loaded = load_config(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_ocr_model_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[ocr]\nmodel = \"tesseract\"\n");
        assert!(result.is_err());
    }
}
