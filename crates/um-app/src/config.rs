//! Application configuration
//!
//! Loaded from `unimap.json` in the working directory; every field has a
//! default so the file is optional.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use um_api::ClientConfig;

const CONFIG_FILE: &str = "unimap.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend connection settings.
    pub api: ClientConfig,
    /// Directory holding the per-floor map images (`floor_{n}.jpg`).
    pub assets_dir: PathBuf,
    /// Floor button labels; the index is the floor number.
    pub floor_labels: Vec<String>,
    /// Run against the built-in campus dataset instead of the backend.
    pub demo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ClientConfig::default(),
            assets_dir: PathBuf::from("assets"),
            floor_labels: vec![
                "Ground Floor".to_string(),
                "First Floor".to_string(),
                "Second Floor".to_string(),
            ],
            demo: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(err) => {
                    warn!(error = %err, "ignoring malformed unimap.json");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_files_fill_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api": {"base_url": "http://campus.example:8080"}}"#).unwrap();
        assert_eq!(config.api.base_url, "http://campus.example:8080");
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.floor_labels.len(), 3);
        assert!(!config.demo);
    }
}
