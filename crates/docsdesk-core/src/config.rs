use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result, anyhow};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REFERENCE_BASE_URL: &str = "https://api.freshservice.com/";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub reference_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

/// Values coming from the environment or the command line. `None` keeps
/// whatever the file (or the default) said.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub reference_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            reference_base_url: DEFAULT_REFERENCE_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.backend_url {
            self.backend_url = url;
        }
        if let Some(url) = overrides.reference_base_url {
            self.reference_base_url = url;
        }
        if overrides.request_timeout_secs.is_some() {
            self.request_timeout_secs = overrides.request_timeout_secs;
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Deep link into the external documentation for a reference anchor.
    /// The anchor is not validated.
    pub fn reference_url(&self, anchor: &str) -> String {
        format!("{}#{}", self.reference_base_url, anchor)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("docsdesk").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            backend_url: "http://qa.local:9000".to_string(),
            reference_base_url: "https://docs.example.com/".to_string(),
            request_timeout_secs: Some(30),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"backend_url": "http://10.0.0.5:8000"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.5:8000");
        assert_eq!(config.reference_base_url, DEFAULT_REFERENCE_BASE_URL);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let config = Config::new().with_overrides(ConfigOverrides {
            backend_url: Some("http://override:1234".to_string()),
            reference_base_url: None,
            request_timeout_secs: Some(5),
        });
        assert_eq!(config.backend_url, "http://override:1234");
        assert_eq!(config.reference_base_url, DEFAULT_REFERENCE_BASE_URL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_reference_url() {
        let config = Config::new();
        assert_eq!(config.reference_url("abc"), "https://api.freshservice.com/#abc");
    }
}
