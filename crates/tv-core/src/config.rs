use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Where the channel manifest comes from and where its local copy lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Remote manifest fetched on every refresh.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Directory holding `channels.json`, the copy of the last successful fetch.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Names the settings region, `<dir>/<app_name>.json`.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_settings_dir")]
    pub dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            dir: default_settings_dir(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080/channels.json".to_string()
}

fn default_storage_dir() -> PathBuf {
    platform::data_dir()
}

fn default_app_name() -> String {
    platform::APP_DIR_NAME.to_string()
}

fn default_settings_dir() -> PathBuf {
    platform::config_dir()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.catalog.server_url.ends_with("/channels.json"));
        assert!(config.catalog.storage_dir.ends_with("mytv"));
        assert_eq!(config.settings.app_name, "mytv");
        assert!(config.settings.dir.ends_with("mytv"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [catalog]
            server_url = "http://127.0.0.1:9000/channels.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog.server_url, "http://127.0.0.1:9000/channels.json");
        assert_eq!(config.catalog.storage_dir, default_storage_dir());
        assert_eq!(config.settings.app_name, "mytv");
    }
}
