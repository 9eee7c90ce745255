//! Application configuration.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Directory name under the platform config root.
pub const CONFIG_DIR: &str = "requi";

const DEFAULT_CATALOG_PATH: &str = "items.csv";
const DEFAULT_METADATA_PATH: &str = "metadata.json";

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Requisition Planner configuration.
#
# catalog_path: CSV catalog with columns Name, Category, Points, Description.
# metadata_path: JSON file holding the username and personal items.

catalog_path = "items.csv"
metadata_path = "metadata.json"
"#;

/// Settings controlling where the planner reads and writes its flat files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Path to the CSV catalog.
    pub catalog_path: PathBuf,
    /// Path to the metadata JSON file.
    pub metadata_path: PathBuf,
}

impl AppConfig {
    /// Load configuration from the default config file, falling back to
    /// built-in defaults for any missing key.
    pub fn load() -> Result<Self> {
        Self::load_from(config_file_path())
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = config::Config::builder()
            .set_default("catalog_path", DEFAULT_CATALOG_PATH)?
            .set_default("metadata_path", DEFAULT_METADATA_PATH)?
            .add_source(config::File::from(path.clone()).required(false))
            .build()
            .with_context(|| format!("failed to load config {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

/// Location of the config file under the platform config directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = config_file_path();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("nope.toml"))?;
        assert_eq!(config.catalog_path, PathBuf::from("items.csv"));
        assert_eq!(config.metadata_path, PathBuf::from("metadata.json"));
        Ok(())
    }

    #[test]
    fn file_overrides_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "catalog_path = \"data/armoury.csv\"\n")?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.catalog_path, PathBuf::from("data/armoury.csv"));
        assert_eq!(config.metadata_path, PathBuf::from("metadata.json"));
        Ok(())
    }

    #[test]
    fn default_template_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.metadata_path, PathBuf::from("metadata.json"));
        Ok(())
    }
}
