use crate::models::{Plan, DEFAULT_DURATION_MINS, DEFAULT_FREQUENCY_SECS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_frequency_secs: u32,
    pub default_duration_mins: u32,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_frequency_secs: DEFAULT_FREQUENCY_SECS,
            default_duration_mins: DEFAULT_DURATION_MINS,
            host: "127.0.0.1".to_string(),
            port: 8050,
        }
    }
}

/// `~/.jiggler`, created on first use.
pub fn base_dir() -> Result<PathBuf> {
    let mut path = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    path.push(".jiggler");
    if !path.exists() {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&base_dir()?.join("config.json"))
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let data = serde_json::to_string_pretty(&config)?;
        fs::write(path, data)?;
        return Ok(config);
    }

    let data = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&data)
        .with_context(|| format!("Could not parse {}", path.display()))?;
    Plan::new(config.default_frequency_secs, config.default_duration_mins)
        .with_context(|| format!("Invalid defaults in {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_creates_default() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");

        let config = load_config_from(&path)?;
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let written: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(written.default_frequency_secs, 27);
        assert_eq!(written.default_duration_mins, 60);
        Ok(())
    }

    #[test]
    fn test_load_config_partial_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "default_frequency_secs": 5, "port": 9000 }"#)?;

        let config = load_config_from(&path)?;
        assert_eq!(config.default_frequency_secs, 5);
        assert_eq!(config.default_duration_mins, 60);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        Ok(())
    }

    #[test]
    fn test_load_config_rejects_bad_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{ "default_frequency_secs": 90 }"#)?;
        assert!(load_config_from(&path).is_err());

        fs::write(&path, r#"{ "default_duration_mins": 45 }"#)?;
        assert!(load_config_from(&path).is_err());

        fs::write(&path, "not json")?;
        assert!(load_config_from(&path).is_err());
        Ok(())
    }
}
