//! Application configuration layered from defaults, a TOML file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

use crate::error::ModelError;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "permap";
/// Years 0 through 10.
pub const DEFAULT_NUM_YEARS: usize = 11;
/// Tracing filter used when neither `RUST_LOG` nor the file sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Prefix for environment overrides, e.g. `PERMAP_NUM_YEARS=8`.
pub const ENV_PREFIX: &str = "PERMAP";

const DEFAULT_CONFIG: &str = r#"# Perceptual map predictor configuration.

# Number of simulated years, starting at year 0.
num_years = 11

# Scenario JSON describing segments and products. The built-in scenario is
# used when this is left unset.
# scenario_path = "/path/to/scenario.json"

# Default tracing filter when RUST_LOG is not set.
log_filter = "info"
"#;

/// Runtime settings for the simulation driver.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Length of every per-year series.
    pub num_years: usize,
    /// Optional scenario file; `None` selects the built-in scenario.
    #[serde(default)]
    pub scenario_path: Option<PathBuf>,
    /// Tracing filter used when `RUST_LOG` is absent.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            num_years: DEFAULT_NUM_YEARS,
            scenario_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default location, layering environment overrides on top.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path`. A missing file falls back to defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .set_default("num_years", DEFAULT_NUM_YEARS as i64)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the model cannot run with.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.num_years == 0 {
            return Err(ModelError::Configuration(
                "num_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Path of the user's configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Same as [`ensure_default_config`] for an explicit path.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/config.toml");

        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.num_years, DEFAULT_NUM_YEARS);
        assert_eq!(config.log_filter, "info");
        assert!(config.scenario_path.is_none());
        Ok(())
    }

    #[test]
    fn existing_file_is_not_overwritten() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "num_years = 6\nscenario_path = \"custom.json\"\n")?;

        ensure_default_config_at(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.num_years, 6);
        assert_eq!(config.scenario_path, Some(PathBuf::from("custom.json")));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        Ok(())
    }

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.num_years, DEFAULT_NUM_YEARS);
        Ok(())
    }

    #[test]
    fn loading_before_the_default_file_exists_matches_it() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("permap/config.toml");

        let before = AppConfig::load_from(&path)?;
        ensure_default_config_at(&path)?;
        let after = AppConfig::load_from(&path)?;

        assert_eq!(before.num_years, after.num_years);
        assert_eq!(before.log_filter, after.log_filter);
        assert_eq!(before.scenario_path, after.scenario_path);
        Ok(())
    }

    #[test]
    fn zero_years_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "num_years = 0\n")?;
        assert!(AppConfig::load_from(&path).is_err());
        Ok(())
    }
}
