//! CLI configuration handling.

use adcforge_core::AdcConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Logging level used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Resolution settings.
    pub adc: AdcConfig,

    /// Path to the configuration file that was loaded, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            adc: AdcConfig::default(),
            config_path: None,
        }
    }
}

/// Load configuration from `explicit`, or from the default location.
///
/// An explicit path must exist. A missing file at the default location
/// means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<CliConfig> {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.exists()),
    };

    let mut config = match &config_path {
        Some(path) => read_config(path)?,
        None => CliConfig::default(),
    };
    config.config_path = config_path;

    config
        .adc
        .validate()
        .context("Invalid [adc] configuration")?;

    Ok(config)
}

fn read_config(path: &Path) -> Result<CliConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse config from {:?}", path))
}

/// `<config dir>/adcforge/config.toml` for the current user.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "raibid-labs", "adcforge")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
log_level = "debug"

[adc]
probe_timeout_ms = 250
metadata_root = "http://127.0.0.1:8080"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.adc.probe_timeout_ms, 250);
        assert_eq!(config.adc.metadata_root, "http://127.0.0.1:8080");
        assert_eq!(config.adc.credentials_env_var, "GOOGLE_APPLICATION_CREDENTIALS");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_config(Some(&temp_dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[adc]\nprobe_timeout_ms = 0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Invalid [adc] configuration"));
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "log_level = [").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
