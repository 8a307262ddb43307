//! Resolver configuration.
//!
//! Environment variable names, the metadata server root, the probe timeout
//! and the default service account scopes are all configuration. Every field
//! has a default, so a partial TOML table deserializes cleanly.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default scope for service accounts constructed without explicit scopes.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Default metadata server root.
pub const DEFAULT_METADATA_ROOT: &str = "http://metadata.google.internal";

/// Path of the ADC file below the per-user configuration directory.
pub const WELL_KNOWN_RELATIVE_PATH: [&str; 2] = ["gcloud", "application_default_credentials.json"];

/// Error type for invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid metadata root {value}: {source}")]
    InvalidMetadataRoot {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("environment variable name for {field} cannot be empty")]
    EmptyVariableName { field: &'static str },

    #[error("probe timeout must be greater than zero")]
    ZeroProbeTimeout,
}

/// Configuration for [`DefaultCredentialsResolver`](crate::DefaultCredentialsResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdcConfig {
    /// Variable holding an explicit credentials file path.
    pub credentials_env_var: String,

    /// Variable overriding the well-known user file path.
    pub well_known_override_env_var: String,

    /// Variable forcing the ambient probe result (`"1"` / `"0"`).
    pub probe_override_env_var: String,

    /// Variable naming the home (or per-user config) directory.
    pub home_env_var: String,

    /// Variable overriding the metadata server host (`host[:port]`).
    pub metadata_host_env_var: String,

    /// Metadata server root used when the host variable is unset.
    pub metadata_root: String,

    /// Upper bound for the live metadata probe, in milliseconds.
    pub probe_timeout_ms: u64,

    /// Scopes for service accounts constructed without explicit scopes.
    pub default_scopes: Vec<String>,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            credentials_env_var: "GOOGLE_APPLICATION_CREDENTIALS".to_string(),
            well_known_override_env_var: "GOOGLE_GCLOUD_ADC_PATH_OVERRIDE".to_string(),
            probe_override_env_var: "GOOGLE_RUNNING_ON_GCE_CHECK_OVERRIDE".to_string(),
            home_env_var: default_home_env_var().to_string(),
            metadata_host_env_var: "GCE_METADATA_HOST".to_string(),
            metadata_root: DEFAULT_METADATA_ROOT.to_string(),
            probe_timeout_ms: 1000,
            default_scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
        }
    }
}

impl AdcConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Check that the configuration can drive a resolver.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("credentials_env_var", &self.credentials_env_var),
            ("well_known_override_env_var", &self.well_known_override_env_var),
            ("probe_override_env_var", &self.probe_override_env_var),
            ("home_env_var", &self.home_env_var),
            ("metadata_host_env_var", &self.metadata_host_env_var),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyVariableName { field });
            }
        }

        Url::parse(&self.metadata_root).map_err(|source| ConfigError::InvalidMetadataRoot {
            value: self.metadata_root.clone(),
            source,
        })?;

        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::ZeroProbeTimeout);
        }

        Ok(())
    }
}

fn default_home_env_var() -> &'static str {
    if cfg!(windows) { "APPDATA" } else { "HOME" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AdcConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.credentials_env_var, "GOOGLE_APPLICATION_CREDENTIALS");
        assert_eq!(config.default_scopes, vec![CLOUD_PLATFORM_SCOPE]);
        assert_eq!(config.probe_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AdcConfig =
            serde_json::from_str(r#"{"credentials_env_var": "MY_CREDS", "probe_timeout_ms": 250}"#)
                .unwrap();
        assert_eq!(config.credentials_env_var, "MY_CREDS");
        assert_eq!(config.probe_timeout_ms, 250);
        assert_eq!(config.metadata_root, DEFAULT_METADATA_ROOT);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AdcConfig {
            metadata_root: "not a url".to_string(),
            ..AdcConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMetadataRoot { .. })
        ));

        let config = AdcConfig {
            probe_override_env_var: " ".to_string(),
            ..AdcConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyVariableName {
                field: "probe_override_env_var"
            })
        ));

        let config = AdcConfig {
            probe_timeout_ms: 0,
            ..AdcConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroProbeTimeout)));
    }
}
