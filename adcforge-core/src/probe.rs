//! Detection of a managed compute environment.
//!
//! The live check asks the metadata server for its root document and looks
//! for the `Metadata-Flavor: Google` response header. An override variable
//! short-circuits the check so the ambient branch is deterministic in tests.

use std::time::Duration;
use tracing::{debug, warn};

/// Header the metadata server requires on requests and echoes on responses.
pub const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";

/// Value of [`METADATA_FLAVOR_HEADER`].
pub const METADATA_FLAVOR_VALUE: &str = "Google";

/// Decides whether an ambient compute environment is present.
///
/// Closures `Fn(&str) -> bool` implement this trait, which is how tests
/// substitute the network check.
pub trait ComputeProbe: Send + Sync {
    /// Whether the metadata server at `metadata_root` is reachable.
    fn is_present(&self, metadata_root: &str) -> bool;
}

impl<F> ComputeProbe for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_present(&self, metadata_root: &str) -> bool {
        self(metadata_root)
    }
}

/// State of the probe override variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOverride {
    /// Variable unset: run the live probe.
    Unset,

    /// `"1"`: treat the environment as present.
    ForcePresent,

    /// `"0"`: treat the environment as absent.
    ForceAbsent,
}

impl ProbeOverride {
    /// Interpret the raw variable value.
    ///
    /// Only `"1"` forces presence. Any other set value, including the empty
    /// string, forces absence.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            None => Self::Unset,
            Some("1") => Self::ForcePresent,
            Some("0") => Self::ForceAbsent,
            Some(other) => {
                warn!(
                    "unexpected probe override value {:?}, treating compute environment as absent",
                    other
                );
                Self::ForceAbsent
            }
        }
    }

    /// The forced answer, if any.
    pub fn forced(&self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::ForcePresent => Some(true),
            Self::ForceAbsent => Some(false),
        }
    }
}

/// Live probe against the metadata server.
#[derive(Debug, Clone)]
pub struct MetadataProbe {
    timeout: Duration,
}

impl MetadataProbe {
    /// Create a probe bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query the metadata root and report whether it identified itself.
    pub fn check(&self, metadata_root: &str) -> Result<bool, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .build()?;

        let url = format!("{}/", metadata_root.trim_end_matches('/'));
        let response = client
            .get(url.as_str())
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)
            .send()?;

        let flavor = response
            .headers()
            .get(METADATA_FLAVOR_HEADER)
            .and_then(|v| v.to_str().ok());

        debug!(
            "metadata probe {} answered {} with flavor {:?}",
            url,
            response.status(),
            flavor
        );
        Ok(flavor == Some(METADATA_FLAVOR_VALUE))
    }
}

impl Default for MetadataProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl ComputeProbe for MetadataProbe {
    fn is_present(&self, metadata_root: &str) -> bool {
        match self.check(metadata_root) {
            Ok(present) => present,
            Err(e) => {
                debug!("metadata probe of {} failed: {}", metadata_root, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_three_states() {
        assert_eq!(ProbeOverride::from_value(None), ProbeOverride::Unset);
        assert_eq!(ProbeOverride::from_value(Some("1")), ProbeOverride::ForcePresent);
        assert_eq!(ProbeOverride::from_value(Some("0")), ProbeOverride::ForceAbsent);

        assert_eq!(ProbeOverride::Unset.forced(), None);
        assert_eq!(ProbeOverride::ForcePresent.forced(), Some(true));
        assert_eq!(ProbeOverride::ForceAbsent.forced(), Some(false));
    }

    #[test]
    fn test_override_other_values_mean_absent() {
        assert_eq!(ProbeOverride::from_value(Some("")), ProbeOverride::ForceAbsent);
        assert_eq!(ProbeOverride::from_value(Some("yes")), ProbeOverride::ForceAbsent);
    }

    #[test]
    fn test_closure_probe() {
        let probe = |root: &str| root.ends_with("internal");
        assert!(probe.is_present("http://metadata.google.internal"));
        assert!(!probe.is_present("http://127.0.0.1:8080"));
    }
}
