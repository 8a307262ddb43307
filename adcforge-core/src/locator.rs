//! Application Default Credentials discovery.
//!
//! [`DefaultCredentialsResolver`] walks the credential sources in fixed
//! precedence order and stops at the first one that applies:
//!
//! 1. the file named by the explicit credentials variable
//!    (`GOOGLE_APPLICATION_CREDENTIALS`); a broken explicit path is a hard
//!    error and never falls through;
//! 2. the well-known per-user ADC file, skipped when missing;
//! 3. the ambient compute environment, detected through the metadata server
//!    or forced by the probe override variable.
//!
//! When nothing applies the resolver fails with
//! [`AdcError::NoCredentialsFound`], listing everything it looked at.
//!
//! # Example
//!
//! ```
//! use adcforge_core::{
//!     AdcConfig, Credentials, DefaultCredentialsResolver, MemoryFileOpener, StaticEnvironment,
//! };
//!
//! let env = StaticEnvironment::new()
//!     .with_var("GOOGLE_GCLOUD_ADC_PATH_OVERRIDE", "")
//!     .with_var("GOOGLE_RUNNING_ON_GCE_CHECK_OVERRIDE", "1");
//! let resolver = DefaultCredentialsResolver::with_parts(
//!     AdcConfig::default(),
//!     env,
//!     MemoryFileOpener::new(),
//!     |_: &str| false,
//! );
//!
//! let creds = resolver.resolve().unwrap();
//! assert!(matches!(creds, Credentials::ComputeEngine(_)));
//! ```

use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{AdcConfig, WELL_KNOWN_RELATIVE_PATH};
use crate::credentials::{ComputeEngineCredentials, Credentials, ServiceAccountCredentials};
use crate::error::AdcError;
use crate::factory::CredentialFactory;
use crate::io::{
    Environment, FileOpener, OsFileOpener, ProcessEnvironment, read_credential_file,
};
use crate::model::{CredentialFile, ServiceAccountOptions, Source};
use crate::probe::{ComputeProbe, MetadataProbe, ProbeOverride};

/// The source a resolution settled on, before any credential is built.
#[derive(Debug, Clone)]
pub enum LocatedSource {
    /// A credentials file from the explicit or well-known path.
    File { source: Source, file: CredentialFile },

    /// A managed compute environment.
    AmbientCompute { metadata_root: String },
}

impl LocatedSource {
    pub fn source(&self) -> Source {
        match self {
            Self::File { source, .. } => *source,
            Self::AmbientCompute { .. } => Source::AmbientCompute,
        }
    }
}

/// Resolves Application Default Credentials.
///
/// The environment, filesystem and compute probe are injected; the default
/// type parameters are the production implementations.
pub struct DefaultCredentialsResolver<
    E = ProcessEnvironment,
    F = OsFileOpener,
    P = MetadataProbe,
> {
    config: AdcConfig,
    factory: CredentialFactory,
    env: E,
    files: F,
    probe: P,
}

impl DefaultCredentialsResolver {
    /// Resolver over the real process environment and filesystem.
    pub fn new() -> Self {
        Self::from_config(AdcConfig::default())
    }

    /// Resolver over the real process environment with custom configuration.
    pub fn from_config(config: AdcConfig) -> Self {
        let probe = MetadataProbe::new(config.probe_timeout());
        Self::with_parts(config, ProcessEnvironment, OsFileOpener, probe)
    }
}

impl Default for DefaultCredentialsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, F, P> DefaultCredentialsResolver<E, F, P>
where
    E: Environment,
    F: FileOpener,
    P: ComputeProbe,
{
    /// Resolver over explicit environment, filesystem and probe.
    pub fn with_parts(config: AdcConfig, env: E, files: F, probe: P) -> Self {
        let factory = CredentialFactory::from_config(&config);
        Self {
            config,
            factory,
            env,
            files,
            probe,
        }
    }

    pub fn config(&self) -> &AdcConfig {
        &self.config
    }

    pub fn factory(&self) -> &CredentialFactory {
        &self.factory
    }

    /// Run the ADC flow with default service account options.
    pub fn resolve(&self) -> Result<Credentials, AdcError> {
        self.resolve_with(&ServiceAccountOptions::default())
    }

    /// Run the ADC flow. `options` only apply if a service account file wins.
    pub fn resolve_with(&self, options: &ServiceAccountOptions) -> Result<Credentials, AdcError> {
        match self.locate()? {
            LocatedSource::File { source, file } => {
                info!("using {} from {}", source, file.path.display());
                self.factory.from_file(&file, options)
            }
            LocatedSource::AmbientCompute { metadata_root } => {
                info!("using compute engine credentials from {}", metadata_root);
                Ok(self.factory.compute_engine(&metadata_root))
            }
        }
    }

    /// Find the winning source without building credentials.
    pub fn locate(&self) -> Result<LocatedSource, AdcError> {
        if let Some(file) = self.explicit_file()? {
            return Ok(LocatedSource::File {
                source: Source::ExplicitPathEnvVar,
                file,
            });
        }

        if let Some(file) = self.well_known_file()? {
            return Ok(LocatedSource::File {
                source: Source::WellKnownUserPath,
                file,
            });
        }

        if self.ambient_present() {
            return Ok(LocatedSource::AmbientCompute {
                metadata_root: self.metadata_root(),
            });
        }

        Err(AdcError::NoCredentialsFound {
            consulted: self.consulted(),
        })
    }

    /// Load a service account from the explicit or well-known path.
    ///
    /// The ambient probe is never consulted. Files of any other kind are
    /// rejected with [`AdcError::UnsupportedCredentialType`].
    pub fn service_account_from_default_paths(
        &self,
        options: &ServiceAccountOptions,
    ) -> Result<ServiceAccountCredentials, AdcError> {
        let file = match self.explicit_file()? {
            Some(file) => file,
            None => match self.well_known_file()? {
                Some(file) => file,
                None => {
                    let mut consulted = self.consulted();
                    consulted.truncate(2);
                    return Err(AdcError::NoCredentialsFound { consulted });
                }
            },
        };

        self.factory.service_account_from_file(&file, options)
    }

    /// Path named by the explicit credentials variable.
    ///
    /// A set but empty variable counts as unset.
    pub fn explicit_path(&self) -> Option<PathBuf> {
        self.env
            .var(&self.config.credentials_env_var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Path of the well-known user ADC file, if one applies.
    ///
    /// A set but empty override variable disables the well-known path.
    pub fn well_known_path(&self) -> Option<PathBuf> {
        if let Some(value) = self.env.var(&self.config.well_known_override_env_var) {
            if value.is_empty() {
                return None;
            }
            return Some(PathBuf::from(value));
        }

        let home = self.env.var(&self.config.home_env_var)?;
        if home.is_empty() {
            return None;
        }

        let mut path = PathBuf::from(home);
        if !cfg!(windows) {
            path.push(".config");
        }
        for part in WELL_KNOWN_RELATIVE_PATH {
            path.push(part);
        }
        Some(path)
    }

    /// Current state of the probe override variable.
    pub fn probe_override(&self) -> ProbeOverride {
        let value = self.env.var(&self.config.probe_override_env_var);
        ProbeOverride::from_value(value.as_deref())
    }

    /// Whether the ambient compute environment is present, honoring the
    /// override before running the live probe.
    pub fn ambient_present(&self) -> bool {
        match self.probe_override().forced() {
            Some(present) => {
                debug!(
                    "{} forces compute environment present={}",
                    self.config.probe_override_env_var, present
                );
                present
            }
            None => {
                let root = self.metadata_root();
                debug!("probing metadata server at {}", root);
                self.probe.is_present(&root)
            }
        }
    }

    /// Metadata server root, honoring the host override variable.
    pub fn metadata_root(&self) -> String {
        match self.env.var(&self.config.metadata_host_env_var) {
            Some(host) if !host.is_empty() => format!("http://{}", host),
            _ => self.config.metadata_root.clone(),
        }
    }

    /// Compute Engine credentials for `service_account_email` (or the
    /// `"default"` identity) against [`metadata_root`](Self::metadata_root).
    ///
    /// Never probes; the caller asserts the environment is present.
    pub fn compute_engine(&self, service_account_email: Option<&str>) -> Credentials {
        let mut creds = ComputeEngineCredentials::new().with_metadata_root(self.metadata_root());
        if let Some(email) = service_account_email {
            creds = creds.with_service_account_email(email);
        }
        Credentials::ComputeEngine(creds)
    }

    /// Describe every mechanism consulted, in precedence order.
    ///
    /// Reads variables only; never touches files or the network.
    pub fn consulted(&self) -> Vec<String> {
        let explicit = match self.env.var(&self.config.credentials_env_var) {
            Some(value) if value.is_empty() => {
                format!("{} (set to an empty value)", self.config.credentials_env_var)
            }
            Some(value) => format!("{}={}", self.config.credentials_env_var, value),
            None => format!("{} (unset)", self.config.credentials_env_var),
        };

        let well_known = match self.well_known_path() {
            Some(path) => path.display().to_string(),
            None if self.env.var(&self.config.well_known_override_env_var).is_some() => format!(
                "{} (set to an empty value)",
                self.config.well_known_override_env_var
            ),
            None => format!(
                "well-known credentials file ({} unset)",
                self.config.home_env_var
            ),
        };

        let ambient = match self.env.var(&self.config.probe_override_env_var) {
            Some(value) => format!(
                "compute metadata server ({}={})",
                self.config.probe_override_env_var, value
            ),
            None => format!("compute metadata server at {}", self.metadata_root()),
        };

        vec![explicit, well_known, ambient]
    }

    fn explicit_file(&self) -> Result<Option<CredentialFile>, AdcError> {
        let Some(path) = self.explicit_path() else {
            debug!("{} is not set", self.config.credentials_env_var);
            return Ok(None);
        };

        debug!(
            "{} points at {}",
            self.config.credentials_env_var,
            path.display()
        );
        read_credential_file(&self.files, &path).map(Some)
    }

    fn well_known_file(&self) -> Result<Option<CredentialFile>, AdcError> {
        let Some(path) = self.well_known_path() else {
            debug!("no well-known credentials path applies");
            return Ok(None);
        };

        match self.files.read(&path) {
            Ok(bytes) => Ok(Some(CredentialFile::new(path, bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("well-known credentials file {} not found", path.display());
                Ok(None)
            }
            Err(source) => Err(AdcError::CannotOpenFile { path, source }),
        }
    }
}
