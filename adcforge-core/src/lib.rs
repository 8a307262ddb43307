//! # adcforge Core
//!
//! Application Default Credentials (ADC) discovery and credential construction.
//!
//! This crate provides:
//! - A source locator that picks one credential source in fixed precedence order
//! - A credential factory that classifies untrusted credential files
//! - Credential objects able to fetch access tokens on demand
//! - Injectable environment, filesystem and compute probe seams for testing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adcforge_core::{CredentialProvider, Credentials, default_credentials};
//!
//! fn header() -> Result<Option<String>, Box<dyn std::error::Error>> {
//!     let creds = default_credentials()?;
//!     if let Credentials::ComputeEngine(c) = &creds {
//!         println!("running as {}", c.service_account_email());
//!     }
//!     Ok(creds.authorization_header()?)
//! }
//! ```

use std::path::Path;

pub mod config;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod io;
pub mod locator;
pub mod model;
pub mod probe;
pub mod secret;
pub mod token;

// Re-export commonly used types at crate root
pub use config::{AdcConfig, ConfigError};

pub use credentials::{
    AnonymousCredentials,
    AuthorizedUserCredentials,
    ComputeEngineCredentials,
    Credentials,
    ServiceAccountCredentials,
};

pub use error::{AdcError, ErrorCode};

pub use factory::CredentialFactory;

pub use io::{
    Environment,
    FileOpener,
    MemoryFileOpener,
    OsFileOpener,
    ProcessEnvironment,
    StaticEnvironment,
};

pub use locator::{DefaultCredentialsResolver, LocatedSource};

pub use model::{CredentialFile, CredentialKind, Origin, ServiceAccountOptions, Source};

pub use probe::{ComputeProbe, MetadataProbe, ProbeOverride};

pub use secret::Secret;

pub use token::{AccessToken, CredentialProvider, TokenError};

/// Resolve Application Default Credentials from the process environment.
pub fn default_credentials() -> Result<Credentials, AdcError> {
    DefaultCredentialsResolver::new().resolve()
}

/// Load a service account from the explicit or well-known path of the
/// process environment. The compute environment is never probed.
pub fn service_account_from_default_paths(
    options: &ServiceAccountOptions,
) -> Result<ServiceAccountCredentials, AdcError> {
    DefaultCredentialsResolver::new().service_account_from_default_paths(options)
}

/// Load a service account from `path`, rejecting every other kind.
pub fn service_account_from_path(
    path: impl AsRef<Path>,
    options: &ServiceAccountOptions,
) -> Result<ServiceAccountCredentials, AdcError> {
    let file = io::read_credential_file(&OsFileOpener, path.as_ref())?;
    CredentialFactory::default().service_account_from_file(&file, options)
}

/// Build a service account from in-memory JSON, rejecting every other kind.
pub fn service_account_from_contents(
    contents: &[u8],
    options: &ServiceAccountOptions,
) -> Result<ServiceAccountCredentials, AdcError> {
    CredentialFactory::default().service_account_from_contents(contents, &Origin::Contents, options)
}

/// Load authorized user credentials from `path`, rejecting every other kind.
pub fn authorized_user_from_path(
    path: impl AsRef<Path>,
) -> Result<AuthorizedUserCredentials, AdcError> {
    let file = io::read_credential_file(&OsFileOpener, path.as_ref())?;
    CredentialFactory::default().authorized_user_from_file(&file)
}

/// Build authorized user credentials from in-memory JSON.
pub fn authorized_user_from_contents(contents: &[u8]) -> Result<AuthorizedUserCredentials, AdcError> {
    CredentialFactory::default().authorized_user_from_contents(contents, &Origin::Contents)
}

/// Compute Engine credentials for `service_account_email`, or the
/// `"default"` identity, against the metadata server named by the process
/// environment (`GCE_METADATA_HOST`, else the default root).
pub fn compute_engine_credentials(service_account_email: Option<&str>) -> Credentials {
    DefaultCredentialsResolver::new().compute_engine(service_account_email)
}

pub fn anonymous_credentials() -> Credentials {
    Credentials::anonymous()
}
