//! Credentials served by the compute metadata server.

use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::DEFAULT_METADATA_ROOT;
use crate::probe::{METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE};
use crate::token::{AccessToken, CredentialProvider, TokenError, read_token_response};

/// Identity used when no service account email is given.
pub const DEFAULT_SERVICE_ACCOUNT: &str = "default";

/// Credentials of the service account attached to a compute instance.
#[derive(Debug, Clone)]
pub struct ComputeEngineCredentials {
    service_account_email: String,
    metadata_root: String,
    scopes: Option<Vec<String>>,
    timeout: Duration,
}

impl ComputeEngineCredentials {
    /// Credentials for the instance's default service account.
    pub fn new() -> Self {
        Self {
            service_account_email: DEFAULT_SERVICE_ACCOUNT.to_string(),
            metadata_root: DEFAULT_METADATA_ROOT.to_string(),
            scopes: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Credentials for a specific attached service account.
    pub fn for_service_account(email: impl Into<String>) -> Self {
        Self::new().with_service_account_email(email)
    }

    pub fn with_service_account_email(mut self, email: impl Into<String>) -> Self {
        self.service_account_email = email.into();
        self
    }

    /// Point at a different metadata server, e.g. an emulator.
    pub fn with_metadata_root(mut self, root: impl Into<String>) -> Self {
        self.metadata_root = root.into();
        self
    }

    /// Request a down-scoped token.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Upper bound for each token request. Defaults to ten seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured identity: an email, or `"default"`.
    pub fn service_account_email(&self) -> &str {
        &self.service_account_email
    }

    pub fn metadata_root(&self) -> &str {
        &self.metadata_root
    }

    /// Token endpoint for the configured identity. The email is a single
    /// percent-encoded path segment.
    fn token_url(&self) -> Result<Url, TokenError> {
        let invalid = |message: String| TokenError::InvalidEndpoint {
            url: self.metadata_root.clone(),
            message,
        };

        let mut url = Url::parse(&self.metadata_root).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("metadata root cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend([
                "computeMetadata",
                "v1",
                "instance",
                "service-accounts",
                self.service_account_email.as_str(),
                "token",
            ]);
        Ok(url)
    }
}

impl Default for ComputeEngineCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for ComputeEngineCredentials {
    fn access_token(&self) -> Result<Option<AccessToken>, TokenError> {
        let url = self.token_url()?;
        debug!("fetching metadata token from {}", url);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let mut request = client
            .get(url.as_str())
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE);
        if let Some(scopes) = &self.scopes {
            request = request.query(&[("scopes", scopes.join(","))]);
        }

        let response = request.send()?;
        read_token_response(url.as_str(), response).map(Some)
    }
}
