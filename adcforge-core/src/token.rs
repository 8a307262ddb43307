//! Access tokens produced by constructed credentials.
//!
//! This module provides:
//! - [`AccessToken`] - A bearer token with optional expiry
//! - [`TokenError`] - Failures while obtaining a token
//! - [`CredentialProvider`] - The "produce an authorization header" capability

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::secret::Secret;

/// Error type for token acquisition.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Transport failure talking to a token endpoint.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("token endpoint {endpoint} returned {status}: {body}")]
    Endpoint {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The OAuth2 refresh exchange failed.
    #[error("OAuth flow failed: {message}")]
    OAuthError { message: String },

    /// The service account assertion could not be signed.
    #[error("failed to sign assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// A configured endpoint is not a valid URL.
    #[error("invalid endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },
}

/// An OAuth2 access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token value.
    pub token: Secret,

    /// Token type (usually "Bearer").
    pub token_type: String,

    /// When the token expires (if known).
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token),
            token_type: token_type.into(),
            expires_at: None,
        }
    }

    /// Create a Bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(token, "Bearer")
    }

    /// Set the expiration time.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the expiration relative to now.
    pub fn expiring_in(self, seconds: i64) -> Self {
        self.with_expiry(Utc::now() + chrono::Duration::seconds(seconds))
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| exp < Utc::now())
            .unwrap_or(false)
    }

    /// Get the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.token.expose())
    }
}

/// Token endpoint response body shared by the metadata server and the
/// JWT bearer grant.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: Secret,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for AccessToken {
    fn from(response: TokenResponse) -> Self {
        let TokenResponse {
            access_token,
            token_type,
            expires_in,
        } = response;
        let token = AccessToken {
            token: access_token,
            token_type,
            expires_at: None,
        };
        match expires_in {
            Some(seconds) => token.expiring_in(seconds),
            None => token,
        }
    }
}

/// Turn a blocking HTTP response from a token endpoint into a token.
pub(crate) fn read_token_response(
    endpoint: &str,
    response: reqwest::blocking::Response,
) -> Result<AccessToken, TokenError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(TokenError::Endpoint {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let parsed: TokenResponse = response.json()?;
    debug!("received {} token from {}", parsed.token_type, endpoint);
    Ok(parsed.into())
}

/// Capability shared by every credential: produce an `Authorization` header.
///
/// Each call obtains a fresh token; nothing is cached.
pub trait CredentialProvider: Send + Sync {
    /// Obtain an access token, or `None` for credentials that send no header.
    fn access_token(&self) -> Result<Option<AccessToken>, TokenError>;

    /// The `Authorization` header value, or `None` when no header is sent.
    fn authorization_header(&self) -> Result<Option<String>, TokenError> {
        Ok(self
            .access_token()?
            .map(|token| token.authorization_header()))
    }
}
