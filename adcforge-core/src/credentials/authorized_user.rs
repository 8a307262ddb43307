//! End-user credentials backed by an OAuth2 refresh token.

use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl};
use tracing::debug;

use crate::config::DEFAULT_TOKEN_URI;
use crate::secret::Secret;
use crate::token::{AccessToken, CredentialProvider, TokenError};

/// Authorization endpoint for Google user consent.
///
/// The refresh grant never visits it, but the OAuth2 client requires one.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Credentials for an end user's OAuth grant, as written by
/// `gcloud auth application-default login`.
#[derive(Debug, Clone)]
pub struct AuthorizedUserCredentials {
    client_id: String,
    client_secret: Secret,
    refresh_token: Secret,
    token_uri: String,
    quota_project_id: Option<String>,
}

impl AuthorizedUserCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Secret,
        refresh_token: Secret,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            refresh_token,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            quota_project_id: None,
        }
    }

    /// Set the token endpoint used for the refresh grant.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// Set the project billed for quota.
    pub fn with_quota_project_id(mut self, project: impl Into<String>) -> Self {
        self.quota_project_id = Some(project.into());
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    pub fn quota_project_id(&self) -> Option<&str> {
        self.quota_project_id.as_deref()
    }

    fn oauth_client(&self) -> Result<BasicClient, TokenError> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URI.to_string()).map_err(|e| {
            TokenError::InvalidEndpoint {
                url: GOOGLE_AUTH_URI.to_string(),
                message: e.to_string(),
            }
        })?;

        let token_url =
            TokenUrl::new(self.token_uri.clone()).map_err(|e| TokenError::InvalidEndpoint {
                url: self.token_uri.clone(),
                message: e.to_string(),
            })?;

        Ok(BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.expose().to_string())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody))
    }
}

impl CredentialProvider for AuthorizedUserCredentials {
    fn access_token(&self) -> Result<Option<AccessToken>, TokenError> {
        debug!(
            "refreshing authorized user token for client {} at {}",
            self.client_id, self.token_uri
        );

        let response = self
            .oauth_client()?
            .exchange_refresh_token(&RefreshToken::new(
                self.refresh_token.expose().to_string(),
            ))
            .request(http_client)
            .map_err(|e| TokenError::OAuthError {
                message: format!("token refresh failed: {}", e),
            })?;

        let mut token = AccessToken::bearer(response.access_token().secret().to_string());
        if let Some(duration) = response.expires_in() {
            let expires_at = chrono::Utc::now()
                + chrono::Duration::from_std(duration).map_err(|e| TokenError::OAuthError {
                    message: format!("invalid expiration duration: {}", e),
                })?;
            token = token.with_expiry(expires_at);
        }

        Ok(Some(token))
    }
}
