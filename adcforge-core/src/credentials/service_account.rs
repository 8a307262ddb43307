//! Service account credentials authenticated by a signed JWT assertion.
//!
//! The private key is only parsed when a token is requested; constructing
//! the credentials never touches the key material or the network.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use tracing::debug;

use crate::config::{CLOUD_PLATFORM_SCOPE, DEFAULT_TOKEN_URI};
use crate::secret::Secret;
use crate::token::{AccessToken, CredentialProvider, TokenError, read_token_response};

/// Grant type of the JWT bearer token exchange (RFC 7523).
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion, in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
}

/// Credentials for a non-human principal holding a private key.
#[derive(Debug, Clone)]
pub struct ServiceAccountCredentials {
    client_email: String,
    private_key: Secret,
    private_key_id: Option<String>,
    project_id: Option<String>,
    token_uri: String,
    auth_uri: Option<String>,
    scopes: Vec<String>,
    subject: Option<String>,
}

impl ServiceAccountCredentials {
    /// Create credentials with the default token endpoint and the
    /// cloud-platform scope.
    pub fn new(client_email: impl Into<String>, private_key: Secret) -> Self {
        Self {
            client_email: client_email.into(),
            private_key,
            private_key_id: None,
            project_id: None,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            auth_uri: None,
            scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
            subject: None,
        }
    }

    pub fn with_private_key_id(mut self, id: impl Into<String>) -> Self {
        self.private_key_id = Some(id.into());
        self
    }

    pub fn with_project_id(mut self, project: impl Into<String>) -> Self {
        self.project_id = Some(project.into());
        self
    }

    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// Authorization endpoint recorded in the credentials file.
    pub fn with_auth_uri(mut self, auth_uri: impl Into<String>) -> Self {
        self.auth_uri = Some(auth_uri.into());
        self
    }

    /// Replace the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Impersonate `subject` through domain-wide delegation.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn private_key_id(&self) -> Option<&str> {
        self.private_key_id.as_deref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    pub fn auth_uri(&self) -> Option<&str> {
        self.auth_uri.as_deref()
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Build and sign the RS256 assertion sent to the token endpoint.
    pub fn signed_assertion(&self) -> Result<String, TokenError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.expose().as_bytes())?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: self.scopes.join(" "),
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
            sub: self.subject.as_deref(),
        };

        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }
}

impl CredentialProvider for ServiceAccountCredentials {
    fn access_token(&self) -> Result<Option<AccessToken>, TokenError> {
        let assertion = self.signed_assertion()?;

        debug!(
            "exchanging assertion for {} at {}",
            self.client_email, self.token_uri
        );

        let response = reqwest::blocking::Client::new()
            .post(self.token_uri.as_str())
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()?;

        read_token_response(&self.token_uri, response).map(Some)
    }
}
