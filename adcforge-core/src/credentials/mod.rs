//! Constructed credential objects.
//!
//! This module provides:
//! - [`Credentials`] - The closed set of credential kinds a resolution can return
//! - [`AuthorizedUserCredentials`] - End-user OAuth grant
//! - [`ServiceAccountCredentials`] - Private-key principal
//! - [`ComputeEngineCredentials`] - Metadata server identity
//! - [`AnonymousCredentials`] - No authorization
//!
//! Callers pattern-match on [`Credentials`] to learn which kind they got;
//! all kinds implement [`CredentialProvider`].

mod anonymous;
mod authorized_user;
mod compute_engine;
mod service_account;

pub use anonymous::AnonymousCredentials;
pub use authorized_user::{AuthorizedUserCredentials, GOOGLE_AUTH_URI};
pub use compute_engine::{ComputeEngineCredentials, DEFAULT_SERVICE_ACCOUNT};
pub use service_account::{JWT_BEARER_GRANT_TYPE, ServiceAccountCredentials};

use crate::token::{AccessToken, CredentialProvider, TokenError};

/// A credential produced by resolution. Ownership belongs to the caller.
#[derive(Debug, Clone)]
pub enum Credentials {
    AuthorizedUser(AuthorizedUserCredentials),
    ServiceAccount(ServiceAccountCredentials),
    ComputeEngine(ComputeEngineCredentials),
    Anonymous(AnonymousCredentials),
}

impl Credentials {
    /// Credentials that send no authorization header.
    pub fn anonymous() -> Self {
        Self::Anonymous(AnonymousCredentials)
    }

    /// Metadata server credentials; `None` selects the `"default"` identity.
    pub fn compute_engine(service_account_email: Option<&str>) -> Self {
        let creds = match service_account_email {
            Some(email) => ComputeEngineCredentials::for_service_account(email),
            None => ComputeEngineCredentials::new(),
        };
        Self::ComputeEngine(creds)
    }

    /// Short name of the kind, matching the file `type` where one exists.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::AuthorizedUser(_) => "authorized_user",
            Self::ServiceAccount(_) => "service_account",
            Self::ComputeEngine(_) => "compute_engine",
            Self::Anonymous(_) => "anonymous",
        }
    }

    /// The principal these credentials act as, when it is known locally.
    pub fn principal(&self) -> Option<&str> {
        match self {
            Self::AuthorizedUser(c) => Some(c.client_id()),
            Self::ServiceAccount(c) => Some(c.client_email()),
            Self::ComputeEngine(c) => Some(c.service_account_email()),
            Self::Anonymous(_) => None,
        }
    }
}

impl CredentialProvider for Credentials {
    fn access_token(&self) -> Result<Option<AccessToken>, TokenError> {
        match self {
            Self::AuthorizedUser(c) => c.access_token(),
            Self::ServiceAccount(c) => c.access_token(),
            Self::ComputeEngine(c) => c.access_token(),
            Self::Anonymous(c) => c.access_token(),
        }
    }
}

impl From<AuthorizedUserCredentials> for Credentials {
    fn from(creds: AuthorizedUserCredentials) -> Self {
        Self::AuthorizedUser(creds)
    }
}

impl From<ServiceAccountCredentials> for Credentials {
    fn from(creds: ServiceAccountCredentials) -> Self {
        Self::ServiceAccount(creds)
    }
}

impl From<ComputeEngineCredentials> for Credentials {
    fn from(creds: ComputeEngineCredentials) -> Self {
        Self::ComputeEngine(creds)
    }
}

impl From<AnonymousCredentials> for Credentials {
    fn from(creds: AnonymousCredentials) -> Self {
        Self::Anonymous(creds)
    }
}
