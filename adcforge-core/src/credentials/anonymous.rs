//! Credentials that send no authorization at all.

use crate::token::{AccessToken, CredentialProvider, TokenError};

/// Unauthenticated access, for public resources and emulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymousCredentials;

impl CredentialProvider for AnonymousCredentials {
    fn access_token(&self) -> Result<Option<AccessToken>, TokenError> {
        Ok(None)
    }
}
