//! Error types for credential discovery.
//!
//! Messages are matched by operators and tests; keep the leading phrases
//! stable.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::Origin;

/// Coarse classification of an [`AdcError`].
///
/// Lets callers tell a broken file apart from a missing one without
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A named file could not be opened.
    NotFound,

    /// A document was read but its contents are unusable.
    InvalidArgument,

    /// No discovery mechanism applied.
    Unknown,
}

/// Failure of a single resolution call.
///
/// All variants are terminal; nothing is retried internally.
#[derive(Debug, Error)]
pub enum AdcError {
    /// A path was named explicitly (or exists) but cannot be read.
    #[error("Cannot open credentials file {}: {source}", .path.display())]
    CannotOpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or lacks required fields.
    #[error("Invalid contents in {origin}: {reason}")]
    MalformedCredentialFile { origin: Origin, reason: String },

    /// The `type` field names a kind this entry point cannot build.
    #[error("Unsupported credential type ({kind}) when reading {origin}")]
    UnsupportedCredentialType { kind: String, origin: Origin },

    /// Every mechanism was consulted and none applied.
    #[error(
        "Could not automatically determine credentials. Consulted: {}. For more information, please see https://developers.google.com/identity/protocols/application-default-credentials",
        .consulted.join("; ")
    )]
    NoCredentialsFound { consulted: Vec<String> },
}

impl AdcError {
    pub(crate) fn malformed(origin: &Origin, reason: impl Into<String>) -> Self {
        Self::MalformedCredentialFile {
            origin: origin.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(kind: impl Into<String>, origin: &Origin) -> Self {
        Self::UnsupportedCredentialType {
            kind: kind.into(),
            origin: origin.clone(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CannotOpenFile { .. } => ErrorCode::NotFound,
            Self::MalformedCredentialFile { .. } | Self::UnsupportedCredentialType { .. } => {
                ErrorCode::InvalidArgument
            }
            Self::NoCredentialsFound { .. } => ErrorCode::Unknown,
        }
    }

    /// The file the error is about, when known.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::CannotOpenFile { path, .. } => Some(path),
            Self::MalformedCredentialFile { origin, .. }
            | Self::UnsupportedCredentialType { origin, .. } => origin.path(),
            Self::NoCredentialsFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_cannot_open_message_names_file() {
        let err = AdcError::CannotOpenFile {
            path: PathBuf::from("missing-credentials.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        let message = err.to_string();
        assert!(message.contains("Cannot open credentials file"));
        assert!(message.contains("missing-credentials.json"));
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_malformed_and_missing_have_distinct_codes() {
        let malformed = AdcError::malformed(&Origin::file("/tmp/bad.json"), "expected value");
        assert!(malformed.to_string().contains("credentials file /tmp/bad.json"));
        assert_eq!(malformed.code(), ErrorCode::InvalidArgument);
        assert_ne!(malformed.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_unsupported_message_has_literal_kind() {
        let err = AdcError::unsupported("unknown_type", &Origin::file("/tmp/u.json"));
        let message = err.to_string();
        assert!(message.contains("Unsupported credential type"));
        assert!(message.contains("unknown_type"));
        assert!(message.contains("/tmp/u.json"));
        assert_eq!(err.path(), Some(std::path::Path::new("/tmp/u.json")));
    }

    #[test]
    fn test_no_credentials_lists_consulted() {
        let err = AdcError::NoCredentialsFound {
            consulted: vec![
                "GOOGLE_APPLICATION_CREDENTIALS (unset)".to_string(),
                "/home/me/.config/gcloud/application_default_credentials.json (not found)"
                    .to_string(),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("Could not automatically determine"));
        assert!(message.contains("GOOGLE_APPLICATION_CREDENTIALS (unset)"));
        assert!(message.contains("application_default_credentials.json (not found)"));
        assert_eq!(err.code(), ErrorCode::Unknown);
    }
}
