//! Printable summaries of resolved credentials.

use adcforge_core::{Credentials, Source};
use serde::Serialize;

/// Non-secret description of a credential object.
#[derive(Debug, Serialize)]
pub struct CredentialSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

impl CredentialSummary {
    pub fn new(creds: &Credentials, source: Option<Source>) -> Self {
        let mut summary = Self {
            source: source.map(|s| s.name().to_string()),
            kind: creds.kind_name(),
            principal: creds.principal().map(str::to_string),
            project_id: None,
            token_uri: None,
            scopes: Vec::new(),
            subject: None,
            metadata_root: None,
            authorization: None,
        };

        match creds {
            Credentials::AuthorizedUser(c) => {
                summary.project_id = c.quota_project_id().map(str::to_string);
                summary.token_uri = Some(c.token_uri().to_string());
            }
            Credentials::ServiceAccount(c) => {
                summary.project_id = c.project_id().map(str::to_string);
                summary.token_uri = Some(c.token_uri().to_string());
                summary.scopes = c.scopes().to_vec();
                summary.subject = c.subject().map(str::to_string);
            }
            Credentials::ComputeEngine(c) => {
                summary.metadata_root = Some(c.metadata_root().to_string());
            }
            Credentials::Anonymous(_) => {}
        }

        summary
    }

    pub fn with_authorization(mut self, header: Option<String>) -> Self {
        self.authorization = header;
        self
    }

    /// One `key: value` line per populated field.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(source) = &self.source {
            lines.push(format!("source: {}", source));
        }
        lines.push(format!("kind: {}", self.kind));

        let optional = [
            ("principal", &self.principal),
            ("project_id", &self.project_id),
            ("token_uri", &self.token_uri),
            ("subject", &self.subject),
            ("metadata_root", &self.metadata_root),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                lines.push(format!("{}: {}", key, value));
            }
        }

        if !self.scopes.is_empty() {
            lines.push(format!("scopes: {}", self.scopes.join(" ")));
        }
        if let Some(header) = &self.authorization {
            lines.push(format!("authorization: {}", header));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_engine_summary() {
        let creds = Credentials::compute_engine(Some("foo@bar.baz"));
        let summary = CredentialSummary::new(&creds, Some(Source::AmbientCompute));

        let text = summary.to_text();
        assert!(text.contains("source: compute metadata server"));
        assert!(text.contains("kind: compute_engine"));
        assert!(text.contains("principal: foo@bar.baz"));
        assert!(text.contains("metadata_root: http://metadata.google.internal"));
    }

    #[test]
    fn test_anonymous_json_omits_empty_fields() {
        let summary = CredentialSummary::new(&Credentials::anonymous(), None);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "anonymous" }));
    }
}
