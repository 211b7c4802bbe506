//! Authentication pattern inferred by the AuthDetector (Stage 5).
//!
//! Never carries a credential *value* — only location and naming. See
//! spec.md §3 Invariant 7 and §9 "Credential handling".

use serde::{Deserialize, Serialize};

/// Where a credential field is transmitted.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialLocation {
    /// An HTTP header.
    Header,
    /// A cookie.
    Cookie,
    /// A query-string parameter.
    Query,
}

/// The kind of authentication scheme detected.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// Session/identity cookies.
    Cookie,
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// A static API key, in a header or query parameter.
    ApiKey,
    /// Something else observed consistently but not matching a known shape.
    Custom,
}

/// One credential slot a replay must fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialField {
    /// The field's name (header name, cookie name, or query key).
    pub name: String,
    /// Human-readable description of what this credential is for.
    pub description: String,
    /// Where it's transmitted.
    pub location: CredentialLocation,
}

/// The authentication scheme inferred for a workflow, plus the credential
/// slots a replay must fill. Never contains a credential value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPattern {
    /// The detected scheme.
    pub kind: AuthKind,
    /// Credential fields a replay needs (including any detected CSRF
    /// companion fields).
    pub credential_fields: Vec<CredentialField>,
}

impl AuthPattern {
    /// A pattern with no detectable scheme and no credential fields —
    /// the fallback when nothing consistent was observed (spec.md §4.5,
    /// classification step 6).
    pub fn none() -> Self {
        Self {
            kind: AuthKind::Custom,
            credential_fields: vec![],
        }
    }
}
