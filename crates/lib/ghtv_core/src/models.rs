//! Records decoded from the GitHub REST API and the per-token outcome.

use serde::Deserialize;

/// The authenticated principal, as returned by `GET /user`.
///
/// Only `login` and `id` are required; GitHub returns `null` for unset
/// profile fields and omits `two_factor_authentication` for tokens without
/// the `user` scope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub two_factor_authentication: Option<bool>,
}

/// A private repository owned by the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "html_url")]
    pub url: String,
}

/// Result of validating a single token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub identity: Option<Identity>,
    /// Scope names from `X-OAuth-Scopes`. Empty when the token is invalid.
    pub scopes: Vec<String>,
    /// `None` unless repository retrieval was requested for a valid token.
    pub resources: Option<Vec<Resource>>,
}

impl ValidationOutcome {
    /// Outcome for a rejected token or a failed request.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Private repositories, empty when none were requested or retrieved.
    pub fn resources(&self) -> &[Resource] {
        self.resources.as_deref().unwrap_or_default()
    }
}
