//! Token validation against the "current user" endpoint.
//!
//! Validity is decided by the status of the first request alone. Decoding the
//! identity and listing private repositories only enrich an outcome that is
//! already known to be valid, so a failure in either is logged and dropped.

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

use crate::models::{Identity, Resource, ValidationOutcome};
use crate::{Error, Result};

/// GitHub's "current user" endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/user";

const SCOPES_HEADER: &str = "x-oauth-scopes";
const USER_SEGMENT: &str = "/user";
const PRIVATE_REPOS_SEGMENT: &str = "/user/repos?visibility=private";
const USER_AGENT: &str = concat!("ghtv/", env!("CARGO_PKG_VERSION"));

/// What to validate against and how much to fetch for valid tokens.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// The "current user" URL. Also the base of the repository listing URL.
    pub endpoint: String,
    /// Decode the user profile from the validation response.
    pub retrieve_identity: bool,
    /// List private repositories with a second request.
    pub retrieve_resources: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retrieve_identity: false,
            retrieve_resources: false,
        }
    }
}

/// Validates tokens with a shared, pooled HTTP client.
///
/// Cheap to share across workers behind an `Arc`.
#[derive(Debug)]
pub struct Validator {
    client: Client,
    config: ValidatorConfig,
    resources_endpoint: String,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let resources_endpoint = resources_endpoint(&config.endpoint);

        Ok(Self {
            client,
            config,
            resources_endpoint,
        })
    }

    /// Validate one token.
    ///
    /// Never fails: transport errors and non-200 responses both produce
    /// [`ValidationOutcome::invalid`].
    pub async fn validate(&self, credential: &str) -> ValidationOutcome {
        let resp = match self
            .client
            .get(&self.config.endpoint)
            .bearer_auth(credential)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("{}", Error::Transport(e));
                return ValidationOutcome::invalid();
            }
        };

        let status = resp.status();
        if status != StatusCode::OK {
            log::debug!("{} answered {status}", self.config.endpoint);
            return ValidationOutcome::invalid();
        }

        let scopes = parse_scopes(resp.headers());

        let identity = if self.config.retrieve_identity {
            match resp.json::<Identity>().await {
                Ok(identity) => Some(identity),
                Err(e) => {
                    log::warn!("Ignoring user profile: {}", Error::Decode(e));
                    None
                }
            }
        } else {
            None
        };

        let resources = if self.config.retrieve_resources {
            let resources = self.fetch_resources(credential).await.unwrap_or_else(|e| {
                log::warn!("Ignoring private repositories: {e}");
                Vec::new()
            });
            Some(resources)
        } else {
            None
        };

        ValidationOutcome {
            valid: true,
            identity,
            scopes,
            resources,
        }
    }

    async fn fetch_resources(&self, credential: &str) -> Result<Vec<Resource>> {
        let resp = self
            .client
            .get(&self.resources_endpoint)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Status(status));
        }

        resp.json::<Vec<Resource>>().await.map_err(Error::Decode)
    }
}

/// Derive the private repository listing URL from the "current user" URL.
///
/// Only the first `/user` segment is replaced.
pub fn resources_endpoint(endpoint: &str) -> String {
    endpoint.replacen(USER_SEGMENT, PRIVATE_REPOS_SEGMENT, 1)
}

/// Split `X-OAuth-Scopes` on commas and trim each entry.
///
/// A missing or empty header yields a single empty entry, not an empty list.
pub fn parse_scopes(headers: &HeaderMap) -> Vec<String> {
    let value = headers
        .get(SCOPES_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    value.split(',').map(|s| s.trim().to_string()).collect()
}
