//! REST adapter configuration from environment variables.
//!
//! Native builds load a `.env` file first. Browser builds have no process
//! environment, so the same variables are also read at compile time.

use std::time::Duration;

use store::SnapfeedConfig;
use thiserror::Error;

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RestConfig {
    pub api_key: String,
    pub project_id: String,
    pub auth_url: String,
    pub firestore_url: String,
    pub token_url: String,
    pub poll_interval: Duration,
}

fn lookup(key: &'static str, baked: Option<&'static str>) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| baked.map(str::to_string))
        .filter(|value| !value.trim().is_empty())
}

impl RestConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            poll_interval: SnapfeedConfig::default().sync.poll_interval(),
        }
    }

    /// Read `SNAPFEED_API_KEY` and `SNAPFEED_PROJECT_ID` (required) plus the
    /// optional `SNAPFEED_AUTH_URL` / `SNAPFEED_FIRESTORE_URL` /
    /// `SNAPFEED_TOKEN_URL` overrides.
    pub fn from_env(config: &SnapfeedConfig) -> Result<Self, ConfigError> {
        #[cfg(not(target_arch = "wasm32"))]
        dotenvy::dotenv().ok();

        let api_key = lookup("SNAPFEED_API_KEY", option_env!("SNAPFEED_API_KEY"))
            .ok_or(ConfigError::Missing("SNAPFEED_API_KEY"))?;
        let project_id = lookup("SNAPFEED_PROJECT_ID", option_env!("SNAPFEED_PROJECT_ID"))
            .ok_or(ConfigError::Missing("SNAPFEED_PROJECT_ID"))?;

        let mut rest = Self::new(api_key, project_id);
        if let Some(url) = lookup("SNAPFEED_AUTH_URL", option_env!("SNAPFEED_AUTH_URL")) {
            rest.auth_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("SNAPFEED_FIRESTORE_URL", option_env!("SNAPFEED_FIRESTORE_URL")) {
            rest.firestore_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("SNAPFEED_TOKEN_URL", option_env!("SNAPFEED_TOKEN_URL")) {
            rest.token_url = url.trim_end_matches('/').to_string();
        }
        rest.poll_interval = config.sync.poll_interval();
        Ok(rest)
    }

    pub(crate) fn auth_endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.auth_url, method, self.api_key)
    }

    pub(crate) fn token_endpoint(&self) -> String {
        format!("{}/token?key={}", self.token_url, self.api_key)
    }

    pub(crate) fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    pub(crate) fn documents_endpoint(&self, method: &str) -> String {
        format!("{}/{}:{}", self.firestore_url, self.documents_root(), method)
    }
}
