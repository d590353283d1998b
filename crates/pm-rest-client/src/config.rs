//! Configuration for the REST client and its HTTP transport.

use std::time::Duration;

use pm_rest_api_contract::{api_base_url, DEFAULT_ENDPOINT};
use url::Url;

use crate::error::{RestClientError, RestClientResult};

pub const BASE_URL_ENV: &str = "PINGME_BASE_URL";
pub const TIMEOUT_ENV: &str = "PINGME_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_ENV: &str = "PINGME_CONNECT_TIMEOUT_SECS";

/// Configuration for [`OpsManagerClient`](crate::OpsManagerClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, e.g. `https://cloud.mongodb.com/` or an on-prem Ops Manager URL.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("pingme/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PINGME_BASE_URL`: service root (default: `https://cloud.mongodb.com/`)
    /// - `PINGME_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    /// - `PINGME_CONNECT_TIMEOUT_SECS`: connection timeout in seconds (default: 10)
    pub fn from_env() -> RestClientResult<Self> {
        let defaults = Self::default();

        let endpoint = std::env::var(BASE_URL_ENV).unwrap_or(defaults.endpoint);
        let timeout = secs_from_env(TIMEOUT_ENV)?.unwrap_or(defaults.timeout);
        let connect_timeout =
            secs_from_env(CONNECT_TIMEOUT_ENV)?.unwrap_or(defaults.connect_timeout);

        Ok(Self {
            endpoint,
            timeout,
            connect_timeout,
            user_agent: defaults.user_agent,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Endpoint joined with the API version prefix.
    pub fn base_url(&self) -> RestClientResult<Url> {
        Ok(api_base_url(&self.endpoint)?)
    }
}

fn secs_from_env(name: &str) -> RestClientResult<Option<Duration>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| RestClientError::Configuration(format!("invalid {name}: {e}"))),
        Err(_) => Ok(None),
    }
}
