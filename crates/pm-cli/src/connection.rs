//! Connection flags shared by every subcommand

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use pm_client_api::{Credentials, API_KEY_ENV, USERNAME_ENV};
use pm_rest_api_contract::DEFAULT_ENDPOINT;
use pm_rest_client::{ClientConfig, OpsManagerClient, BASE_URL_ENV, TIMEOUT_ENV};

#[derive(Args)]
pub struct ConnectionArgs {
    /// Ops Manager user the API key belongs to
    #[arg(long, global = true, env = USERNAME_ENV)]
    pub username: Option<String>,

    /// Public API key used for digest authentication
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the Ops Manager server
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_ENDPOINT)]
    pub server_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = TIMEOUT_ENV, default_value_t = 30)]
    pub timeout: u64,
}

impl ConnectionArgs {
    pub fn credentials(&self) -> Result<Credentials> {
        let username = self
            .username
            .as_deref()
            .with_context(|| format!("--username or {USERNAME_ENV} is required"))?;
        let api_key = self
            .api_key
            .as_deref()
            .with_context(|| format!("--api-key or {API_KEY_ENV} is required"))?;
        Ok(Credentials::new(username, api_key)?)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_endpoint(self.server_url.clone())
            .with_timeout(Duration::from_secs(self.timeout))
    }

    pub fn connect(&self) -> Result<OpsManagerClient> {
        let client = OpsManagerClient::new(self.credentials()?, &self.config())
            .with_context(|| format!("cannot connect to {}", self.server_url))?;
        Ok(client)
    }
}
