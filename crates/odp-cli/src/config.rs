//! Configuration management for the ODP CLI
//!
//! The configuration is assembled once at startup from `.env` (loaded in
//! `main`), `ODP_*` environment variables, and CLI flags, then passed by
//! reference into the API client. It is never read as ambient global state
//! after that.

use crate::error::{CliError, Result};
use clap::ValueEnum;
use odp_pipeline::api::client::{ApiOptions, DEFAULT_SCHEMA, DEFAULT_TIMEOUT_SECS};
use odp_pipeline::upload::UploadSettings;
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default platform URL for the local environment.
pub const DEFAULT_LOCAL_URL: &str = "http://127.0.0.1:8000";

/// Target environment for the platform API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    /// Local or test platform instance
    #[default]
    Local,
    /// The production platform
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "local"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Selected environment
    pub environment: Environment,

    /// Platform base URL
    pub base_url: String,

    /// API token, if any
    pub api_token: Option<String>,

    /// Target schema on the platform
    pub schema: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Upload run settings
    pub upload: UploadSettings,
}

impl Config {
    /// Assemble the configuration for an environment
    ///
    /// `base_url` comes from the `--base-url` flag or `ODP_BASE_URL`; the
    /// local environment falls back to [`DEFAULT_LOCAL_URL`], production
    /// has no fallback. Production also requires `ODP_API_TOKEN` so a
    /// misconfigured run fails before touching the platform.
    pub fn load(environment: Environment, base_url: Option<String>) -> Result<Self> {
        let base_url = match (base_url, environment) {
            (Some(url), _) => url,
            (None, Environment::Local) => DEFAULT_LOCAL_URL.to_string(),
            (None, Environment::Production) => {
                return Err(CliError::config(
                    "ODP_BASE_URL is required for the production environment",
                ));
            },
        };

        let api_token = std::env::var("ODP_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        if environment == Environment::Production && api_token.is_none() {
            return Err(CliError::config(
                "ODP_API_TOKEN is required for the production environment",
            ));
        }

        let schema =
            std::env::var("ODP_SCHEMA").unwrap_or_else(|_| DEFAULT_SCHEMA.to_string());

        let timeout_secs = std::env::var("ODP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut upload = UploadSettings::default();
        if let Some(rows) = std::env::var("ODP_CHUNK_ROWS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            if rows > 0 {
                upload.chunk_row_limit = rows;
            }
        }
        if let Some(delay_ms) = std::env::var("ODP_RETRY_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            upload.retry_base_delay = Duration::from_millis(delay_ms);
        }

        Ok(Self {
            environment,
            base_url,
            api_token,
            schema,
            timeout_secs,
            upload,
        })
    }

    /// Connection options for the API client
    pub fn api_options(&self) -> ApiOptions {
        ApiOptions {
            base_url: self.base_url.clone(),
            schema: self.schema.clone(),
            api_token: self.api_token.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
