//! Provider configuration
//!
//! Values are resolved in priority order: the provider block, then the
//! environment, then defaults.
//!
//! # Environment Variables
//!
//! - `SPIRE_ENDPOINT`: Base URL of the entry registry, e.g. `http://127.0.0.1:8081`
//! - `SPIRE_TIMEOUT_SECS`: Per-call timeout in seconds, `0` disables it

use spire_registry::CallContext;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::model::ProviderConfigModel;

pub const ENDPOINT_ENV: &str = "SPIRE_ENDPOINT";
pub const TIMEOUT_ENV: &str = "SPIRE_TIMEOUT_SECS";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8081";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid endpoint '{0}': expected an http:// or https:// URL")]
    InvalidEndpoint(String),

    #[error("Unsupported endpoint '{0}': unix domain sockets are not supported by the HTTP transport")]
    UnsupportedEndpoint(String),

    #[error("Invalid timeout '{0}': expected a whole number of seconds")]
    InvalidTimeout(String),

    #[error("Failed to build registry client: {0}")]
    Client(String),
}

/// Resolved provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the entry registry
    pub endpoint: String,
    /// Timeout applied to every registry call
    pub timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ProviderConfig {
    /// Resolve from the provider block and the process environment
    pub fn resolve(model: &ProviderConfigModel) -> Result<Self, ConfigError> {
        Self::resolve_with(model, |key| env::var(key).ok())
    }

    /// Resolve using a custom environment lookup
    pub fn resolve_with(
        model: &ProviderConfigModel,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let endpoint = model
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| lookup(ENDPOINT_ENV).filter(|e| !e.is_empty()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        validate_endpoint(&endpoint)?;

        let timeout_secs = match model.timeout_secs {
            Some(secs) => Some(secs),
            None => lookup(TIMEOUT_ENV)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))
                })
                .transpose()?,
        };

        let timeout = match timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_TIMEOUT),
        };

        Ok(Self { endpoint, timeout })
    }

    /// Call context applied to every registry call
    pub fn call_context(&self) -> CallContext {
        match self.timeout {
            Some(timeout) => CallContext::new().with_timeout(timeout),
            None => CallContext::new(),
        }
    }
}

/// Check that an endpoint is an http(s) base URL
pub fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.starts_with("unix:") {
        return Err(ConfigError::UnsupportedEndpoint(endpoint.to_string()));
    }

    let rest = endpoint
        .strip_prefix("http://")
        .or_else(|| endpoint.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::InvalidEndpoint(endpoint.to_string()))?;

    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
    }

    Ok(())
}
