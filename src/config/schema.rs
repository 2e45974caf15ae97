//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::security::credentials::DEFAULT_TOKEN_ENV;

/// Root configuration for the Git relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Proxy route and outbound request settings.
    pub upstream: UpstreamConfig,

    /// Where provider tokens are read from.
    pub credentials: CredentialsConfig,

    /// Optional timeouts; none are imposed by default.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Proxy route and outbound request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Path the wildcard route is mounted under (no trailing slash).
    pub mount_path: String,

    /// User-Agent sent on every upstream request.
    pub user_agent: String,

    /// Largest inbound request body buffered for forwarding, in bytes.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mount_path: "/api/git-proxy".to_string(),
            user_agent: concat!("git-relay/", env!("CARGO_PKG_VERSION")).to_string(),
            max_body_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Credential source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Environment variables holding the GitHub token, highest priority first.
    pub token_env: Vec<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Timeout configuration. Unset means unbounded.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Time allowed until response headers are produced, in seconds.
    pub request_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn is_unbounded(&self) -> bool {
        self.connect_secs.is_none() && self.request_secs.is_none()
    }

    /// Deadline for a proxied exchange to produce its response headers.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_secs.map(Duration::from_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
