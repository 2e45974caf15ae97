//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the route mount path and header values
//! - Validate value ranges (limits and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every semantic rule, collecting all failures.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    let mount = &config.upstream.mount_path;
    if !mount.starts_with('/') || mount.len() < 2 || mount.ends_with('/') {
        errors.push(ValidationError::new(
            "upstream.mount_path",
            format!("must start with '/', not end with '/', and not be the root: {mount:?}"),
        ));
    } else if mount.contains('{') || mount.contains('}') {
        errors.push(ValidationError::new(
            "upstream.mount_path",
            "must not contain route parameters",
        ));
    } else if mount == "/healthz" {
        errors.push(ValidationError::new(
            "upstream.mount_path",
            "conflicts with the health endpoint",
        ));
    }

    if HeaderValue::from_str(&config.upstream.user_agent).is_err() {
        errors.push(ValidationError::new(
            "upstream.user_agent",
            "not a valid header value",
        ));
    }

    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::new("upstream.max_body_bytes", "must be > 0"));
    }

    if config.credentials.token_env.is_empty() {
        errors.push(ValidationError::new(
            "credentials.token_env",
            "at least one variable name is required",
        ));
    } else if config.credentials.token_env.iter().any(|n| n.trim().is_empty()) {
        errors.push(ValidationError::new(
            "credentials.token_env",
            "variable names must not be blank",
        ));
    }

    if config.timeouts.connect_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be > 0"));
    }
    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
