//! Proxy error taxonomy and its HTTP mapping.
//!
//! Every failure is terminal for the current request and becomes a plain-text
//! response whose status code the calling Git client can act on. Upstream
//! non-success statuses are not errors here; the relay passes them through.

use std::time::Duration;

use axum::http::{header::InvalidHeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::response::proxy_error_response;

/// Errors that terminate a proxied request before or during the relay.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The wildcard path could not be turned into an absolute upstream URL.
    #[error("invalid upstream target: {0}")]
    InvalidUpstreamTarget(String),

    /// The destination requires provider credentials but no token resolved.
    #[error("{provider} token not configured on server (set {hint})")]
    MissingCredential {
        provider: &'static str,
        hint: String,
    },

    /// The inbound request body could not be buffered.
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    /// The upstream host could not be reached or the exchange broke off.
    #[error("upstream request failed: {0}")]
    UpstreamTransportFailure(#[from] reqwest::Error),

    /// The upstream produced no response within the configured deadline.
    #[error("upstream did not respond within {}s", .0.as_secs())]
    UpstreamTimeout(Duration),

    /// An outbound header value could not be constructed.
    #[error("invalid outbound header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl ProxyError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUpstreamTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::MissingCredential { .. } => StatusCode::UNAUTHORIZED,
            ProxyError::RequestBody(_)
            | ProxyError::UpstreamTransportFailure(_)
            | ProxyError::UpstreamTimeout(_)
            | ProxyError::InvalidHeader(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for the failure class.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::InvalidUpstreamTarget(_) => "invalid_target",
            ProxyError::MissingCredential { .. } => "missing_credential",
            _ => "proxy_error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        proxy_error_response(self.status(), &self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ProxyError::InvalidUpstreamTarget("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
        let missing = ProxyError::MissingCredential {
            provider: "GitHub",
            hint: "GITHUB_TOKEN".into(),
        };
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(missing.outcome(), "missing_credential");
        assert_eq!(
            missing.to_string(),
            "GitHub token not configured on server (set GITHUB_TOKEN)"
        );
    }

    #[test]
    fn timeout_is_internal_error() {
        let err = ProxyError::UpstreamTimeout(Duration::from_secs(30));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.outcome(), "proxy_error");
        assert_eq!(err.to_string(), "upstream did not respond within 30s");
    }
}
