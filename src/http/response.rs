//! Plain-text response construction.
//!
//! # Responsibilities
//! - Render local failures as `Proxy error: <message>` bodies
//! - Render relayed upstream failures as bare `text/plain` bodies
//!
//! # Design Decisions
//! - Bodies stay plain text so Git clients can surface them verbatim
//! - Upstream error text is never wrapped or reinterpreted

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Prefix shared by every locally generated error body.
pub const PROXY_ERROR_PREFIX: &str = "Proxy error: ";

/// Build the response for a failure that originated in the proxy itself.
pub fn proxy_error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        format!("{PROXY_ERROR_PREFIX}{message}"),
    )
        .into_response()
}

/// Relay an upstream error body with the upstream's own status.
pub fn upstream_error_response(status: StatusCode, text: String) -> Response {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}
