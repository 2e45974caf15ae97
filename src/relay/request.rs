//! Outbound request assembly.

use axum::body::Bytes;
use axum::http::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use axum::http::Method;

use crate::routing::UpstreamTarget;
use crate::security::headers::forward_request_headers;

/// A fully prepared request to the upstream Git host.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Absolute `http(s)://` URL.
    pub url: String,
    pub headers: HeaderMap,
    /// `None` for methods that never carry a body.
    pub body: Option<Bytes>,
}

impl UpstreamRequest {
    /// Assemble the outbound request.
    ///
    /// Only allowlisted inbound headers survive; `user-agent` is always the
    /// proxy's own and `authorization` is set only from `authorization`.
    /// A body is dropped for `GET`/`HEAD` even if one was supplied.
    pub fn new(
        method: Method,
        target: &UpstreamTarget,
        inbound_headers: &HeaderMap,
        user_agent: HeaderValue,
        authorization: Option<HeaderValue>,
        body: Option<Bytes>,
    ) -> Self {
        let mut headers = forward_request_headers(inbound_headers);
        headers.insert(USER_AGENT, user_agent);
        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, value);
        }

        let body = if carries_body(&method) { body } else { None };

        Self {
            method,
            url: target.url().to_string(),
            headers,
            body,
        }
    }
}

/// Whether the inbound body is read and forwarded for `method`.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}
