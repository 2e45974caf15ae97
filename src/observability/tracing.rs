//! Request spans.
//!
//! The span carries the request ID and method only. The path embeds the
//! upstream URL, which may contain userinfo credentials, so it is left out.

use axum::http::Request;
use tracing::Span;

use crate::http::request::RequestIdExt;

/// Span for one inbound request, used by the `TraceLayer`.
pub fn request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request.request_id(),
        method = %request.method(),
    )
}
