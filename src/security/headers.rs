//! Header allowlists for the relay.
//!
//! # Responsibilities
//! - Select the inbound headers forwarded upstream
//! - Select the upstream headers returned to the caller
//!
//! # Design Decisions
//! - Allowlist, not denylist: anything unnamed is dropped
//! - Inbound `Authorization` is always dropped; the proxy alone decides it
//! - Header names are matched case-insensitively (`HeaderName` is lowercase)

use axum::http::header::{HeaderMap, HeaderName, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};

/// Git wire protocol version negotiation header.
pub const GIT_PROTOCOL: HeaderName = HeaderName::from_static("git-protocol");

/// Inbound headers relayed to the upstream when present.
pub const FORWARDED_REQUEST_HEADERS: [HeaderName; 3] = [ACCEPT, CONTENT_TYPE, GIT_PROTOCOL];

/// Upstream headers relayed to the caller on success.
pub const FORWARDED_RESPONSE_HEADERS: [HeaderName; 2] = [CONTENT_TYPE, CACHE_CONTROL];

/// Copy the allowlisted request headers from `inbound`.
pub fn forward_request_headers(inbound: &HeaderMap) -> HeaderMap {
    copy_allowlisted(inbound, &FORWARDED_REQUEST_HEADERS)
}

/// Copy the allowlisted response headers from an upstream response.
pub fn forward_response_headers(upstream: &HeaderMap) -> HeaderMap {
    copy_allowlisted(upstream, &FORWARDED_RESPONSE_HEADERS)
}

fn copy_allowlisted(source: &HeaderMap, allowed: &[HeaderName]) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in allowed {
        for value in source.get_all(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE, USER_AGENT};
    use axum::http::HeaderValue;

    #[test]
    fn request_allowlist() {
        let mut inbound = HeaderMap::new();
        inbound.insert(ACCEPT, HeaderValue::from_static("application/x-git-upload-pack-result"));
        inbound.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-git-upload-pack-request"));
        inbound.insert(
            HeaderName::from_bytes(b"Git-Protocol").unwrap(),
            HeaderValue::from_static("version=2"),
        );
        inbound.insert(AUTHORIZATION, HeaderValue::from_static("Bearer client-supplied"));
        inbound.insert(COOKIE, HeaderValue::from_static("session=1"));
        inbound.insert(USER_AGENT, HeaderValue::from_static("git/isomorphic-git@1.0"));

        let forwarded = forward_request_headers(&inbound);
        assert_eq!(forwarded.len(), 3);
        assert_eq!(forwarded["git-protocol"], "version=2");
        assert!(forwarded.get(AUTHORIZATION).is_none());
        assert!(forwarded.get(USER_AGENT).is_none());
    }

    #[test]
    fn response_allowlist() {
        let mut upstream = HeaderMap::new();
        upstream.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-git-upload-pack-advertisement"));
        upstream.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        upstream.insert("set-cookie", HeaderValue::from_static("a=b"));
        upstream.insert("x-github-request-id", HeaderValue::from_static("1"));
        upstream.insert("content-length", HeaderValue::from_static("10"));

        let forwarded = forward_response_headers(&upstream);
        let mut names: Vec<_> = forwarded.keys().map(HeaderName::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["cache-control", "content-type"]);
    }

    #[test]
    fn missing_headers_skipped() {
        assert!(forward_request_headers(&HeaderMap::new()).is_empty());
    }
}
