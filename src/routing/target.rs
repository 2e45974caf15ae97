//! Upstream URL reconstruction.
//!
//! # Responsibilities
//! - Split the wildcard capture into path segments
//! - Rebuild an absolute upstream URL from those segments and the query
//! - Extract the upstream host for credential decisions
//!
//! # Design Decisions
//! - Git clients split a full URL at every `/`, so `https:` and empty
//!   segments are expected input, not errors
//! - A scheme whose `//` collapsed to `/` is repaired, a missing scheme
//!   defaults to `https://`
//! - The reconstructed string is forwarded as-is; parsing only extracts the host

use url::Url;

use crate::error::ProxyError;

/// Absolute upstream destination for one proxied request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    url: String,
    host: String,
}

impl UpstreamTarget {
    /// Reconstruct the target from wildcard segments and the raw query string
    /// (`"?a=b"` or `""`).
    pub fn reconstruct<S: AsRef<str>>(segments: &[S], query: &str) -> Result<Self, ProxyError> {
        let url = build_upstream_url(segments, query)?;
        let parsed = Url::parse(&url).map_err(|e| {
            ProxyError::InvalidUpstreamTarget(format!("malformed upstream URL: {e}"))
        })?;
        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
            _ => {
                return Err(ProxyError::InvalidUpstreamTarget(
                    "upstream URL has no host".to_string(),
                ))
            }
        };
        Ok(Self { url, host })
    }

    /// The URL string sent upstream.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lowercased upstream host, without port.
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Split a wildcard capture into path segments.
///
/// An empty capture yields no segments; otherwise empty segments are kept so
/// that `https://host` survives as `["https:", "", "host"]`.
pub fn split_segments(capture: &str) -> Vec<&str> {
    if capture.is_empty() {
        Vec::new()
    } else {
        capture.split('/').collect()
    }
}

/// Join path segments into an absolute `http(s)://` URL and append the query.
pub fn build_upstream_url<S: AsRef<str>>(segments: &[S], query: &str) -> Result<String, ProxyError> {
    if segments.is_empty() {
        return Err(ProxyError::InvalidUpstreamTarget(
            "missing upstream URL segments".to_string(),
        ));
    }

    let mut s = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("/");

    // "https:/host" -> "https://host"
    if let Some(len) = collapsed_scheme_len(&s) {
        s.insert(len, '/');
    }

    if !starts_with_ignore_case(&s, "http://") && !starts_with_ignore_case(&s, "https://") {
        s.insert_str(0, "https://");
    }

    if !query.is_empty() {
        s.push_str(query);
    }

    Ok(s)
}

/// Length of a leading `http:/` or `https:/` that lacks its second slash.
fn collapsed_scheme_len(s: &str) -> Option<usize> {
    ["https:/", "http:/"]
        .into_iter()
        .find(|prefix| starts_with_ignore_case(s, prefix))
        .map(str::len)
        .filter(|&len| !s[len..].starts_with('/'))
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
