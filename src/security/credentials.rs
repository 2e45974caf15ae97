//! Provider credential injection.
//!
//! # Responsibilities
//! - Classify upstream hosts by hosting provider
//! - Resolve the provider token from an ordered list of named sources
//! - Encode the token as an outbound `Authorization` header
//!
//! # Design Decisions
//! - Token values are captured once at startup and injected, never re-read
//! - Precedence is an ordered scan; the first non-empty value wins
//! - Hosts outside a known provider never receive injected credentials
//! - Token values never appear in logs or `Debug` output

use std::fmt;

use axum::http::HeaderValue;
use base64::Engine;

use crate::error::ProxyError;
use crate::routing::UpstreamTarget;

/// Environment variables consulted for a GitHub token, highest priority first.
/// Server-only names precede the client-visible `NEXT_PUBLIC_` one.
pub const DEFAULT_TOKEN_ENV: [&str; 4] = [
    "GITHUB_TOKEN",
    "GH_TOKEN",
    "PERSONAL_ACCESS_TOKEN",
    "NEXT_PUBLIC_GITHUB_TOKEN",
];

/// Password paired with a GitHub token in Basic credentials.
const GITHUB_BASIC_PASSWORD: &str = "x-oauth-basic";

/// Hosting providers whose hosts receive injected credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
}

impl Provider {
    /// Classify a lowercased host. `None` means credentials are never injected.
    pub fn classify(host: &str) -> Option<Self> {
        if host.eq_ignore_ascii_case("github.com") || host.eq_ignore_ascii_case("api.github.com") {
            Some(Provider::GitHub)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::GitHub => "GitHub",
        }
    }
}

/// Ordered snapshot of named token sources.
#[derive(Clone, Default)]
pub struct TokenSources {
    entries: Vec<(String, Option<String>)>,
}

impl TokenSources {
    /// Capture the current value of each named environment variable, in order.
    pub fn from_env<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .map(Into::into)
            .map(|name| {
                let value = std::env::var(&name).ok();
                (name, value)
            })
            .collect();
        Self { entries }
    }

    /// Build sources from literal `(name, value)` pairs, in priority order.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, Option<V>)>,
        N: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.map(Into::into)))
            .collect();
        Self { entries }
    }

    /// First non-empty token, scanning in priority order.
    pub fn resolve(&self) -> Option<&str> {
        self.resolve_named().map(|(_, token)| token)
    }

    /// Like [`resolve`](Self::resolve), also returning the winning source name.
    pub fn resolve_named(&self) -> Option<(&str, &str)> {
        self.entries.iter().find_map(|(name, value)| match value.as_deref() {
            Some(token) if !token.is_empty() => Some((name.as_str(), token)),
            _ => None,
        })
    }

    /// Source names, highest priority first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for TokenSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (name, value) in &self.entries {
            let state = match value.as_deref() {
                Some(v) if !v.is_empty() => "<set>",
                _ => "<unset>",
            };
            list.entry(&format_args!("{name}={state}"));
        }
        list.finish()
    }
}

/// Decides per upstream target whether to attach an `Authorization` header.
#[derive(Debug, Clone)]
pub struct CredentialInjector {
    tokens: TokenSources,
}

impl CredentialInjector {
    pub fn new(tokens: TokenSources) -> Self {
        Self { tokens }
    }

    /// Authorization header for `target`, if its provider requires one.
    ///
    /// Fails with [`ProxyError::MissingCredential`] when the provider needs a
    /// token and none resolves.
    pub fn authorization_for(&self, target: &UpstreamTarget) -> Result<Option<HeaderValue>, ProxyError> {
        let Some(provider) = Provider::classify(target.host()) else {
            return Ok(None);
        };

        match provider {
            Provider::GitHub => {
                let Some((source, token)) = self.tokens.resolve_named() else {
                    return Err(ProxyError::MissingCredential {
                        provider: provider.name(),
                        hint: self.tokens.names().next().unwrap_or("GITHUB_TOKEN").to_string(),
                    });
                };
                tracing::trace!(provider = provider.name(), source, "Injecting credentials");
                basic_auth_header(token, GITHUB_BASIC_PASSWORD).map(Some)
            }
        }
    }
}

/// `Basic base64(user:password)`, marked sensitive.
pub fn basic_auth_header(user: &str, password: &str) -> Result<HeaderValue, ProxyError> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))?;
    value.set_sensitive(true);
    Ok(value)
}
