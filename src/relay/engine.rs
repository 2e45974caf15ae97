//! Relay engine: reconstruct → authenticate → relay.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::response::Response;
use futures_util::TryStreamExt;
use hyper::ext::ReasonPhrase;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::error::ProxyError;
use crate::http::response::upstream_error_response;
use crate::relay::request::{carries_body, UpstreamRequest};
use crate::routing::UpstreamTarget;
use crate::security::headers::forward_response_headers;
use crate::security::{CredentialInjector, TokenSources};

/// Build the outbound HTTP client.
///
/// Transparent decompression stays off so relayed pack bytes are exactly the
/// upstream's bytes.
pub fn build_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeouts.connect_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// Per-request relay over an injected client and token snapshot.
///
/// Holds no per-request state; one instance serves all requests concurrently.
#[derive(Debug, Clone)]
pub struct GitProxy {
    client: reqwest::Client,
    injector: CredentialInjector,
    user_agent: HeaderValue,
    max_body_bytes: usize,
    request_timeout: Option<Duration>,
}

impl GitProxy {
    pub fn new(
        client: reqwest::Client,
        tokens: TokenSources,
        upstream: &UpstreamConfig,
    ) -> Result<Self, ProxyError> {
        Ok(Self {
            client,
            injector: CredentialInjector::new(tokens),
            user_agent: HeaderValue::from_str(&upstream.user_agent)?,
            max_body_bytes: upstream.max_body_bytes,
            request_timeout: None,
        })
    }

    /// Bound each exchange by `limit`, measured until the caller's response
    /// is ready. Streaming a successful body is not covered.
    pub fn with_request_timeout(mut self, limit: Option<Duration>) -> Self {
        self.request_timeout = limit;
        self
    }

    /// Proxy one inbound request whose wildcard path split into `segments`.
    pub async fn handle<S: AsRef<str>>(
        &self,
        segments: &[S],
        request: Request<Body>,
    ) -> Result<Response, ProxyError> {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.forward(segments, request))
                .await
                .map_err(|_| ProxyError::UpstreamTimeout(limit))?,
            None => self.forward(segments, request).await,
        }
    }

    async fn forward<S: AsRef<str>>(
        &self,
        segments: &[S],
        request: Request<Body>,
    ) -> Result<Response, ProxyError> {
        let query = request
            .uri()
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{q}"))
            .unwrap_or_default();
        let target = UpstreamTarget::reconstruct(segments, &query)?;
        let authorization = self.injector.authorization_for(&target)?;

        let (parts, body) = request.into_parts();
        let body = if carries_body(&parts.method) {
            let bytes = axum::body::to_bytes(body, self.max_body_bytes)
                .await
                .map_err(ProxyError::RequestBody)?;
            Some(bytes)
        } else {
            None
        };

        tracing::debug!(
            method = %parts.method,
            upstream_host = %target.host(),
            authenticated = authorization.is_some(),
            body_len = body.as_ref().map_or(0, Bytes::len),
            "Relaying request"
        );

        let upstream = UpstreamRequest::new(
            parts.method,
            &target,
            &parts.headers,
            self.user_agent.clone(),
            authorization,
            body,
        );
        self.relay(upstream).await
    }

    /// Send a prepared request and shape the upstream response for the caller.
    pub async fn relay(&self, upstream: UpstreamRequest) -> Result<Response, ProxyError> {
        let mut builder = self
            .client
            .request(upstream.method, upstream.url.as_str())
            .headers(upstream.headers);
        if let Some(body) = upstream.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        Ok(shape_response(response).await)
    }
}

/// Turn the upstream response into the caller's response.
///
/// Success streams the body through with `content-type`/`cache-control` only.
/// Anything else is relayed as plain text with the upstream status. A
/// non-canonical upstream reason phrase is kept on the caller's status line.
pub async fn shape_response(response: reqwest::Response) -> Response {
    let status = response.status();
    let reason = response.extensions().get::<ReasonPhrase>().cloned();

    if !status.is_success() {
        let status_text = status_text(status, reason.as_ref());
        let text = match response.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => status_text,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read upstream error body");
                status_text
            }
        };
        tracing::warn!(status = %status, "Upstream returned error status");
        let mut shaped = upstream_error_response(status, text);
        if let Some(reason) = reason {
            shaped.extensions_mut().insert(reason);
        }
        return shaped;
    }

    let headers = forward_response_headers(response.headers());
    let stream = response.bytes_stream().inspect_err(|e| {
        tracing::warn!(error = %e, "Upstream body stream aborted");
    });

    let mut shaped = Response::new(Body::from_stream(stream));
    *shaped.status_mut() = status;
    *shaped.headers_mut() = headers;
    if let Some(reason) = reason {
        shaped.extensions_mut().insert(reason);
    }
    shaped
}

/// The upstream's own reason phrase, else the canonical one for `status`.
fn status_text(status: StatusCode, reason: Option<&ReasonPhrase>) -> String {
    match reason {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or_default().to_string(),
    }
}
