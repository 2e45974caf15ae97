//! Shared utilities for relay integration tests.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, Request, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use git_relay::security::TokenSources;
use git_relay::{HttpServer, ProxyConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const ADVERTISEMENT: &str = "001e# service=git-upload-pack\n0000";
pub const PACK_CHUNK: usize = 64 * 1024;
pub const PACK_CHUNKS: usize = 64;

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Requests received by the mock upstream, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn all(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.all().pop().expect("upstream received no request")
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Deterministic binary payload served by `/pack`.
pub fn pack_bytes() -> Vec<u8> {
    (0..PACK_CHUNK * PACK_CHUNKS).map(|i| (i % 251) as u8).collect()
}

/// Start a Git-host impersonating upstream on an ephemeral port.
pub async fn start_mock_upstream() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();

    let app = Router::new()
        .route("/o/r.git/info/refs", get(advertise))
        .route("/o/r.git/git-upload-pack", post(upload_pack))
        .route(
            "/missing.git/info/refs",
            get(|| async { (StatusCode::NOT_FOUND, "Not Found") }),
        )
        .route("/unavailable", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/pack", get(pack))
        .layer(middleware::from_fn_with_state(recorder.clone(), record));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, recorder)
}

async fn record(State(recorder): State<Recorder>, request: Request<Body>, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    recorder.0.lock().unwrap().push(Recorded {
        method: parts.method.clone(),
        uri: parts.uri.clone(),
        headers: parts.headers.clone(),
        body: body.clone(),
    });
    next.run(Request::from_parts(parts, Body::from(body))).await
}

async fn advertise() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/x-git-upload-pack-advertisement"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::SET_COOKIE, "session=upstream"),
            (HeaderName::from_static("x-github-request-id"), "C0FF:EE"),
            (header::EXPIRES, "Fri, 01 Jan 1980 00:00:00 GMT"),
        ],
        ADVERTISEMENT,
    )
}

async fn upload_pack(body: Bytes) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/x-git-upload-pack-result")],
        body,
    )
}

async fn pack() -> impl IntoResponse {
    let chunks = pack_bytes()
        .chunks(PACK_CHUNK)
        .map(|c| Ok::<_, Infallible>(Bytes::copy_from_slice(c)))
        .collect::<Vec<_>>();
    (
        [(header::CONTENT_TYPE, "application/x-git-packed-objects")],
        Body::from_stream(futures_util::stream::iter(chunks)),
    )
}

/// Start an upstream that answers every connection with the raw bytes
/// `reply`, then either closes or holds the connection open without
/// sending anything more.
pub async fn start_raw_upstream(reply: &'static [u8], hold_open: bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut stream).await;
                let _ = stream.write_all(reply).await;
                let _ = stream.flush().await;
                if hold_open {
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                }
            });
        }
    });
    addr
}

async fn read_request_head(stream: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// Outbound client that sends provider hostnames to the mock upstream.
pub fn upstream_client(upstream: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .resolve("github.com", upstream)
        .resolve("api.github.com", upstream)
        .resolve("gitlab.com", upstream)
        .build()
        .unwrap()
}

/// Token sources with a single configured GitHub token.
pub fn github_token(token: &str) -> TokenSources {
    TokenSources::from_pairs([("GITHUB_TOKEN", Some(token)), ("GH_TOKEN", None)])
}

/// Relay server wired to the mock upstream.
pub fn relay_server(tokens: TokenSources, upstream: SocketAddr) -> HttpServer {
    relay_server_with(ProxyConfig::default(), tokens, upstream)
}

/// Relay server with a custom configuration, wired to the mock upstream.
pub fn relay_server_with(
    mut config: ProxyConfig,
    tokens: TokenSources,
    upstream: SocketAddr,
) -> HttpServer {
    config.listener.bind_address = "127.0.0.1:0".into();
    HttpServer::with_parts(config, tokens, upstream_client(upstream)).unwrap()
}
