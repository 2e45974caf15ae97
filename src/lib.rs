//! Git smart-HTTP relay library.
//!
//! Relays Git-over-HTTP traffic from browser-hosted Git clients to hosting
//! providers, injecting provider credentials server-side.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
