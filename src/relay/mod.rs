//! Upstream relay subsystem.
//!
//! # Data Flow
//! ```text
//! Wildcard segments + inbound request
//!     → routing::target (absolute upstream URL)
//!     → security::credentials (optional Authorization)
//!     → request.rs (allowlisted headers, user-agent, buffered body)
//!     → engine.rs (send via reqwest, shape response)
//!         2xx   → stream body, content-type/cache-control only
//!         other → upstream status + text/plain error body
//! ```
//!
//! # Design Decisions
//! - Inbound bodies are buffered whole; outbound bodies are streamed
//! - No retries: the Git client owns retry and backoff
//! - Dropping the response body closes the upstream connection

pub mod engine;
pub mod request;

pub use engine::{build_client, shape_response, GitProxy};
pub use request::UpstreamRequest;
