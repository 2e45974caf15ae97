//! Upstream routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (<mount_path>/{*path}?query)
//!     → axum wildcard capture (percent-decoded)
//!     → target.rs (split, repair scheme, default to https, append query)
//!     → Return: UpstreamTarget or InvalidUpstreamTarget
//! ```
//!
//! # Design Decisions
//! - The upstream is named entirely by the request path, no route table
//! - Deterministic: same path and query always yield the same URL
//! - No regex in hot path (prefix checks only)

pub mod target;

pub use target::{build_upstream_url, split_segments, UpstreamTarget};
