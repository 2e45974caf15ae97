//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → headers.rs (allowlist inbound headers, drop Authorization)
//!     → credentials.rs (classify host, inject provider credentials)
//!     → Pass to relay
//!
//! Returned response:
//!     → headers.rs (allowlist upstream headers)
//! ```
//!
//! # Design Decisions
//! - The proxy is the sole authority over outbound Authorization
//! - Fail closed: a provider host without a token is rejected before any I/O
//! - Secrets are never logged

pub mod credentials;
pub mod headers;

pub use credentials::{CredentialInjector, Provider, TokenSources};
