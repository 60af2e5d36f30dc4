//! Transparent reverse proxy.
//!
//! # Data Flow
//! ```text
//! ANY {ingress_prefix}/{*path}
//!     → forwarder.rs (OPTIONS answered locally with 204)
//!     → forwarder.rs capture (buffer body unless GET/DELETE)
//!     → security/headers.rs (copy headers, drop Host)
//!     → target.rs ({backend_origin}{api_root}/{path}?{query})
//!     → backend origin
//!     → security/headers.rs (copy response headers, overwrite CORS)
//!     → client
//! ```
//!
//! # Design Decisions
//! - No shared mutable state; each exchange is independent
//! - Every failure becomes a well-formed 500 JSON response
//! - No caching and no retries

pub mod forwarder;
pub mod target;
pub mod types;

pub use forwarder::{error_response, preflight_response, Forwarder, ProxyError, ProxyErrorBody};
pub use target::UpstreamTarget;
pub use types::{ProxiedRequest, ProxiedResponse};
