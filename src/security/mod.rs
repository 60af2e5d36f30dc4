//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request:
//!     → headers.rs (copy inbound headers, drop Host)
//!     → backend
//! Proxied response:
//!     → headers.rs (copy backend headers, overwrite CORS)
//!     → client
//! ```
//!
//! # Design Decisions
//! - The edge never inspects or rewrites credentials
//! - Cross-origin policy is decided here, not by the backend

pub mod headers;
