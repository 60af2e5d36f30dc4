//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call (geolocation lookup or backend exchange):
//!     → timeouts.rs (enforce a hard deadline)
//!     → On expiry: caller degrades (resolver) or answers 500 (proxy)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Single best-effort attempt, no retries at this layer

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineExceeded};
