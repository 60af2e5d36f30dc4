//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → {ingress_prefix}/* → proxy::Forwarder → backend origin
//!     → /edge/client → geo::attach_client_context → status.rs
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod status;

pub use request::{MakeEdgeRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
