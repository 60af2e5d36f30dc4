//! Edge gateway library: client fingerprinting, geolocation and a
//! transparent reverse proxy in front of a private backend.

pub mod config;
pub mod geo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod security;

pub use config::schema::EdgeConfig;
pub use geo::{ClientContext, ClientLocation, DeviceProfile, Resolution, Resolver};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::Forwarder;
