//! Client fingerprinting and geolocation.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → address.rs (X-Forwarded-For → X-Real-IP → peer → framework → 127.0.0.1)
//!     → location.rs (private check, else one bounded lookup via ipapi.rs)
//!     → device.rs (ordered user-agent rules)
//!     → context.rs (ClientContext in request extensions)
//!     → business/auth handlers
//! ```
//!
//! # Design Decisions
//! - Enrichment is best-effort: lookup failures degrade, never error
//! - Stateless per call, no caches
//! - Malformed input is treated as missing data, not rejected

pub mod address;
pub mod context;
pub mod device;
pub mod ipapi;
pub mod location;

pub use address::{extract_client_address, is_private_address, AddressSources, TrustedClientIp};
pub use context::{attach_client_context, ClientContext};
pub use device::{classify_user_agent, Browser, DeviceKind, DeviceProfile, Os};
pub use ipapi::IpApiClient;
pub use location::{ClientLocation, GeoLookup, LookupError, Resolution, Resolver};
