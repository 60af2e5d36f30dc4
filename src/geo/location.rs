//! Best-effort location resolution.
//!
//! # Responsibilities
//! - Short-circuit loopback and RFC1918 addresses without any I/O
//! - Perform one bounded lookup for everything else
//! - Degrade to "Unknown" metadata on any lookup failure
//!
//! # Design Decisions
//! - Failures travel inside [`Resolution::Degraded`], never as `Err`
//! - No caching and no retries: one attempt per call
//! - The lookup backend sits behind [`GeoLookup`] so tests can count calls

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::geo::address::is_private_address;
use crate::observability::metrics;
use crate::resilience::with_deadline;

/// Location metadata handed to the auth layer.
///
/// Only `ip` is guaranteed; every other field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientLocation {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
}

impl ClientLocation {
    /// Sentinel location for loopback and private-network addresses.
    pub fn local(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            country: Some("Local".to_string()),
            city: Some("Localhost".to_string()),
            region: Some("Development".to_string()),
            ..Default::default()
        }
    }

    /// Sentinel location used when the lookup failed.
    pub fn unknown(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            country: Some("Unknown".to_string()),
            city: Some("Unknown".to_string()),
            ..Default::default()
        }
    }
}

/// Why a lookup produced no usable data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("lookup service returned status {0}")]
    Status(u16),

    #[error("malformed lookup payload: {0}")]
    Decode(String),

    #[error("lookup service rejected the address: {0}")]
    Rejected(String),

    #[error("lookups are disabled")]
    Disabled,
}

/// An external source of location data for public addresses.
pub trait GeoLookup: Send + Sync {
    /// Look up `ip`. Implementations fill `ClientLocation::ip` with `ip`.
    fn lookup(&self, ip: &str) -> impl Future<Output = Result<ClientLocation, LookupError>> + Send;
}

/// Outcome of [`Resolver::resolve`]; every variant carries a location.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Private or loopback address, no lookup performed.
    Local(ClientLocation),
    /// Data from a successful lookup.
    Enriched(ClientLocation),
    /// Lookup failed; location holds the "Unknown" sentinels.
    Degraded {
        location: ClientLocation,
        reason: LookupError,
    },
}

impl Resolution {
    pub fn location(&self) -> &ClientLocation {
        match self {
            Resolution::Local(location) | Resolution::Enriched(location) => location,
            Resolution::Degraded { location, .. } => location,
        }
    }

    pub fn into_location(self) -> ClientLocation {
        match self {
            Resolution::Local(location) | Resolution::Enriched(location) => location,
            Resolution::Degraded { location, .. } => location,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolution::Degraded { .. })
    }

    /// Short label used in logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Local(_) => "local",
            Resolution::Enriched(_) => "enriched",
            Resolution::Degraded { .. } => "degraded",
        }
    }
}

/// Turns a client address into location metadata.
#[derive(Debug, Clone)]
pub struct Resolver<L> {
    lookup: L,
    deadline: Duration,
}

impl<L: GeoLookup> Resolver<L> {
    pub fn new(lookup: L, deadline: Duration) -> Self {
        Self { lookup, deadline }
    }

    /// Resolve `address`. Never fails.
    pub async fn resolve(&self, address: &str) -> Resolution {
        let resolution = if is_private_address(address) {
            Resolution::Local(ClientLocation::local(address))
        } else {
            match with_deadline(self.deadline, self.lookup.lookup(address)).await {
                Ok(Ok(mut location)) => {
                    location.ip = address.to_string();
                    Resolution::Enriched(location)
                }
                Ok(Err(reason)) => degrade(address, reason),
                Err(elapsed) => degrade(address, LookupError::Timeout(elapsed.0)),
            }
        };

        metrics::record_geo_resolution(resolution.outcome());
        resolution
    }
}

fn degrade(address: &str, reason: LookupError) -> Resolution {
    match reason {
        LookupError::Disabled => tracing::debug!(ip = %address, "Geolocation disabled"),
        _ => tracing::warn!(ip = %address, error = %reason, "Geolocation lookup failed"),
    }
    Resolution::Degraded {
        location: ClientLocation::unknown(address),
        reason,
    }
}
