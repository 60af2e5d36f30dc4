//! Client address extraction and private-range classification.
//!
//! Neither function validates address syntax: values taken from headers are
//! passed through as-is and downstream consumers must tolerate garbage.

use std::net::{IpAddr, SocketAddr};

use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::extract::ConnectInfo;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Address used when no source yields anything.
pub const FALLBACK_ADDRESS: &str = "127.0.0.1";

/// Client IP established by an outer layer (e.g. a TLS terminator
/// integration) and stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedClientIp(pub IpAddr);

/// Everything the extractor may look at, in precedence order.
#[derive(Debug, Clone, Copy)]
pub struct AddressSources<'a> {
    pub headers: &'a HeaderMap,
    /// Transport peer of the TCP connection.
    pub peer: Option<SocketAddr>,
    /// Address supplied by the framework or an outer layer.
    pub framework_ip: Option<IpAddr>,
}

impl<'a> AddressSources<'a> {
    /// Gather sources from axum request parts.
    pub fn from_parts(parts: &'a Parts) -> Self {
        Self {
            headers: &parts.headers,
            peer: parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            framework_ip: parts
                .extensions
                .get::<TrustedClientIp>()
                .map(|TrustedClientIp(ip)| *ip),
        }
    }
}

/// Pick the client address, first non-empty source wins:
/// `X-Forwarded-For` (first entry), `X-Real-IP`, transport peer,
/// framework IP, then `127.0.0.1`.
pub fn extract_client_address(sources: &AddressSources<'_>) -> String {
    let header = |name: &str| {
        sources
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header(X_FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header(X_REAL_IP) {
        return real_ip.to_string();
    }

    sources
        .peer
        .map(|addr| addr.ip())
        .or(sources.framework_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| FALLBACK_ADDRESS.to_string())
}

/// Loopback literals and RFC1918 dotted quads.
///
/// IPv6 awareness stops at `::1`; other IPv6 forms are treated as public.
pub fn is_private_address(address: &str) -> bool {
    if matches!(address, "::1" | "127.0.0.1" | "localhost") {
        return true;
    }

    match dotted_quad(address) {
        Some([10, ..]) => true,
        Some([172, second, ..]) => (16..=31).contains(&second),
        Some([192, 168, ..]) => true,
        _ => false,
    }
}

/// Four dot-separated groups of one to three ASCII digits.
///
/// Octets are not range checked, so `10.300.0.1` still parses.
fn dotted_quad(address: &str) -> Option<[u16; 4]> {
    let mut octets = [0u16; 4];
    let mut groups = address.split('.');

    for slot in octets.iter_mut() {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = group.parse().ok()?;
    }

    match groups.next() {
        Some(_) => None,
        None => Some(octets),
    }
}
