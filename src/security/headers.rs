//! Header manipulation for proxied traffic.
//!
//! # Responsibilities
//! - Copy inbound request headers for the backend, dropping `Host`
//! - Copy backend response headers, then force the CORS policy on top
//! - Build the preflight header set
//!
//! # Design Decisions
//! - Copy and overwrite are separate passes so CORS values always win
//! - Credentials (`Authorization`, cookies) are copied untouched

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CONTENT_LENGTH, HOST, TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, HeaderValue};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
/// Preflight cache lifetime, one day.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// Headers to send upstream: every inbound header except `Host`,
/// multi-valued headers kept in order.
pub fn upstream_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound.iter() {
        if name == HOST {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Drop body framing headers when no body will be sent.
pub fn strip_framing(headers: &mut HeaderMap) {
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);
}

/// Overwrite the CORS headers, whatever the backend sent.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
}

/// CORS headers plus the max-age directive for preflight answers.
pub fn preflight_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    apply_cors(&mut headers);
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_MAX_AGE));
    headers
}
