//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that origins are usable URLs
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: scheme '{scheme}' is not supported (expected {expected})")]
    UnsupportedScheme {
        field: &'static str,
        scheme: String,
        expected: &'static str,
    },

    #[error("{field}: '{value}' must start with '/'")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("timeouts.request_secs ({outer}s) must exceed {field} ({inner}s)")]
    DeadlineOrder {
        field: &'static str,
        inner: u64,
        outer: u64,
    },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_url(
        &mut errors,
        "proxy.backend_origin",
        &config.proxy.backend_origin,
        &["http"],
        "http",
    );
    check_url(
        &mut errors,
        "geolocation.base_url",
        &config.geolocation.base_url,
        &["http", "https"],
        "http or https",
    );

    check_prefix(&mut errors, "proxy.ingress_prefix", &config.proxy.ingress_prefix);
    check_prefix(&mut errors, "proxy.api_root", &config.proxy.api_root);

    let non_zero = [
        ("proxy.upstream_timeout_secs", config.proxy.upstream_timeout_secs),
        ("proxy.max_body_bytes", config.proxy.max_body_bytes as u64),
        ("geolocation.timeout_secs", config.geolocation.timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    // The inbound deadline must not pre-empt the proxy and lookup deadlines.
    let outer = config.timeouts.request_secs;
    let nested = [
        ("proxy.upstream_timeout_secs", config.proxy.upstream_timeout_secs),
        ("geolocation.timeout_secs", config.geolocation.timeout_secs),
    ];
    for (field, inner) in nested {
        if outer != 0 && outer <= inner {
            errors.push(ValidationError::DeadlineOrder { field, inner, outer });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    schemes: &[&str],
    expected: &'static str,
) {
    match Url::parse(value) {
        Ok(url) if !schemes.contains(&url.scheme()) => {
            errors.push(ValidationError::UnsupportedScheme {
                field,
                scheme: url.scheme().to_string(),
                expected,
            });
        }
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.to_string(),
            });
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

fn check_prefix(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix {
            field,
            value: value.to_string(),
        });
    }
}
