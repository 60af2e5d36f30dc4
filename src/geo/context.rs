//! Request-scoped client context.
//!
//! Runs address extraction, location resolution and user-agent
//! classification for an inbound request and attaches the result to the
//! request extensions, where business handlers pick it up.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::USER_AGENT, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::geo::address::{extract_client_address, AddressSources};
use crate::geo::device::{classify_user_agent, DeviceProfile};
use crate::geo::location::{ClientLocation, GeoLookup, Resolver};

/// Location and device hints for the current caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientContext {
    pub ip: String,
    pub location: ClientLocation,
    pub device: DeviceProfile,
    /// True when the location holds "Unknown" sentinels after a failed lookup.
    pub degraded: bool,
}

impl ClientContext {
    /// Build the context from request parts.
    pub async fn from_parts<L: GeoLookup>(parts: &Parts, resolver: &Resolver<L>) -> Self {
        let ip = extract_client_address(&AddressSources::from_parts(parts));
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let device = classify_user_agent(user_agent);
        let resolution = resolver.resolve(&ip).await;
        let degraded = resolution.is_degraded();

        Self {
            ip,
            location: resolution.into_location(),
            device,
            degraded,
        }
    }
}

/// Middleware inserting a [`ClientContext`] into request extensions.
pub async fn attach_client_context<L>(
    State(resolver): State<Arc<Resolver<L>>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    L: GeoLookup + 'static,
{
    let (mut parts, body) = req.into_parts();
    let context = ClientContext::from_parts(&parts, &*resolver).await;

    tracing::debug!(
        ip = %context.ip,
        country = context.location.country.as_deref().unwrap_or("-"),
        degraded = context.degraded,
        "Client context attached"
    );

    parts.extensions.insert(context);
    next.run(Request::from_parts(parts, body)).await
}
