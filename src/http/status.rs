//! Edge-local endpoints under `/edge`.

use axum::{Extension, Json};
use serde::Serialize;

use crate::geo::ClientContext;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn get_health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// The caller's location and device hints, as seen by the edge.
pub async fn get_client(Extension(context): Extension<ClientContext>) -> Json<ClientContext> {
    Json(context)
}
