//! Request forwarding to the backend origin.
//!
//! # Responsibilities
//! - Answer OPTIONS preflight locally
//! - Buffer inbound bodies for payload-carrying methods
//! - Re-issue the request upstream and buffer the answer
//! - Turn every transport failure into a 500 JSON response
//!
//! # Design Decisions
//! - Body read failures degrade to "no body" instead of failing the request
//! - The size cap applies to inbound bodies only; backend answers are relayed whole
//! - The whole backend exchange runs under one deadline
//! - Status, status text, headers and body bytes are passed back verbatim

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, Request, Response, StatusCode};
use hyper::ext::ReasonPhrase;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ProxySettings;
use crate::observability::metrics;
use crate::proxy::target::UpstreamTarget;
use crate::proxy::types::{carries_body, ProxiedRequest, ProxiedResponse};
use crate::resilience::with_deadline;
use crate::security::headers::{apply_cors, preflight_headers, strip_framing, upstream_request_headers};

/// Failures while talking to the backend.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream target {0}")]
    InvalidTarget(String),

    #[error("could not build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read upstream response body: {0}")]
    ResponseBody(String),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

/// JSON body of a failed proxy exchange.
#[derive(Debug, Serialize)]
pub struct ProxyErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Stateless forwarder; cheap to clone and share.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    target: UpstreamTarget,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(settings: &ProxySettings) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            target: UpstreamTarget::from_settings(settings),
            timeout: Duration::from_secs(settings.upstream_timeout_secs),
            max_body_bytes: settings.max_body_bytes,
        }
    }

    /// Capture an inbound request for forwarding.
    ///
    /// GET and DELETE never forward a body. For other methods the body is
    /// read fully; a read failure (including exceeding the size cap) is
    /// logged and the request continues without a body.
    pub async fn capture(&self, request: Request<Body>, path_suffix: &str) -> ProxiedRequest {
        let (parts, body) = request.into_parts();
        let method = parts.method;

        let body = if carries_body(&method) {
            match axum::body::to_bytes(body, self.max_body_bytes).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(
                        method = %method,
                        path = %path_suffix,
                        error = %e,
                        "Failed to read request body, forwarding without it"
                    );
                    None
                }
            }
        } else {
            None
        };

        ProxiedRequest {
            method,
            path_suffix: path_suffix.trim_start_matches('/').to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        }
    }

    /// Forward `request` and always produce a response.
    pub async fn forward(&self, request: ProxiedRequest) -> Response<Body> {
        let start = Instant::now();
        let method = request.method.clone();

        if method == Method::OPTIONS {
            metrics::record_preflight();
            return preflight_response();
        }

        let path = self.target.path_for(&request.path_suffix);
        tracing::info!(method = %method, path = %path, "Proxying request");

        let response = match with_deadline(self.timeout, self.exchange(request)).await {
            Ok(Ok(proxied)) => {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    status = proxied.status.as_u16(),
                    status_text = %proxied.status_text(),
                    "Upstream answered"
                );
                let mut response = proxied.into_response();
                apply_cors(response.headers_mut());
                response
            }
            Ok(Err(e)) => error_response(&e),
            Err(elapsed) => error_response(&ProxyError::Timeout(elapsed.0)),
        };

        metrics::record_proxy_request(&method, response.status(), start);
        response
    }

    /// One request/response round trip with the backend.
    async fn exchange(&self, request: ProxiedRequest) -> Result<ProxiedResponse, ProxyError> {
        let uri = self
            .target
            .uri_for(&request.path_suffix, request.query.as_deref())?;

        let mut headers = upstream_request_headers(&request.headers);
        let body = match request.body {
            Some(bytes) => Body::from(bytes),
            None => {
                strip_framing(&mut headers);
                Body::empty()
            }
        };

        let mut upstream = Request::builder()
            .method(request.method)
            .uri(uri)
            .body(body)?;
        *upstream.headers_mut() = headers;

        let response = self.client.request(upstream).await?;
        let (mut parts, incoming) = response.into_parts();

        let body: Bytes = axum::body::to_bytes(Body::new(incoming), usize::MAX)
            .await
            .map_err(|e| ProxyError::ResponseBody(e.to_string()))?;

        Ok(ProxiedResponse {
            status: parts.status,
            reason: parts.extensions.remove::<ReasonPhrase>(),
            headers: parts.headers,
            body,
        })
    }
}

/// Local answer to a CORS preflight.
pub fn preflight_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    *response.headers_mut() = preflight_headers();
    response
}

/// 500 answer for a failed exchange.
pub fn error_response(error: &ProxyError) -> Response<Body> {
    tracing::error!(error = %error, "Proxy error");

    let payload = ProxyErrorBody {
        error: "Proxy error",
        message: error.to_string(),
    };
    let body = serde_json::to_vec(&payload).unwrap_or_default();

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response.headers_mut().insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(crate::security::headers::ALLOW_ORIGIN),
    );
    response
}
