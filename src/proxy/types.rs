//! Per-request proxy values. Built for one exchange and dropped after the
//! response is written.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Response, StatusCode};
use hyper::ext::ReasonPhrase;

/// An inbound request, ready to be re-issued upstream.
#[derive(Debug, Clone)]
pub struct ProxiedRequest {
    pub method: Method,
    /// Path below the ingress prefix, without a leading slash.
    pub path_suffix: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// `None` for GET/DELETE and when the inbound body could not be read.
    pub body: Option<Bytes>,
}

/// A fully buffered backend answer.
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    /// Non-canonical status text sent by the backend, if any.
    pub reason: Option<ReasonPhrase>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxiedResponse {
    /// Status text as the client will see it.
    pub fn status_text(&self) -> String {
        match &self.reason {
            Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
            None => self.status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if let Some(reason) = self.reason {
            response.extensions_mut().insert(reason);
        }
        response
    }
}

/// Whether the method's body is forwarded.
pub fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::DELETE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_with_body() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::DELETE));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PUT));
        assert!(carries_body(&Method::PATCH));
    }

    #[test]
    fn test_status_text() {
        let canonical = ProxiedResponse {
            status: StatusCode::NOT_FOUND,
            reason: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert_eq!(canonical.status_text(), "Not Found");

        let custom = ProxiedResponse {
            reason: Some(ReasonPhrase::from_static(b"No Such Wallet")),
            ..canonical
        };
        assert_eq!(custom.status_text(), "No Such Wallet");
        let response = custom.into_response();
        assert!(response.extensions().get::<ReasonPhrase>().is_some());
    }
}
