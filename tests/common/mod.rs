//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use edge_gateway::config::EdgeConfig;
use edge_gateway::http::HttpServer;
use edge_gateway::lifecycle::Shutdown;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A running edge gateway.
pub struct Edge {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl Edge {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Edge {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the edge on an ephemeral port.
pub async fn start_edge(config: EdgeConfig) -> Edge {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Edge { addr, shutdown }
}

/// Send a bare HTTP/1.1 GET and return the status line as written on the wire.
pub async fn raw_status_line(addr: SocketAddr, path: &str) -> String {
    let mut socket = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    socket.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw);
    text.lines().next().unwrap_or_default().to_string()
}

/// HTTP client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// An address with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Backend that describes the request it received as JSON.
///
/// Any path ending in `/missing` answers 404 with its own CORS origin.
/// Any path ending in `/large` answers with [`LARGE_BODY_LEN`] bytes.
pub async fn start_echo_backend() -> SocketAddr {
    serve(Router::new().route("/{*path}", any(echo))).await
}

pub const LARGE_BODY_LEN: usize = 2048;

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    if uri.path().ends_with("/large") {
        return ([("x-backend", "echo")], vec![b'x'; LARGE_BODY_LEN]).into_response();
    }

    if uri.path().ends_with("/missing") {
        return (
            StatusCode::NOT_FOUND,
            [
                ("content-type", "application/json"),
                ("x-backend", "echo"),
                ("access-control-allow-origin", "https://backend.example"),
            ],
            r#"{"error":"not found","code":404}"#,
        )
            .into_response();
    }

    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    (
        [("x-backend", "echo")],
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "headers": headers,
            "body": String::from_utf8_lossy(&body),
        })),
    )
        .into_response()
}

/// Raw TCP backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            held.push(socket);
        }
    });

    addr
}

/// Raw TCP backend writing a fixed response, for non-canonical status lines.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Mock geolocation service answering `/{ip}/json/` with `payload`.
pub struct GeoService {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicUsize>,
}

impl GeoService {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct GeoState {
    calls: Arc<AtomicUsize>,
    status: StatusCode,
    payload: Value,
}

pub async fn start_geo_service(status: StatusCode, payload: Value) -> GeoService {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = GeoState {
        calls: calls.clone(),
        status,
        payload,
    };

    let router = Router::new()
        .route("/{ip}/json/", get(geo_lookup))
        .with_state(state);

    GeoService {
        addr: serve(router).await,
        calls,
    }
}

async fn geo_lookup(State(state): State<GeoState>, Path(ip): Path<String>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let mut payload = state.payload.clone();
    if let Some(fields) = payload.as_object_mut() {
        fields.insert("ip".into(), Value::String(ip));
    }
    (state.status, Json(payload)).into_response()
}
