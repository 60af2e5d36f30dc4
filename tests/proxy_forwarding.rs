//! End-to-end tests for the transparent proxy.

use std::net::SocketAddr;

use edge_gateway::config::EdgeConfig;
use edge_gateway::http::HttpServer;
use reqwest::StatusCode;
use serde_json::Value;

mod common;

fn config_for(backend: SocketAddr) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.proxy.backend_origin = format!("http://{}", backend);
    config.geolocation.enabled = false;
    config
}

fn assert_cors(headers: &reqwest::header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, PATCH, OPTIONS"
    );
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");
}

#[tokio::test]
async fn test_preflight_answered_without_backend() {
    let edge = common::start_edge(config_for(common::unused_addr().await)).await;

    let res = common::client()
        .request(reqwest::Method::OPTIONS, edge.url("/api/auth/login"))
        .header("origin", "https://app.example")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .expect("Edge unreachable");

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_cors(res.headers());
    assert_eq!(res.headers()["access-control-max-age"], "86400");
    assert!(res.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_forwarded_under_api_root() {
    let backend = common::start_echo_backend().await;
    let edge = common::start_edge(config_for(backend)).await;

    let res = common::client()
        .get(edge.url("/api/users/7?expand=roles"))
        .header("authorization", "Bearer token-123")
        .header("x-custom", "kept")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_cors(res.headers());
    assert_eq!(res.headers()["x-backend"], "echo");
    assert!(res.headers().contains_key("x-request-id"));

    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "GET");
    assert_eq!(seen["path"], "/api/users/7");
    assert_eq!(seen["query"], "expand=roles");
    assert_eq!(seen["headers"]["authorization"], "Bearer token-123");
    assert_eq!(seen["headers"]["x-custom"], "kept");
    assert!(seen["headers"]["x-request-id"].is_string());
}

#[tokio::test]
async fn test_host_header_not_forwarded() {
    let backend = common::start_echo_backend().await;
    let edge = common::start_edge(config_for(backend)).await;

    let res = common::client()
        .get(edge.url("/api/whoami"))
        .header("host", "edge.example.com")
        .send()
        .await
        .unwrap();

    let seen: Value = res.json().await.unwrap();
    let host = seen["headers"]["host"].as_str().unwrap();
    assert_ne!(host, "edge.example.com");
    assert_eq!(host, backend.to_string());
}

#[tokio::test]
async fn test_post_body_forwarded_verbatim() {
    let backend = common::start_echo_backend().await;
    let edge = common::start_edge(config_for(backend)).await;
    let payload = r#"{"email":"a@b.example","password":"hunter2"}"#;

    let res = common::client()
        .post(edge.url("/api/auth/login"))
        .header("content-type", "application/json")
        .body(payload)
        .send()
        .await
        .unwrap();

    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "POST");
    assert_eq!(seen["body"], payload);
    assert_eq!(seen["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn test_delete_sends_no_body() {
    let backend = common::start_echo_backend().await;
    let edge = common::start_edge(config_for(backend)).await;

    let res = common::client()
        .delete(edge.url("/api/sessions/42"))
        .body("should not arrive")
        .send()
        .await
        .unwrap();

    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "DELETE");
    assert_eq!(seen["body"], "");
}

#[tokio::test]
async fn test_backend_error_passed_through() {
    let backend = common::start_echo_backend().await;
    let edge = common::start_edge(config_for(backend)).await;

    let res = common::client()
        .get(edge.url("/api/wallets/missing"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_cors(res.headers());
    assert_eq!(res.headers()["x-backend"], "echo");
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(
        res.bytes().await.unwrap().as_ref(),
        br#"{"error":"not found","code":404}"#
    );
}

#[tokio::test]
async fn test_non_canonical_status_passed_through() {
    let backend = common::start_raw_backend(
        "HTTP/1.1 451 Blocked By Geofence\r\nContent-Length: 7\r\nX-Backend: raw\r\nConnection: close\r\n\r\nblocked",
    )
    .await;
    let edge = common::start_edge(config_for(backend)).await;

    let res = common::client().get(edge.url("/api/region")).send().await.unwrap();

    assert_eq!(res.status().as_u16(), 451);
    assert_eq!(res.headers()["x-backend"], "raw");
    assert_cors(res.headers());
    assert_eq!(res.text().await.unwrap(), "blocked");

    let status_line = common::raw_status_line(edge.addr, "/api/region").await;
    assert_eq!(status_line, "HTTP/1.1 451 Blocked By Geofence");
}

#[tokio::test]
async fn test_response_larger_than_request_cap_relayed() {
    let backend = common::start_echo_backend().await;
    let mut config = config_for(backend);
    config.proxy.max_body_bytes = 1024;
    let edge = common::start_edge(config).await;

    let res = common::client().get(edge.url("/api/export/large")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-backend"], "echo");
    assert_cors(res.headers());
    let body = res.bytes().await.unwrap();
    assert_eq!(body.len(), common::LARGE_BODY_LEN);
    assert!(body.iter().all(|b| *b == b'x'));
}

#[tokio::test]
async fn test_request_deadline_not_above_upstream_deadline_refused() {
    let backend = common::start_silent_backend().await;
    let mut config = config_for(backend);
    config.timeouts.request_secs = 1;
    config.proxy.upstream_timeout_secs = 5;

    let err = HttpServer::new(config).err().expect("server must refuse the config");
    assert!(err.to_string().contains("proxy.upstream_timeout_secs"));
}

#[tokio::test]
async fn test_unreachable_backend_is_500_json() {
    let edge = common::start_edge(config_for(common::unused_addr().await)).await;

    let res = common::client()
        .put(edge.url("/api/profile"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["content-type"], "application/json");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Proxy error");
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_silent_backend_times_out_as_500() {
    let backend = common::start_silent_backend().await;
    let mut config = config_for(backend);
    config.proxy.upstream_timeout_secs = 1;
    let edge = common::start_edge(config).await;

    let res = common::client().get(edge.url("/api/slow")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Proxy error");
    assert!(body["message"].as_str().unwrap().contains("did not answer"));
}

#[tokio::test]
async fn test_custom_api_root() {
    let backend = common::start_echo_backend().await;
    let mut config = config_for(backend);
    config.proxy.api_root = "/api/v1".into();
    let edge = common::start_edge(config).await;

    let res = common::client().get(edge.url("/api/health")).send().await.unwrap();

    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["path"], "/api/v1/health");
}
