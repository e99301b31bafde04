//! Tests for the HTTP client module

use super::*;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_none());
    assert_eq!(
        config.default_headers.get("Accept"),
        Some(&"application/json".to_string())
    );
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .rate_limit(RateLimiterConfig::per_second(2))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::per_second(2)));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");

    let client = HttpClient::with_config(config).unwrap();
    assert!(client.has_rate_limiter());
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page", "1")
        .header("X-Request-Id", "abc123")
        .headers([("Authorization", "Bearer t")])
        .json(serde_json::json!({"key": "value"}));

    assert_eq!(config.query.get("page"), Some(&"1".to_string()));
    assert_eq!(
        config.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert_eq!(
        config.headers.get("Authorization"),
        Some(&"Bearer t".to_string())
    );
    assert!(config.body.is_some());
}

#[tokio::test]
async fn test_get_json_sends_accept_and_custom_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(header("Accept", "application/json"))
        .and(header("X-Request-Id", "req-456"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": 42
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let data = client
        .get_json(
            "/api/data",
            RequestConfig::new()
                .header("X-Request-Id", "req-456")
                .query("page", "2"),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(data["value"], 42);
}

#[tokio::test]
async fn test_get_json_empty_body_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let data = client
        .get_json("/api/empty", RequestConfig::new())
        .await
        .unwrap();
    assert!(data.is_none());
}

#[tokio::test]
async fn test_http_error_carries_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get_json("/api/broken", RequestConfig::new())
        .await
        .unwrap_err();

    match err {
        crate::Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_absolute_url_bypasses_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("http://unused.invalid")
        .build();
    let client = HttpClient::with_config(config).unwrap();
    let response = client
        .post(
            &format!("{}/items", mock_server.uri()),
            serde_json::json!({"name": "x"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_post_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/datasets/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "abc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let form = reqwest::multipart::Form::new().text("schema", "[]");
    let response = client.post_multipart("/datasets/abc", form).await.unwrap();
    assert_eq!(response.status(), 200);

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(body.contains("name=\"schema\""));
}
