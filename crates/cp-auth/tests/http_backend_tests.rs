//! Tests for the HTTP backend client against a mock server

use cp_auth::backend::{AuthBackend, HttpAuthBackend, EXCHANGE_FAILED};
use cp_types::AppError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_authorization_url_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/twitch/url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://id.twitch.tv/oauth2/authorize?client_id=test"
        })))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    let url = backend.authorization_url().await.unwrap();

    assert_eq!(url, "https://id.twitch.tv/oauth2/authorize?client_id=test");
}

#[tokio::test]
async fn test_authorization_url_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/twitch/url"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    let err = backend.authorization_url().await.unwrap_err();

    assert!(matches!(err, AppError::Backend(_)));
}

#[tokio::test]
async fn test_exchange_code_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/twitch/callback"))
        .and(query_param("code", "XYZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "userId": "42",
            "success": true
        })))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    let user = backend.exchange_code("XYZ").await.unwrap();

    assert_eq!(user.user_id, "42");
    assert!(user.success);
}

#[tokio::test]
async fn test_exchange_code_is_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/twitch/callback"))
        .and(query_param("code", "a+b/c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "userId": "42"
        })))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    let user = backend.exchange_code("a+b/c").await.unwrap();

    assert_eq!(user.user_id, "42");
}

#[tokio::test]
async fn test_exchange_error_body_collapses_to_generic_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/twitch/callback"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Invalid authorization code"
        })))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    let err = backend.exchange_code("BAD").await.unwrap_err();

    // Structured error bodies and transport failures surface the same way.
    assert_eq!(err.to_string(), format!("Backend error: {}", EXCHANGE_FAILED));
}

#[tokio::test]
async fn test_exchange_malformed_body_collapses_to_generic_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/twitch/callback"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    let err = backend.exchange_code("XYZ").await.unwrap_err();

    assert_eq!(err.to_string(), format!("Backend error: {}", EXCHANGE_FAILED));
}

#[tokio::test]
async fn test_exchange_unreachable_backend_collapses_to_generic_reason() {
    // Nothing is listening on this port.
    let backend = HttpAuthBackend::new("http://127.0.0.1:9");
    let err = backend.exchange_code("XYZ").await.unwrap_err();

    assert_eq!(err.to_string(), format!("Backend error: {}", EXCHANGE_FAILED));
}

#[tokio::test]
async fn test_auth_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/twitch/status/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "authenticated": true
        })))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    assert!(backend.auth_status("42").await.unwrap());
}

#[tokio::test]
async fn test_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/twitch/logout/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true
        })))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    assert!(backend.logout("42").await.is_ok());
}

#[tokio::test]
async fn test_logout_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/twitch/logout/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(server.uri());
    assert!(backend.logout("42").await.is_err());
}
