//! Request pipeline tests
//!
//! Drives the api client against a wiremock server: credential injection,
//! content negotiation, response classification, and the 401 teardown.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xfauth::guard::routes;
use xfauth::users::{SEED_PASSWORD, SEED_USERNAME};
use xfauth::{ApiClient, AuthError, Config, SessionManager, Storage};

use common::{memory_session, RecordingNavigator};

fn client_for(
    server: &MockServer,
    session: Arc<SessionManager>,
) -> (ApiClient, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::new());
    let config = Config::builder().server_url(server.uri()).build().unwrap();
    let client = ApiClient::new(&config, session, navigator.clone());
    (client, navigator)
}

#[tokio::test]
async fn authenticated_request_carries_exactly_one_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (_storage, session) = memory_session();
    session.login(SEED_USERNAME, SEED_PASSWORD).await.unwrap();
    let token = session.token().unwrap();

    let (client, _navigator) = client_for(&server, session);
    client.get("/api/data").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let values: Vec<_> = requests[0].headers.get_all("authorization").iter().collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].to_str().unwrap(), format!("Bearer {}", token));
}

#[tokio::test]
async fn unauthenticated_request_carries_no_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (_storage, session) = memory_session();
    let (client, _navigator) = client_for(&server, session);
    client.get("/api/data").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get_all("authorization").iter().count(),
        0
    );
}

#[tokio::test]
async fn post_body_is_json_with_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (_storage, session) = memory_session();
    let (client, _navigator) = client_for(&server, session);
    client
        .post("/api/items", &serde_json::json!({ "name": "thing" }))
        .await
        .unwrap();
}

#[tokio::test]
async fn unauthorized_response_tears_the_session_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (storage, session) = memory_session();
    session.login(SEED_USERNAME, SEED_PASSWORD).await.unwrap();
    let mut rx = session.subscribe();

    let (client, navigator) = client_for(&server, session.clone());
    let err = client.get("/api/data").await.unwrap_err();

    // Caller sees the session-expired error...
    assert_eq!(err, AuthError::SessionExpired);
    // ...the session and its artifacts are gone...
    assert!(!session.is_authenticated());
    assert!(storage.get("auth_token").is_none());
    assert!(storage.get("auth_user").is_none());
    // ...the stream observed the transition...
    rx.changed().await.unwrap();
    assert!(!*rx.borrow_and_update());
    // ...and the shell was redirected to the login view.
    assert_eq!(navigator.visits(), vec![routes::LOGIN.to_string()]);
}

#[tokio::test]
async fn unauthorized_redirect_fires_even_when_the_error_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (_storage, session) = memory_session();
    session.login(SEED_USERNAME, SEED_PASSWORD).await.unwrap();

    let (client, navigator) = client_for(&server, session);
    let _ = client.get("/api/data").await;

    assert_eq!(navigator.visits(), vec![routes::LOGIN.to_string()]);
}

#[tokio::test]
async fn unauthorized_while_signed_out_still_reports_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (_storage, session) = memory_session();
    let (client, navigator) = client_for(&server, session.clone());

    let err = client.get("/api/data").await.unwrap_err();
    assert_eq!(err, AuthError::SessionExpired);
    assert!(!session.is_authenticated());
    assert_eq!(navigator.visits(), vec![routes::LOGIN.to_string()]);
}

#[tokio::test]
async fn non_auth_failures_classify_without_side_effects() {
    let cases = [
        (400, AuthError::validation("request", "Bad request. Please check your input.")),
        (403, AuthError::Permission),
        (404, AuthError::NotFound),
        (409, AuthError::conflict("Conflict. The resource already exists.")),
        (500, AuthError::Server { status: 500 }),
        (503, AuthError::Server { status: 503 }),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let (_storage, session) = memory_session();
        session.login(SEED_USERNAME, SEED_PASSWORD).await.unwrap();

        let (client, navigator) = client_for(&server, session.clone());
        let err = client.get("/api/data").await.unwrap_err();

        assert_eq!(err, expected, "status {}", status);
        assert!(session.is_authenticated(), "status {} must not log out", status);
        assert!(navigator.visits().is_empty(), "status {} must not redirect", status);
    }
}

#[tokio::test]
async fn unmapped_status_becomes_generic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;

    let (_storage, session) = memory_session();
    let (client, _navigator) = client_for(&server, session);

    let err = client.get("/api/data").await.unwrap_err();
    assert_matches!(err, AuthError::Generic { status: 418, .. });
}

#[tokio::test]
async fn success_passes_the_response_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .mount(&server)
        .await;

    let (_storage, session) = memory_session();
    let (client, _navigator) = client_for(&server, session);

    let response = client.get("/api/data").await.unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
}
