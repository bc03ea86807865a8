//! Bearer attachment and 401 handling through the real middleware stack


use chat_client::{AuthEvent, ChatBackend, ClientError, CredentialStore, Page};
use futures::future::join_all;
use serde_json::json;
use test_utils::{client_for, MockResponseBuilder};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_attaches_stored_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/sessions"))
        .and(header("authorization", "Bearer stored-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sessions": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_for(&server, Some("stored-token"));
    let sessions = client
        .list_sessions(Page::sessions())
        .await
        .expect("list should succeed");
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_no_header_without_credential() {
    let server = MockServer::start().await;

    Mock::given(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/student/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_for(&server, None);
    let documents = client
        .list_documents(Page::documents())
        .await
        .expect("anonymous request should reach the fallback mock");
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_unauthorized_clears_credential_and_raises_event() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/sessions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Token expired" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_for(&server, Some("expired"));
    let mut events = client.auth_events().subscribe();

    let result = client.list_sessions(Page::sessions()).await;

    assert_eq!(result, Err(ClientError::Unauthorized));
    assert!(store.token().is_none());
    assert!(store.user().is_none());
    assert_eq!(events.try_recv().expect("event"), AuthEvent::LoginRequired);
}

#[tokio::test]
async fn test_concurrent_unauthorized_raise_single_event() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;

    let (client, store) = client_for(&server, Some("expired"));
    let mut events = client.auth_events().subscribe();

    let results = join_all((0..3).map(|_| client.list_sessions(Page::sessions()))).await;

    assert!(results
        .iter()
        .all(|result| result == &Err(ClientError::Unauthorized)));
    assert!(store.token().is_none());

    assert_eq!(events.try_recv().expect("first event"), AuthEvent::LoginRequired);
    assert!(events.try_recv().is_err(), "redirect must be raised once");
}

#[tokio::test]
async fn test_unauthorized_across_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (client, _store) = client_for(&server, Some("expired"));
    let mut events = client.auth_events().subscribe();

    let (documents, history) = tokio::join!(
        client.list_documents(Page::documents()),
        client.chat_history("s1", Page::history()),
    );

    assert_eq!(documents, Err(ClientError::Unauthorized));
    assert_eq!(history, Err(ClientError::Unauthorized));
    assert_eq!(events.try_recv().expect("event"), AuthEvent::LoginRequired);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_unauthorized_on_login_also_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid Firebase token" })),
        )
        .mount(&server)
        .await;

    let (client, _store) = client_for(&server, None);
    let result = client.login("bad-id-token").await;

    assert_eq!(result.map(|_| ()), Err(ClientError::Unauthorized));
    assert!(client.auth_events().is_redirecting());
}

#[tokio::test]
async fn test_login_stores_credential_and_rearms_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockResponseBuilder::login("fresh")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chat/sessions"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sessions": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_for(&server, None);
    client.auth_events().login_required();
    assert!(client.auth_events().is_redirecting());

    let auth = client.login("firebase-id-token").await.expect("login");

    assert_eq!(auth.session_token, "fresh");
    assert_eq!(store.token().as_deref(), Some("fresh"));
    assert_eq!(client.cached_user().map(|u| u.email), Some("ada@example.edu".to_string()));
    assert!(!client.auth_events().is_redirecting());

    client
        .list_sessions(Page::sessions())
        .await
        .expect("new token should be attached");
}

#[tokio::test]
async fn test_logout_is_local_and_idempotent() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server, Some("t"));

    client.logout().expect("first logout");
    client.logout().expect("second logout");

    assert!(store.token().is_none());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_refresh_replaces_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "new" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_for(&server, Some("old"));
    let token = client.refresh().await.expect("refresh");

    assert_eq!(token, "new");
    assert_eq!(store.token().as_deref(), Some("new"));
}
