//! Unit tests for the request gateway: header injection, error mapping,
//! and an end-to-end pass over the reqwest transport against a local
//! mock server.

use std::sync::Arc;

use serde_json::json;

use crate::api::{Msg, PortalApi};
use crate::error::ClientError;
use crate::gateway::{RequestGateway, TOKEN_HEADER};
use crate::http_client::mock::MockHttpClient;
use crate::http_client::ReqwestHttpClient;
use crate::session::SessionManager;
use crate::store::{MemorySessionStore, SessionStore};

const ORIGIN: &str = "http://portal.test";

fn gateway_with(mock: MockHttpClient) -> (RequestGateway, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let gateway = RequestGateway::new(
        ORIGIN,
        Arc::new(mock),
        Arc::clone(&store) as Arc<dyn SessionStore>,
    );
    (gateway, store)
}

#[tokio::test]
async fn signed_request_carries_token_header() {
    let mock = MockHttpClient::new();
    mock.mock_json(format!("{ORIGIN}/quick"), 200, &json!({ "msg": "It was quick!" }))
        .unwrap();
    let (gateway, store) = gateway_with(mock.clone());
    store.set("abc").await.unwrap();

    let msg: Msg = gateway.get("/quick").await.unwrap();
    assert_eq!(msg.msg, "It was quick!");

    let request = mock.last_request().unwrap();
    assert_eq!(request.headers.get(TOKEN_HEADER).unwrap(), "abc");
}

#[tokio::test]
async fn unsigned_request_has_no_token_header() {
    let mock = MockHttpClient::new();
    mock.mock_json(format!("{ORIGIN}/quick"), 200, &json!({ "msg": "It was quick!" }))
        .unwrap();
    let (gateway, _store) = gateway_with(mock.clone());

    let _msg: Msg = gateway.get("/quick").await.unwrap();

    let request = mock.last_request().unwrap();
    assert!(!request.headers.contains_key(TOKEN_HEADER));
}

#[tokio::test]
async fn token_is_reread_for_every_request() {
    let mock = MockHttpClient::new();
    mock.mock_json(format!("{ORIGIN}/quick"), 200, &json!({ "msg": "ok" }))
        .unwrap();
    let (gateway, store) = gateway_with(mock.clone());

    // First request before any login: unsigned
    let _: Msg = gateway.get("/quick").await.unwrap();
    // A token learned later is applied without rebuilding the gateway
    store.set("fresh").await.unwrap();
    let _: Msg = gateway.get("/quick").await.unwrap();
    store.clear().await.unwrap();
    let _: Msg = gateway.get("/quick").await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert!(!requests[0].headers.contains_key(TOKEN_HEADER));
    assert_eq!(requests[1].headers.get(TOKEN_HEADER).unwrap(), "fresh");
    assert!(!requests[2].headers.contains_key(TOKEN_HEADER));
}

#[tokio::test]
async fn trailing_slash_on_origin_is_normalized() {
    let mock = MockHttpClient::new();
    mock.mock_json(format!("{ORIGIN}/quick"), 200, &json!({ "msg": "ok" }))
        .unwrap();
    let store = Arc::new(MemorySessionStore::new());
    let gateway = RequestGateway::new(
        format!("{ORIGIN}/"),
        Arc::new(mock.clone()),
        store as Arc<dyn SessionStore>,
    );

    let _: Msg = gateway.get("/quick").await.unwrap();
    assert_eq!(mock.last_request().unwrap().url, format!("{ORIGIN}/quick"));
}

#[tokio::test]
async fn unauthorized_response_maps_to_auth_rejected() {
    let mock = MockHttpClient::new();
    mock.mock_json(
        format!("{ORIGIN}/quick"),
        401,
        &json!({ "message": "Token missing or invalid" }),
    )
    .unwrap();
    let (gateway, _store) = gateway_with(mock);

    let err = gateway.get::<Msg>("/quick").await.unwrap_err();
    match err {
        ClientError::AuthRejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token missing or invalid");
        }
        other => panic!("expected AuthRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_request_failed() {
    let mock = MockHttpClient::new();
    mock.mock_response(format!("{ORIGIN}/quick"), 500, "boom");
    let (gateway, _store) = gateway_with(mock);

    let err = gateway.get::<Msg>("/quick").await.unwrap_err();
    match err {
        ClientError::RequestFailed { status, message } => {
            assert_eq!(status, 500);
            // Undecodable error body falls back to the raw text
            assert_eq!(message, "boom");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_success_body_maps_to_invalid_response() {
    let mock = MockHttpClient::new();
    mock.mock_response(format!("{ORIGIN}/quick"), 200, "not json");
    let (gateway, _store) = gateway_with(mock);

    let err = gateway.get::<Msg>("/quick").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}

#[tokio::test]
async fn reqwest_transport_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    let quick = server
        .mock("GET", "/quick")
        .match_header(TOKEN_HEADER, "abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"msg":"It was quick!"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store.set("abc").await.unwrap();
    let gateway = RequestGateway::new(
        server.url(),
        Arc::new(ReqwestHttpClient::new()),
        Arc::clone(&store) as Arc<dyn SessionStore>,
    );

    let msg: Msg = gateway.get("/quick").await.unwrap();
    assert_eq!(msg.msg, "It was quick!");
    quick.assert_async().await;
}

#[tokio::test]
async fn login_flow_end_to_end_over_reqwest() {
    let mut server = mockito::Server::new_async().await;

    let login = server
        .mock("POST", "/login")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"username":"Admin","token":"abc"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let gateway = RequestGateway::new(
        server.url(),
        Arc::new(ReqwestHttpClient::new()),
        Arc::clone(&store) as Arc<dyn SessionStore>,
    );
    let api = Arc::new(PortalApi::new(gateway));
    let manager = SessionManager::new(
        api,
        Arc::clone(&store) as Arc<dyn SessionStore>,
        16,
    );
    let mut status = manager.subscribe().await;

    manager.login("admin", "admin").await.unwrap();

    assert_eq!(status.try_recv(), Some(true));
    assert_eq!(store.get().await.unwrap(), "abc");
    login.assert_async().await;
}
