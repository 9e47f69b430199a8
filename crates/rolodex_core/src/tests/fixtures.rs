use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use crate::{
    accounts::{
        api::Caller,
        service::AccountsApiService,
        store::{AccountStore, CleanAccount},
    },
    transport::{
        http::{ServerOptions, router},
        identity::StaticTokenVerifier,
    },
};

pub(super) const ALICE_TOKEN: &str = "token-alice";
pub(super) const BOB_TOKEN: &str = "token-bob";

pub(super) fn alice() -> Caller {
    Caller::new("uid-alice", Some("alice@example.com".to_string()))
}

pub(super) fn bob() -> Caller {
    Caller::new("uid-bob", Some("bob@corp.test".to_string()))
}

pub(super) fn clean(name: &str, phone: &str) -> CleanAccount {
    CleanAccount { name: name.to_string(), phone: phone.to_string() }
}

/// In-memory store with the schema applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub(super) async fn memory_store() -> AccountStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory store");
    let store = AccountStore::new(pool);
    store.init_schema().await.expect("schema setup");
    store
}

/// Accounts service plus a store handle sharing the same pool.
pub(super) async fn memory_service() -> (AccountsApiService, AccountStore) {
    let store = memory_store().await;
    (AccountsApiService::new(store.clone()), store)
}

pub(super) fn static_verifier() -> StaticTokenVerifier {
    StaticTokenVerifier::new(HashMap::from([
        (ALICE_TOKEN.to_string(), alice()),
        (BOB_TOKEN.to_string(), bob()),
    ]))
}

/// Application router over an in-memory store with explicit wire options.
pub(super) async fn test_router_with(options: ServerOptions) -> (Router, AccountStore) {
    let (service, store) = memory_service().await;
    (router(service, static_verifier(), options), store)
}

/// Full application router over an in-memory store, plus the store handle.
pub(super) async fn test_router() -> (Router, AccountStore) {
    test_router_with(ServerOptions::default()).await
}

/// Builds a JSON request; `token` is attached as a bearer header when given.
pub(super) fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("serialize body"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("build request")
}

/// Sends one request through a clone of the router and decodes the JSON body.
///
/// Non-JSON bodies (the liveness probe) come back as a JSON string value.
pub(super) async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("collect body").to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
