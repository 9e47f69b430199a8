//! HTTP transport implementation.
//!
//! This module owns the wire surface of the ledger: the axum router, the
//! per-route handlers, and the conversion of [`AccountsError`] into HTTP
//! status codes with JSON error bodies.
//!
//! ## Routes
//!
//! - `GET /` — unauthenticated liveness probe
//! - `GET /accounts` — filtered listing (`tag`, `createdBy`, `date`, `q`)
//! - `POST /accounts` — create one account
//! - `POST /accounts/bulk` — create a cleaned, de-duplicated batch
//! - `PATCH /accounts/:id/tag` — update a single account's tag
//!
//! ## Authentication
//!
//! Every `/accounts*` handler authenticates the `Authorization: Bearer`
//! header against the configured verifier before reading the body, so an
//! unauthenticated request is answered 401 regardless of its payload and
//! never reaches the store.
//!
//! ## Body handling
//!
//! Bodies are read as raw bytes and parsed after authentication. The bulk
//! payload is deliberately lenient: a missing or non-list `accounts` field
//! is treated as an empty batch, and non-string name/phone values are folded
//! to empty text so normalization drops them.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tower::{Service, ServiceExt};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{
    accounts::{
        api::{AccountsRequest, AccountsResponse, Caller, RawAccount},
        error::AccountsError,
        filter::ListFilter,
        service::AccountsApiService,
    },
    transport::identity::VerifyToken,
};

/// Default port for the HTTP surface.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default request body limit, in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Wire-level options applied around the router.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Allowed cross-origin request source; no CORS layer when absent
    pub cors_origin: Option<HeaderValue>,
    /// Request body limit in bytes
    pub body_limit: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { cors_origin: None, body_limit: DEFAULT_BODY_LIMIT }
    }
}

/// Shared per-process dependencies, cloned into each handler.
#[derive(Debug, Clone)]
pub struct AppState<V> {
    accounts: AccountsApiService,
    verifier: V,
}

/// Converts accounts errors to HTTP responses for wire transmission.
///
/// Auth failures map to 401 (with a `details` string echoing the verifier
/// failure for invalid tokens), validation failures to 400, everything else
/// to 500. The body is always a JSON object with an `error` message.
impl IntoResponse for AccountsError {
    fn into_response(self) -> Response {
        let status = if self.is_auth() {
            StatusCode::UNAUTHORIZED
        } else if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = match &self {
            AccountsError::MissingToken => json!({ "error": "Missing Authorization header" }),
            AccountsError::InvalidToken(details) => {
                json!({ "error": "Invalid token", "details": details })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the application router around an accounts service and a verifier.
pub fn router<V>(accounts: AccountsApiService, verifier: V, options: ServerOptions) -> Router
where
    V: Service<VerifyToken, Response = Caller, Error = AccountsError>
        + Clone
        + Send
        + Sync
        + 'static,
    V::Future: Send,
{
    let state = AppState { accounts, verifier };
    let mut app = Router::new()
        .route("/", get(liveness))
        .route("/accounts", get(list_accounts::<V>).post(create_account::<V>))
        .route("/accounts/bulk", post(create_accounts_bulk::<V>))
        .route("/accounts/:id/tag", patch(update_tag::<V>))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(options.body_limit))
        .layer(TraceLayer::new_for_http());
    if let Some(origin) = options.cors_origin {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        );
    }
    app
}

/// Verifies the bearer token of the request, yielding the caller identity.
async fn authenticate<V>(verifier: &V, headers: &HeaderMap) -> Result<Caller, AccountsError>
where
    V: Service<VerifyToken, Response = Caller, Error = AccountsError> + Clone,
{
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AccountsError::MissingToken)?;
    let token = header.strip_prefix("Bearer ").ok_or(AccountsError::MissingToken)?;
    if token.is_empty() {
        return Err(AccountsError::MissingToken);
    }
    let mut verifier = verifier.clone();
    verifier.ready().await?.call(VerifyToken(token.to_string())).await
}

/// Drives the accounts service with one request.
async fn call_accounts<V>(
    state: &AppState<V>,
    request: AccountsRequest,
) -> Result<AccountsResponse, AccountsError> {
    let mut accounts = state.accounts.clone();
    accounts.ready().await?.call(request).await
}

/// Parses a JSON body after authentication; an empty body becomes the
/// type's default so auth failures always win over body failures.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AccountsError> {
    if body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AccountsError::BadBody(e.to_string()))
}

async fn liveness() -> &'static str {
    "rolodex is alive"
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    tag: Option<String>,
    created_by: Option<String>,
    date: Option<String>,
    q: Option<String>,
}

async fn list_accounts<V>(
    State(state): State<AppState<V>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Value>, AccountsError>
where
    V: Service<VerifyToken, Response = Caller, Error = AccountsError> + Clone,
{
    authenticate(&state.verifier, &headers).await?;
    let filter = ListFilter {
        tag: params.tag,
        created_by: params.created_by,
        date: params.date,
        q: params.q,
    };
    match call_accounts(&state, AccountsRequest::List { filter }).await? {
        AccountsResponse::Listing(accounts) => Ok(Json(json!({ "accounts": accounts }))),
        _ => Err(AccountsError::Internal),
    }
}

async fn create_account<V>(
    State(state): State<AppState<V>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AccountsError>
where
    V: Service<VerifyToken, Response = Caller, Error = AccountsError> + Clone,
{
    let caller = authenticate(&state.verifier, &headers).await?;
    let account: RawAccount = parse_body(&body)?;
    match call_accounts(&state, AccountsRequest::Create { caller, account }).await? {
        AccountsResponse::Created(id) => Ok(Json(json!({ "ok": true, "id": id }))),
        _ => Err(AccountsError::Internal),
    }
}

#[derive(Debug, Default, Deserialize)]
struct BulkBody {
    #[serde(default)]
    accounts: Value,
}

/// Coerces the `accounts` field into candidates: non-list values mean an
/// empty batch, and non-object items become empty candidates that the
/// cleaning step drops.
fn coerce_candidates(value: Value) -> Vec<RawAccount> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

async fn create_accounts_bulk<V>(
    State(state): State<AppState<V>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AccountsError>
where
    V: Service<VerifyToken, Response = Caller, Error = AccountsError> + Clone,
{
    let caller = authenticate(&state.verifier, &headers).await?;
    let body: BulkBody = parse_body(&body)?;
    let accounts = coerce_candidates(body.accounts);
    match call_accounts(&state, AccountsRequest::CreateBulk { caller, accounts }).await? {
        AccountsResponse::BulkSaved { saved, ids } => {
            Ok(Json(json!({ "ok": true, "saved": saved, "ids": ids })))
        }
        _ => Err(AccountsError::Internal),
    }
}

#[derive(Debug, Default, Deserialize)]
struct TagBody {
    #[serde(default, deserialize_with = "crate::accounts::api::lenient_string")]
    tag: String,
}

async fn update_tag<V>(
    State(state): State<AppState<V>>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AccountsError>
where
    V: Service<VerifyToken, Response = Caller, Error = AccountsError> + Clone,
{
    authenticate(&state.verifier, &headers).await?;
    let body: TagBody = parse_body(&body)?;
    // An unparseable id matches no row, which gets the same silent no-op
    // treatment as an unknown numeric id.
    let Ok(id) = raw_id.parse::<i64>() else {
        return Ok(Json(json!({ "ok": true })));
    };
    match call_accounts(&state, AccountsRequest::UpdateTag { id, tag: body.tag }).await? {
        AccountsResponse::Ack => Ok(Json(json!({ "ok": true }))),
        _ => Err(AccountsError::Internal),
    }
}
