//! Identity verifier clients.
//!
//! Token verification is delegated to an external identity provider; this
//! module provides the two client implementations behind the same
//! `tower::Service<VerifyToken>` seam:
//!
//! - **HttpIdentityVerifier**: production client that POSTs the bearer token
//!   to the provider's verification endpoint, authenticated by a service
//!   credential loaded at startup.
//! - **StaticTokenVerifier**: fixed token map for tests and local runs.
//!
//! Every verifier failure, including an unreachable provider, surfaces as
//! `InvalidToken` with a details string; the transport layer renders those
//! as 401 responses. Nothing is retried.

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc, task::Poll};

use serde::Deserialize;
use tower::Service;

use crate::accounts::{api::Caller, error::AccountsError};

/// A bearer token to verify, as extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct VerifyToken(pub String);

/// Identity payload returned by the verification endpoint.
#[derive(Debug, Deserialize)]
struct VerifiedIdentity {
    uid: String,
    #[serde(default)]
    email: Option<String>,
}

/// Outbound HTTP client for the external identity provider.
///
/// The underlying `reqwest::Client` pools connections, so concurrent
/// requests reuse the same sockets to the provider. The service credential
/// is opaque to this crate; it is parsed at startup only to fail fast on
/// malformed configuration and then forwarded verbatim with each
/// verification call.
#[derive(Debug, Clone)]
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    verify_url: String,
    credential: Arc<serde_json::Value>,
}

impl HttpIdentityVerifier {
    pub fn new(verify_url: impl Into<String>, credential: serde_json::Value) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url: verify_url.into(),
            credential: Arc::new(credential),
        }
    }
}

impl Service<VerifyToken> for HttpIdentityVerifier {
    type Response = Caller;
    type Error = AccountsError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, VerifyToken(token): VerifyToken) -> Self::Future {
        let client = self.client.clone();
        let verify_url = self.verify_url.clone();
        let credential = self.credential.clone();
        Box::pin(async move {
            let response = client
                .post(&verify_url)
                .json(&serde_json::json!({ "token": token, "credential": credential.as_ref() }))
                .send()
                .await
                .map_err(|e| {
                    AccountsError::InvalidToken(format!("identity service unreachable: {e}"))
                })?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AccountsError::InvalidToken(format!(
                    "verification rejected ({status}): {body}"
                )));
            }
            let identity: VerifiedIdentity = response.json().await.map_err(|e| {
                AccountsError::InvalidToken(format!("malformed identity response: {e}"))
            })?;
            Ok(Caller::new(identity.uid, identity.email))
        })
    }
}

/// Fixed token-to-identity map, for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: Arc<HashMap<String, Caller>>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, Caller>) -> Self {
        Self { tokens: Arc::new(tokens) }
    }
}

impl Service<VerifyToken> for StaticTokenVerifier {
    type Response = Caller;
    type Error = AccountsError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, VerifyToken(token): VerifyToken) -> Self::Future {
        let caller = self.tokens.get(&token).cloned();
        Box::pin(async move {
            caller.ok_or_else(|| AccountsError::InvalidToken("unknown token".to_string()))
        })
    }
}
