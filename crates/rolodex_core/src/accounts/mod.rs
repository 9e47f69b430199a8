//! Accounts module.
//!
//! This module contains the whole domain layer of the ledger: request and
//! response vocabulary, input normalization, filtered-query construction,
//! the relational store, and the API service that composes them.
//!
//! ## Request Flow
//!
//! The transport layer authenticates the caller, builds an
//! [`api::AccountsRequest`], and drives [`service::AccountsApiService`]
//! through its `tower::Service` implementation. The service normalizes and
//! validates inputs before touching the store, so invalid records are
//! rejected without a round-trip.
//!
//! ## Components
//!
//! - **Normalizer**: canonicalizes free-text name, phone and tag inputs;
//!   the empty string is the invalid sentinel, checked by callers.
//! - **Filter builder**: folds the optional listing parameters into bound
//!   predicates of a parameterized query, AND-composed only.
//! - **Store**: idempotent schema setup and the four row operations; the
//!   bulk insert is a single multi-row statement so the batch commits or
//!   fails as a whole.
//! - **API service**: one `tower::Service` handling the four operations,
//!   cloneable across concurrent requests.

pub mod api;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod service;
pub mod store;

use sqlx::SqlitePool;

/// Default hard cap on rows returned by a single listing request.
pub const DEFAULT_LIST_CAP: u32 = 2000;

/// Initialize the accounts service stack against an already-connected pool.
///
/// Runs the idempotent schema setup and returns a ready-to-serve
/// [`service::AccountsApiService`]. This is the standard initialization
/// path for both the server binary and the integration tests.
///
/// # Arguments
/// * `pool` - Connected store pool, shared across concurrent requests
/// * `list_cap` - Hard cap on listing results (None for the default)
pub async fn init_service(
    pool: SqlitePool,
    list_cap: Option<u32>,
) -> Result<service::AccountsApiService, error::AccountsError> {
    let store = store::AccountStore::new(pool);
    store.init_schema().await?;
    Ok(service::AccountsApiService::new(store)
        .with_list_cap(list_cap.unwrap_or(DEFAULT_LIST_CAP)))
}
