//! Accounts API type definitions.
//!
//! This module defines the request and response vocabulary for the accounts
//! service, plus the wire-facing record types. The transport layer
//! authenticates the caller, shapes the body into an [`AccountsRequest`] and
//! drives the API service through its `tower::Service` implementation.
//!
//! Operations:
//! 1. List stored accounts through an optional filter
//! 2. Create a single account
//! 3. Create a batch of accounts in one statement
//! 4. Update the tag of an existing account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::filter::ListFilter;

/// Identity of an authenticated caller, as reported by the verifier.
///
/// Captured on each created row; never consulted again afterwards (the
/// authorization model is flat, not row-level).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Stable identifier assigned by the identity provider
    pub uid: String,
    /// Email address, when the provider reports one
    pub email: Option<String>,
}

impl Caller {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self { uid: uid.into(), email }
    }
}

/// Raw name/phone candidate as received on the wire, before normalization.
///
/// Non-string JSON values deserialize as empty text, so a malformed
/// candidate is dropped by normalization rather than failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAccount {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
}

/// Deserializes any JSON value, keeping strings and mapping everything else
/// to the empty string (the normalizer's invalid sentinel).
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

/// A stored account row, as returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub tag: String,
    pub created_by_uid: String,
    pub created_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Accounts service request types.
#[derive(Debug, Clone)]
pub enum AccountsRequest {
    /// List stored accounts matching the filter, most recent first,
    /// bounded by the configured row cap.
    List { filter: ListFilter },

    /// Normalize and persist a single account.
    ///
    /// Fails with a validation error when either field normalizes to empty;
    /// nothing is written in that case.
    Create { caller: Caller, account: RawAccount },

    /// Normalize, clean and persist a batch of accounts as one statement.
    ///
    /// Candidates with an empty normalized name or phone are dropped, then
    /// the survivors are de-duplicated by normalized phone (first occurrence
    /// in input order wins, within this batch only). An empty outcome fails
    /// the whole request.
    CreateBulk { caller: Caller, accounts: Vec<RawAccount> },

    /// Set the tag of an existing account to the normalized value.
    ///
    /// An unknown id is a silent no-op still reported as success; callers
    /// cannot distinguish "updated" from "not found".
    UpdateTag { id: i64, tag: String },
}

/// Accounts service response types, one per request variant.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountsResponse {
    /// Matching rows, most recent first
    Listing(Vec<AccountRecord>),
    /// Identifier assigned to the created row
    Created(i64),
    /// Rows saved by the bulk insert and their assigned identifiers
    BulkSaved { saved: u64, ids: Vec<i64> },
    /// Positive acknowledgment with no payload (tag update)
    Ack,
}
