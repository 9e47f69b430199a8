//! Accounts API Service
//!
//! This service handles the four ledger operations, composing the input
//! normalizer, the filter builder and the relational store. It is the only
//! path between the transport layer and the table: every record is
//! normalized and validated here before anything is written.

use std::{collections::HashSet, future::Future, pin::Pin, task::Poll};

use tower::Service;
#[cfg(feature = "rolodex_tracing")]
use tracing::{debug, info};

use crate::accounts::{
    api::{AccountsRequest, AccountsResponse, RawAccount},
    error::AccountsError,
    normalize::{normalize_name, normalize_phone, normalize_tag},
    store::{AccountStore, CleanAccount},
};

/// Normalizes a batch and drops the invalid and duplicated candidates.
///
/// Candidates whose normalized name or phone is empty are removed, then the
/// survivors are de-duplicated by normalized phone, first occurrence in
/// input order winning. The dedup is batch-local only; stored rows are not
/// consulted, so a phone already present in the table can be inserted again.
fn clean_batch(accounts: Vec<RawAccount>) -> Vec<CleanAccount> {
    let mut seen_phones = HashSet::new();
    accounts
        .into_iter()
        .filter_map(|raw| {
            let name = normalize_name(&raw.name);
            let phone = normalize_phone(&raw.phone);
            if name.is_empty() || phone.is_empty() {
                return None;
            }
            seen_phones.insert(phone.clone()).then_some(CleanAccount { name, phone })
        })
        .collect()
}

/// Accounts API service.
///
/// Cloned into each request handler; the clones share the store's connection
/// pool and nothing else.
#[derive(Debug, Clone)]
pub struct AccountsApiService {
    /// Relational store holding the accounts table
    store: AccountStore,
    /// Hard cap on rows returned by a single listing
    list_cap: u32,
}

impl AccountsApiService {
    /// Creates a new accounts service over the provided store.
    pub fn new(store: AccountStore) -> Self {
        Self { store, list_cap: crate::accounts::DEFAULT_LIST_CAP }
    }

    /// Sets the listing row cap.
    pub fn with_list_cap(self, list_cap: u32) -> Self {
        Self { list_cap, ..self }
    }
}

impl Service<AccountsRequest> for AccountsApiService {
    type Response = AccountsResponse;
    type Error = AccountsError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: AccountsRequest) -> Self::Future {
        let store = self.store.clone();
        let list_cap = self.list_cap;
        Box::pin(async move {
            match request {
                AccountsRequest::List { filter } => {
                    #[cfg(feature = "rolodex_tracing")]
                    info!("[accounts] List: filter: {:?}, cap: {}", filter, list_cap);
                    let rows = store.list(&filter, list_cap).await?;
                    Ok(AccountsResponse::Listing(rows))
                }
                AccountsRequest::Create { caller, account } => {
                    #[cfg(feature = "rolodex_tracing")]
                    info!("[accounts] Create: caller: {}", caller.uid);
                    let name = normalize_name(&account.name);
                    if name.is_empty() {
                        return Err(AccountsError::InvalidName);
                    }
                    let phone = normalize_phone(&account.phone);
                    if phone.is_empty() {
                        return Err(AccountsError::InvalidPhone);
                    }
                    let id = store.insert_one(&caller, &CleanAccount { name, phone }).await?;
                    Ok(AccountsResponse::Created(id))
                }
                AccountsRequest::CreateBulk { caller, accounts } => {
                    #[cfg(feature = "rolodex_tracing")]
                    info!(
                        "[accounts] CreateBulk: caller: {}, candidates: {}",
                        caller.uid,
                        accounts.len()
                    );
                    if accounts.is_empty() {
                        return Err(AccountsError::EmptyBatch);
                    }
                    let cleaned = clean_batch(accounts);
                    if cleaned.is_empty() {
                        return Err(AccountsError::NoValidAccounts);
                    }
                    let ids = store.insert_batch(&caller, &cleaned).await?;
                    Ok(AccountsResponse::BulkSaved { saved: ids.len() as u64, ids })
                }
                AccountsRequest::UpdateTag { id, tag } => {
                    let tag = normalize_tag(&tag);
                    let _affected = store.update_tag(id, &tag).await?;
                    // Zero affected rows (unknown id) is still reported as
                    // success; callers cannot tell the two outcomes apart.
                    #[cfg(feature = "rolodex_tracing")]
                    debug!("[accounts] UpdateTag: id: {}, affected: {}", id, _affected);
                    Ok(AccountsResponse::Ack)
                }
            }
        })
    }
}
