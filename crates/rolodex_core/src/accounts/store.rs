//! Relational store for account rows.
//!
//! [`AccountStore`] owns the pooled connection set and implements the four
//! row operations plus the idempotent schema setup that runs at startup.
//! There is no other in-process shared state; any atomicity the service
//! relies on comes from the store executing each statement as a whole. In
//! particular the bulk insert is a single multi-row `INSERT`, so either the
//! whole batch commits or none of it does.
//!
//! Rows are never deleted, and no field other than `tag` is ever updated.

use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool};

use crate::accounts::{
    api::{AccountRecord, Caller},
    error::AccountsError,
    filter::ListFilter,
};

/// A normalized, validated account ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanAccount {
    /// Non-empty normalized display name
    pub name: String,
    /// Exactly 10 decimal digits
    pub phone: String,
}

/// Store facade over the pooled connections.
#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the accounts table and its indexes if they do not exist yet.
    ///
    /// Safe to run on every startup; existing data is untouched.
    pub async fn init_schema(&self) -> Result<(), AccountsError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                tag TEXT NOT NULL DEFAULT '',
                created_by_uid TEXT NOT NULL,
                created_by_email TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_accounts_created_at ON accounts (created_at DESC)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_phone ON accounts (phone)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts one account and returns its assigned identifier.
    pub async fn insert_one(
        &self,
        caller: &Caller,
        account: &CleanAccount,
    ) -> Result<i64, AccountsError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO accounts (name, phone, tag, created_by_uid, created_by_email, created_at)
             VALUES (?, ?, '', ?, ?, ?) RETURNING id",
        )
        .bind(&account.name)
        .bind(&account.phone)
        .bind(&caller.uid)
        .bind(&caller.email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Inserts a batch of accounts as one multi-row statement.
    ///
    /// All rows share the caller's identity and a single creation timestamp.
    /// Returns the assigned identifiers in input order. The statement either
    /// commits as a whole or fails as a whole; partial application cannot
    /// happen.
    pub async fn insert_batch(
        &self,
        caller: &Caller,
        accounts: &[CleanAccount],
    ) -> Result<Vec<i64>, AccountsError> {
        let created_at = Utc::now();
        let mut qb = QueryBuilder::new(
            "INSERT INTO accounts (name, phone, tag, created_by_uid, created_by_email, created_at) ",
        );
        qb.push_values(accounts, |mut row, account| {
            row.push_bind(&account.name)
                .push_bind(&account.phone)
                .push_bind("")
                .push_bind(&caller.uid)
                .push_bind(&caller.email)
                .push_bind(created_at);
        });
        qb.push(" RETURNING id");
        let ids = qb.build_query_scalar::<i64>().fetch_all(&self.pool).await?;
        Ok(ids)
    }

    /// Lists accounts matching the filter, most recent first, at most `cap` rows.
    ///
    /// The id tiebreaker keeps same-second rows in insertion order.
    pub async fn list(
        &self,
        filter: &ListFilter,
        cap: u32,
    ) -> Result<Vec<AccountRecord>, AccountsError> {
        let mut qb = QueryBuilder::new(
            "SELECT id, name, phone, tag, created_by_uid, created_by_email, created_at
             FROM accounts",
        );
        filter.apply(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(i64::from(cap));
        let rows = qb.build_query_as::<AccountRecord>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Sets the tag of the matching row, returning the number of rows affected.
    ///
    /// Zero affected rows means the id did not match anything; the caller
    /// decides what to make of that (the API reports it as success).
    pub async fn update_tag(&self, id: i64, tag: &str) -> Result<u64, AccountsError> {
        let result = sqlx::query("UPDATE accounts SET tag = ? WHERE id = ?")
            .bind(tag)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Total row count, used by the integration tests to assert no mutation.
    pub async fn count(&self) -> Result<i64, AccountsError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
