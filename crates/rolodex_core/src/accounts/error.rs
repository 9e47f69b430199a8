use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("Accounts error, internal service error")]
    Internal,

    #[error("Accounts error, missing bearer token")]
    MissingToken,

    #[error("Accounts error, token verification failed: {0}")]
    InvalidToken(String),

    #[error("Accounts error, name is empty after normalization")]
    InvalidName,

    #[error("Accounts error, phone has fewer than 10 digits")]
    InvalidPhone,

    #[error("Accounts error, no accounts provided")]
    EmptyBatch,

    #[error("Accounts error, no valid accounts after cleaning")]
    NoValidAccounts,

    #[error("Accounts error, malformed request body: {0}")]
    BadBody(String),

    #[error("Accounts error, store failure: {0}")]
    Store(#[from] sqlx::Error),
}

impl AccountsError {
    /// Whether the error is a caller-side validation failure (HTTP 400)
    /// as opposed to an auth failure (401) or a store failure (500).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AccountsError::InvalidName
                | AccountsError::InvalidPhone
                | AccountsError::EmptyBatch
                | AccountsError::NoValidAccounts
                | AccountsError::BadBody(_)
        )
    }

    /// Whether the error is an authentication failure (HTTP 401).
    pub fn is_auth(&self) -> bool {
        matches!(self, AccountsError::MissingToken | AccountsError::InvalidToken(_))
    }
}
