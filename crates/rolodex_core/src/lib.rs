//! A shared account ledger behind an authenticated HTTP API.
//!
//! This crate implements a minimal record-keeping service: authenticated
//! callers append and list account records (name, phone, tag, creator) in a
//! single relational table, with filtered listing and tag updates. Token
//! verification is delegated to an external identity service and persistence
//! to a relational store; both are treated as opaque collaborators.
//!
//! The HTTP surface relies on [`axum`], with the domain logic composed as
//! [`tower`] services so the identity verifier can be swapped between the
//! real outbound HTTP client and a static map for tests.
//!
//! [`axum`]: https://docs.rs/axum
//! [`tower`]: https://docs.rs/tower

#[cfg(test)]
pub mod tests;

pub mod accounts;
pub mod transport;

#[cfg(feature = "rolodex_tracing")]
pub mod rolodex_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for the server and for tests.
    /// This sets up a tracing subscriber that will display logs during test execution.
    /// Call this at the beginning of tests that need to see tracing output.
    pub fn init() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("off"))
                .unwrap();

            fmt()
                .with_target(false)
                .with_test_writer()
                .with_env_filter(filter)
                .init();
        });
    }
}
