//! Wire-facing adapters: the HTTP server surface and the outbound identity
//! verifier clients.
//!
//! The domain layer never sees HTTP types; everything here translates
//! between the wire and [`crate::accounts`]. Verifiers are `tower::Service`
//! implementations so the server can run against the real identity provider
//! or against a static token map with the same wiring.

pub mod http;
pub mod identity;
