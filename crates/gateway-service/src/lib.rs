//! HTTP API service for the loyalty gateway.
//!
//! Wires the credential store, the session token service, and the remote
//! ledger client into an axum router with role-scoped authentication.

pub mod apis;
pub mod auth;
pub mod server;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{router, start_server, AppState};
