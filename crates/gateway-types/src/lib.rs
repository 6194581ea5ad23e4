//! Shared types for the loyalty gateway.
//!
//! This crate defines the types used across the gateway: principal roles and
//! JWT claims, the HTTP request/response payloads, and the API error taxonomy
//! with its HTTP status mapping.

pub mod api;
pub mod auth;

pub use api::*;
pub use auth::*;

use alloy_primitives::Address;

/// Parses a hex Ethereum address from client input.
///
/// Returns a validation error suitable for a 400 response when the input is
/// not a well-formed 20-byte hex address.
pub fn parse_address(input: &str) -> Result<Address, ApiError> {
	input
		.trim()
		.parse::<Address>()
		.map_err(|_| ApiError::Validation(format!("Invalid address: {}", input)))
}
