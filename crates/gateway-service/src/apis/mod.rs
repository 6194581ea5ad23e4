//! HTTP endpoint handlers, grouped by role.

pub mod admin;
pub mod business;
pub mod customer;
pub mod public;
pub mod register;

use alloy_primitives::Address;
use gateway_types::{ApiError, Claims};

/// Acting on-chain address, taken from the verified token claims.
pub(crate) fn claims_address(claims: &Claims) -> Result<Address, ApiError> {
	claims
		.address
		.parse::<Address>()
		.map_err(|_| ApiError::Internal("Token carries a malformed address".to_string()))
}
