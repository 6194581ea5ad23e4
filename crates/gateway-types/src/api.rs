//! HTTP API payloads and the gateway error taxonomy.
//!
//! Every endpoint's request and response body lives here, together with
//! [`ApiError`], the single error type handlers return. The wire field names
//! (`pointCost`, `businessAddress`, ...) match what the frontend consumes.

use crate::auth::Role;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Structured API error with its HTTP status mapping.
///
/// Validation and authorization failures are produced before any remote call
/// is attempted; ledger failures are translated into the most specific
/// variant available at the handler boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
	/// Missing or malformed input (400)
	#[error("{0}")]
	Validation(String),
	/// Bad credentials or token (401)
	#[error("{0}")]
	Auth(String),
	/// Authenticated but wrong role or not permitted (403)
	#[error("{0}")]
	Forbidden(String),
	/// Duplicate registration, locally or on chain (409)
	#[error("{0}")]
	Conflict(String),
	/// Entity absent, locally or on chain (404)
	#[error("{0}")]
	NotFound(String),
	/// A dependent contract binding is not initialized (503)
	#[error("{0}")]
	Unavailable(String),
	/// Transaction mined but reverted; the reason is passed through (500)
	#[error("{0}")]
	Revert(String),
	/// Catch-all (500)
	#[error("{0}")]
	Internal(String),
}

impl ApiError {
	/// HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::Validation(_) => 400,
			ApiError::Auth(_) => 401,
			ApiError::Forbidden(_) => 403,
			ApiError::NotFound(_) => 404,
			ApiError::Conflict(_) => 409,
			ApiError::Unavailable(_) => 503,
			ApiError::Revert(_) | ApiError::Internal(_) => 500,
		}
	}
}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(json!({ "message": self.to_string() }))).into_response()
	}
}

/// Request payload for customer and business registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
	pub username: String,
	pub password: String,
	/// On-chain account address of the principal.
	pub address: String,
	/// Display name, required for businesses.
	pub name: Option<String>,
}

/// Request payload for login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
	pub username: String,
	pub password: String,
	pub role: String,
}

/// Response payload for a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
	pub token: String,
	pub role: Role,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}

/// Generic message envelope.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
	pub message: String,
}

impl MessageResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// One-shot admin password response.
#[derive(Debug, Clone, Serialize)]
pub struct AdminPasswordResponse {
	pub password: String,
}

/// Registered business as listed for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessSummary {
	pub username: String,
	pub address: String,
	pub name: String,
	/// On-chain approval status; false when the registry is unreachable.
	pub approved: bool,
}

/// Request payload for on-chain business approval.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveBusinessRequest {
	pub address: String,
}

/// Request payload for admin-side on-chain business registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterBusinessRequest {
	pub address: String,
	pub name: String,
}

/// Request payload for minting loyalty points.
#[derive(Debug, Clone, Deserialize)]
pub struct MintRequest {
	pub address: String,
	pub amount: u64,
}

/// Response for a confirmed state-changing transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TxResponse {
	pub message: String,
	#[serde(rename = "txHash")]
	pub tx_hash: String,
	#[serde(rename = "blockNumber")]
	pub block_number: u64,
}

/// Request payload for voucher creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVoucherRequest {
	pub title: String,
	pub description: String,
	#[serde(rename = "pointCost")]
	pub point_cost: u64,
}

/// Response for a confirmed voucher creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateVoucherResponse {
	pub message: String,
	#[serde(rename = "txHash")]
	pub tx_hash: String,
	#[serde(rename = "voucherId")]
	pub voucher_id: u64,
}

/// Voucher details as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct VoucherResponse {
	pub id: u64,
	pub title: String,
	pub description: String,
	#[serde(rename = "pointCost")]
	pub point_cost: u64,
	#[serde(rename = "businessAddress")]
	pub business_address: String,
	#[serde(rename = "isActive")]
	pub is_active: bool,
}

/// Token balance for a customer account.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
	/// Decimal string; balances are remote-owned U256 values.
	pub balance: String,
}

/// Total minted point supply.
#[derive(Debug, Clone, Serialize)]
pub struct TotalSupplyResponse {
	/// Decimal string; the supply is a remote-owned U256 value.
	#[serde(rename = "totalSupply")]
	pub total_supply: String,
}

/// A redemption record as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionResponse {
	pub id: u64,
	#[serde(rename = "voucherId")]
	pub voucher_id: u64,
	pub redeemer: String,
	pub timestamp: u64,
	pub fulfilled: bool,
}

/// Per-contract binding status for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ContractBindingStatus {
	pub address: Option<String>,
	pub initialized: bool,
}

/// Response for the public contract-status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ContractStatusResponse {
	#[serde(rename = "blockchainConnected")]
	pub blockchain_connected: bool,
	pub token: ContractBindingStatus,
	pub registry: ContractBindingStatus,
	pub voucher: ContractBindingStatus,
	pub factory: ContractBindingStatus,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_codes_follow_the_taxonomy() {
		assert_eq!(ApiError::Validation("x".into()).status_code(), 400);
		assert_eq!(ApiError::Auth("x".into()).status_code(), 401);
		assert_eq!(ApiError::Forbidden("x".into()).status_code(), 403);
		assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
		assert_eq!(ApiError::Conflict("x".into()).status_code(), 409);
		assert_eq!(ApiError::Unavailable("x".into()).status_code(), 503);
		assert_eq!(ApiError::Revert("x".into()).status_code(), 500);
		assert_eq!(ApiError::Internal("x".into()).status_code(), 500);
	}

	#[test]
	fn voucher_response_uses_frontend_field_names() {
		let voucher = VoucherResponse {
			id: 1,
			title: "10% off".into(),
			description: "Ten percent off".into(),
			point_cost: 50,
			business_address: "0x0000000000000000000000000000000000000001".into(),
			is_active: true,
		};
		let value = serde_json::to_value(&voucher).unwrap();
		assert_eq!(value["pointCost"], 50);
		assert_eq!(value["isActive"], true);
		assert!(value.get("businessAddress").is_some());
	}

	#[test]
	fn login_response_omits_missing_address() {
		let response = LoginResponse {
			token: "t".into(),
			role: Role::Admin,
			address: None,
		};
		let value = serde_json::to_value(&response).unwrap();
		assert!(value.get("address").is_none());
		assert_eq!(value["role"], "admin");
	}
}
