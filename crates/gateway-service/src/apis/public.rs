//! Public endpoints: health, voucher details, contract status.

use crate::server::AppState;
use axum::extract::{Path, State};
use axum::Json;
use gateway_types::{ApiError, ContractStatusResponse, TotalSupplyResponse, VoucherResponse};
use serde_json::{json, Value};

/// Handles `GET /health`.
pub async fn health() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}

/// Handles `GET /api/voucher/{id}`.
///
/// A nonexistent voucher is a 404, not a server error; the "does not exist"
/// revert never escapes as a 500.
pub async fn voucher_details(
	State(state): State<AppState>,
	Path(voucher_id): Path<u64>,
) -> Result<Json<VoucherResponse>, ApiError> {
	let voucher = state
		.ledger
		.voucher(voucher_id)
		.await?
		.ok_or_else(|| ApiError::NotFound("Voucher not found".to_string()))?;
	Ok(Json(VoucherResponse {
		id: voucher.id,
		title: voucher.title,
		description: voucher.description,
		point_cost: voucher.point_cost,
		business_address: voucher.business.to_string(),
		is_active: voucher.is_active,
	}))
}

/// Handles `GET /api/total-supply`.
pub async fn total_supply(
	State(state): State<AppState>,
) -> Result<Json<TotalSupplyResponse>, ApiError> {
	let supply = state.ledger.total_supply().await?;
	Ok(Json(TotalSupplyResponse {
		total_supply: supply.to_string(),
	}))
}

/// Handles `GET /api/contract-status`.
pub async fn contract_status(State(state): State<AppState>) -> Json<ContractStatusResponse> {
	Json(state.ledger.status().await.into_response())
}
