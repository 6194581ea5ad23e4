//! Customer endpoints: balance, voucher discovery, redemption.

use crate::apis::claims_address;
use crate::server::AppState;
use alloy_primitives::U256;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use gateway_ledger::{Ledger, LedgerError, VoucherInfo};
use gateway_types::{
	ApiError, BalanceResponse, Claims, RedemptionResponse, TxResponse, VoucherResponse,
};

/// Upper bound of the sequential voucher scan.
///
/// The ledger exposes no enumerable voucher index, so discovery walks ids
/// from 1 and treats the first nonexistent id as end-of-range. Vouchers
/// beyond the bound are invisible; a known gap carried over from the
/// reference behavior.
pub const VOUCHER_SCAN_LIMIT: u64 = 100;

/// Walks voucher ids sequentially and collects the active ones.
pub(crate) async fn scan_active_vouchers(
	ledger: &dyn Ledger,
) -> Result<Vec<VoucherInfo>, LedgerError> {
	let mut found = Vec::new();
	for id in 1..=VOUCHER_SCAN_LIMIT {
		match ledger.voucher(id).await? {
			Some(voucher) => {
				if voucher.is_active {
					found.push(voucher);
				}
			},
			// First missing id ends the range
			None => break,
		}
	}
	Ok(found)
}

/// Handles `GET /api/customer/balance`.
pub async fn balance(
	State(state): State<AppState>,
	Extension(claims): Extension<Claims>,
) -> Result<Json<BalanceResponse>, ApiError> {
	let address = claims_address(&claims)?;
	let balance = state.ledger.balance_of(address).await?;
	Ok(Json(BalanceResponse {
		balance: balance.to_string(),
	}))
}

/// Handles `GET /api/customer/available-vouchers`.
pub async fn available_vouchers(
	State(state): State<AppState>,
	Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<VoucherResponse>>, ApiError> {
	let vouchers = scan_active_vouchers(state.ledger.as_ref())
		.await?
		.into_iter()
		.map(|v| VoucherResponse {
			id: v.id,
			title: v.title,
			description: v.description,
			point_cost: v.point_cost,
			business_address: v.business.to_string(),
			is_active: v.is_active,
		})
		.collect();
	Ok(Json(vouchers))
}

/// Handles `POST /api/customer/redeem-voucher/{id}`.
///
/// The balance check runs before the submission: an underfunded redemption
/// is rejected as a client error with no transaction side effect.
pub async fn redeem_voucher(
	State(state): State<AppState>,
	Extension(claims): Extension<Claims>,
	Path(voucher_id): Path<u64>,
) -> Result<Json<TxResponse>, ApiError> {
	let address = claims_address(&claims)?;
	let voucher = state
		.ledger
		.voucher(voucher_id)
		.await?
		.ok_or_else(|| ApiError::NotFound("Voucher does not exist".to_string()))?;
	if !voucher.is_active {
		return Err(ApiError::Validation("Voucher is not active".to_string()));
	}

	let balance = state.ledger.balance_of(address).await?;
	if balance < U256::from(voucher.point_cost) {
		return Err(ApiError::Validation(format!(
			"Insufficient balance: voucher costs {} points",
			voucher.point_cost
		)));
	}

	let outcome = state.ledger.redeem_voucher(address, voucher_id).await?;
	tracing::info!(customer = %claims.sub, voucher_id, tx = %outcome.tx_hash, "Redeemed voucher");
	Ok(Json(TxResponse {
		message: "Voucher redeemed".to_string(),
		tx_hash: outcome.tx_hash,
		block_number: outcome.block_number,
	}))
}

/// Handles `GET /api/customer/redemptions`.
pub async fn redemptions(
	State(state): State<AppState>,
	Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<RedemptionResponse>>, ApiError> {
	let address = claims_address(&claims)?;
	let records = state
		.ledger
		.redemptions_of(address)
		.await?
		.into_iter()
		.map(|r| RedemptionResponse {
			id: r.id,
			voucher_id: r.voucher_id,
			redeemer: r.redeemer.to_string(),
			timestamp: r.timestamp,
			fulfilled: r.fulfilled,
		})
		.collect();
	Ok(Json(records))
}
