//! Business endpoints: on-chain registration, voucher lifecycle, and
//! redemption fulfillment. The acting business address always comes from the
//! verified token claims.

use crate::apis::claims_address;
use crate::server::AppState;
use alloy_primitives::U256;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use gateway_types::{
	ApiError, Claims, CreateVoucherRequest, CreateVoucherResponse, Role, TxResponse,
	VoucherResponse,
};

/// Handles `POST /api/business/register-on-chain`.
///
/// Registers the authenticated business in the on-chain registry using the
/// display name captured at signup.
pub async fn register_on_chain(
	State(state): State<AppState>,
	Extension(claims): Extension<Claims>,
) -> Result<Json<TxResponse>, ApiError> {
	let address = claims_address(&claims)?;
	let name = state
		.store
		.find(Role::Business, &claims.sub)
		.await
		.and_then(|p| p.display_name)
		.unwrap_or_else(|| claims.sub.clone());

	let outcome = state.ledger.register_business(address, &name).await?;
	tracing::info!(business = %claims.sub, tx = %outcome.tx_hash, "Business registered on chain");
	Ok(Json(TxResponse {
		message: "Business registered on chain".to_string(),
		tx_hash: outcome.tx_hash,
		block_number: outcome.block_number,
	}))
}

/// Handles `POST /api/business/create-voucher`.
///
/// The approval check runs before the submission so an unapproved business
/// gets a clean rejection instead of a wasted revert.
pub async fn create_voucher(
	State(state): State<AppState>,
	Extension(claims): Extension<Claims>,
	Json(request): Json<CreateVoucherRequest>,
) -> Result<Json<CreateVoucherResponse>, ApiError> {
	let address = claims_address(&claims)?;
	if request.title.trim().is_empty() {
		return Err(ApiError::Validation("Missing required field: title".to_string()));
	}
	if request.description.trim().is_empty() {
		return Err(ApiError::Validation(
			"Missing required field: description".to_string(),
		));
	}
	if request.point_cost == 0 {
		return Err(ApiError::Validation("pointCost must be positive".to_string()));
	}

	if !state.ledger.is_approved(address).await? {
		return Err(ApiError::Forbidden("Business is not approved".to_string()));
	}

	let (outcome, voucher_id) = state
		.ledger
		.create_voucher(
			address,
			request.title.trim(),
			request.description.trim(),
			U256::from(request.point_cost),
		)
		.await?;
	tracing::info!(business = %claims.sub, voucher_id, tx = %outcome.tx_hash, "Created voucher");
	Ok(Json(CreateVoucherResponse {
		message: "Voucher created".to_string(),
		tx_hash: outcome.tx_hash,
		voucher_id,
	}))
}

/// Handles `POST /api/business/toggle-voucher/{id}`.
pub async fn toggle_voucher(
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
	if voucher.business != address {
		return Err(ApiError::Forbidden(
			"Voucher is owned by another business".to_string(),
		));
	}

	let activate = !voucher.is_active;
	let outcome = state
		.ledger
		.set_voucher_active(address, voucher_id, activate)
		.await?;
	Ok(Json(TxResponse {
		message: if activate {
			"Voucher activated".to_string()
		} else {
			"Voucher deactivated".to_string()
		},
		tx_hash: outcome.tx_hash,
		block_number: outcome.block_number,
	}))
}

/// Handles `GET /api/business/vouchers`.
pub async fn list_vouchers(
	State(state): State<AppState>,
	Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<VoucherResponse>>, ApiError> {
	let address = claims_address(&claims)?;
	let vouchers = state
		.ledger
		.vouchers_of(address)
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

/// Handles `POST /api/business/fulfill-redemption/{id}`.
pub async fn fulfill_redemption(
	State(state): State<AppState>,
	Extension(claims): Extension<Claims>,
	Path(redemption_id): Path<u64>,
) -> Result<Json<TxResponse>, ApiError> {
	let address = claims_address(&claims)?;
	let outcome = state
		.ledger
		.fulfill_redemption(address, redemption_id)
		.await?;
	tracing::info!(business = %claims.sub, redemption_id, tx = %outcome.tx_hash, "Fulfilled redemption");
	Ok(Json(TxResponse {
		message: "Redemption marked as fulfilled".to_string(),
		tx_hash: outcome.tx_hash,
		block_number: outcome.block_number,
	}))
}
