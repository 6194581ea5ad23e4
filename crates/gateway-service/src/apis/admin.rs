//! Admin endpoints: registry administration and point minting.

use crate::server::AppState;
use alloy_primitives::U256;
use axum::extract::State;
use axum::Json;
use gateway_types::{
	parse_address, ApiError, ApproveBusinessRequest, BusinessSummary, MintRequest,
	RegisterBusinessRequest, TxResponse,
};

/// Handles `GET /api/admin/businesses`.
///
/// Lists locally registered businesses with their on-chain approval flag.
/// The flag reads false when the registry binding is uninitialized or the
/// query fails; the listing itself never fails on registry problems.
pub async fn list_businesses(
	State(state): State<AppState>,
) -> Result<Json<Vec<BusinessSummary>>, ApiError> {
	let principals = state.store.businesses().await;
	let mut businesses = Vec::with_capacity(principals.len());
	for principal in principals {
		let approved = matches!(state.ledger.is_approved(principal.address).await, Ok(true));
		businesses.push(BusinessSummary {
			username: principal.username,
			address: principal.address.to_string(),
			name: principal.display_name.unwrap_or_default(),
			approved,
		});
	}
	Ok(Json(businesses))
}

/// Handles `POST /api/admin/approve-business`.
pub async fn approve_business(
	State(state): State<AppState>,
	Json(request): Json<ApproveBusinessRequest>,
) -> Result<Json<TxResponse>, ApiError> {
	let address = parse_address(&request.address)?;
	let outcome = state.ledger.approve_business(address).await?;
	tracing::info!(%address, tx = %outcome.tx_hash, "Approved business");
	Ok(Json(TxResponse {
		message: "Business approved".to_string(),
		tx_hash: outcome.tx_hash,
		block_number: outcome.block_number,
	}))
}

/// Handles `POST /api/admin/register-business`.
///
/// Registers a business on chain on its behalf, for businesses that cannot
/// submit their own registration.
pub async fn register_business_on_chain(
	State(state): State<AppState>,
	Json(request): Json<RegisterBusinessRequest>,
) -> Result<Json<TxResponse>, ApiError> {
	let address = parse_address(&request.address)?;
	let name = request.name.trim();
	if name.is_empty() {
		return Err(ApiError::Validation("Missing required field: name".to_string()));
	}
	let outcome = state.ledger.register_business(address, name).await?;
	tracing::info!(%address, tx = %outcome.tx_hash, "Registered business on chain");
	Ok(Json(TxResponse {
		message: "Business registered on chain".to_string(),
		tx_hash: outcome.tx_hash,
		block_number: outcome.block_number,
	}))
}

/// Handles `POST /api/admin/mint`.
pub async fn mint(
	State(state): State<AppState>,
	Json(request): Json<MintRequest>,
) -> Result<Json<TxResponse>, ApiError> {
	let address = parse_address(&request.address)?;
	if request.amount == 0 {
		return Err(ApiError::Validation("Amount must be positive".to_string()));
	}
	let outcome = state
		.ledger
		.mint(address, U256::from(request.amount))
		.await?;
	tracing::info!(%address, amount = request.amount, tx = %outcome.tx_hash, "Minted points");
	Ok(Json(TxResponse {
		message: "Tokens minted".to_string(),
		tx_hash: outcome.tx_hash,
		block_number: outcome.block_number,
	}))
}
