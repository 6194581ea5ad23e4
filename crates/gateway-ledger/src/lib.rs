//! Remote ledger client for the loyalty gateway.
//!
//! The ledger (a blockchain node plus four deployed contracts) is treated as
//! an opaque transactional service reached by read calls and by submitted,
//! mined, possibly reverted transactions. This crate exposes a typed
//! [`Ledger`] trait so handlers never string-match revert reasons themselves;
//! translation of raw reasons happens in exactly one place,
//! [`classify_revert`].

pub mod contracts;
pub mod evm;

pub use evm::EvmLedger;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use gateway_types::{ApiError, ContractBindingStatus, ContractStatusResponse};
use std::fmt;
use thiserror::Error;

/// The four logical contracts the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
	Token,
	Registry,
	Voucher,
	Factory,
}

impl fmt::Display for Contract {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Contract::Token => "token",
			Contract::Registry => "registry",
			Contract::Voucher => "voucher",
			Contract::Factory => "factory",
		};
		write!(f, "{name}")
	}
}

/// Structured revert reason, classified from the raw reason string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
	/// The account is already registered on chain.
	AlreadyRegistered(String),
	/// The business has not been approved by the registry.
	NotApproved(String),
	/// The caller is not permitted to perform the operation.
	Unauthorized(String),
	/// The referenced entity does not exist on chain.
	NotFound(String),
	/// The account balance does not cover the operation.
	InsufficientBalance(String),
	/// Unclassified revert; the raw reason is passed through.
	Other(String),
}

impl RevertReason {
	/// The raw reason string as reported by the ledger.
	pub fn raw(&self) -> &str {
		match self {
			RevertReason::AlreadyRegistered(s)
			| RevertReason::NotApproved(s)
			| RevertReason::Unauthorized(s)
			| RevertReason::NotFound(s)
			| RevertReason::InsufficientBalance(s)
			| RevertReason::Other(s) => s,
		}
	}
}

/// Translates a raw revert reason string into a [`RevertReason`].
///
/// Substring matching on contract error strings is a fallback by nature, so
/// it is isolated here; handlers only ever see the classified variants.
pub fn classify_revert(raw: &str) -> RevertReason {
	let lower = raw.to_lowercase();
	let owned = raw.to_string();
	if lower.contains("already registered") || lower.contains("already exists") {
		RevertReason::AlreadyRegistered(owned)
	} else if lower.contains("not approved") {
		RevertReason::NotApproved(owned)
	} else if lower.contains("not authorized")
		|| lower.contains("caller is not")
		|| lower.contains("only owner")
	{
		RevertReason::Unauthorized(owned)
	} else if lower.contains("does not exist") || lower.contains("nonexistent") {
		RevertReason::NotFound(owned)
	} else if lower.contains("insufficient") {
		RevertReason::InsufficientBalance(owned)
	} else {
		RevertReason::Other(owned)
	}
}

/// Errors produced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// The contract binding required by the operation is not configured.
	#[error("Contract not initialized: {0}")]
	NotInitialized(Contract),
	/// Node communication or encoding failure.
	#[error("Ledger error: {0}")]
	Network(String),
	/// The call or transaction was executed and reverted.
	#[error("Reverted: {}", .0.raw())]
	Reverted(RevertReason),
}

impl From<LedgerError> for ApiError {
	fn from(err: LedgerError) -> Self {
		match err {
			LedgerError::NotInitialized(contract) => {
				ApiError::Unavailable(format!("{contract} contract is not initialized"))
			},
			LedgerError::Network(message) => ApiError::Internal(message),
			LedgerError::Reverted(reason) => match reason {
				RevertReason::AlreadyRegistered(raw) => ApiError::Conflict(raw),
				RevertReason::NotApproved(raw) | RevertReason::Unauthorized(raw) => {
					ApiError::Forbidden(raw)
				},
				RevertReason::NotFound(raw) => ApiError::NotFound(raw),
				RevertReason::InsufficientBalance(raw) => ApiError::Validation(raw),
				RevertReason::Other(raw) => ApiError::Revert(raw),
			},
		}
	}
}

/// Outcome of a confirmed, successful transaction.
#[derive(Debug, Clone)]
pub struct TxOutcome {
	/// Transaction hash, 0x-prefixed hex.
	pub tx_hash: String,
	/// Block the transaction was mined in.
	pub block_number: u64,
}

/// Voucher state as read from the ledger.
#[derive(Debug, Clone)]
pub struct VoucherInfo {
	pub id: u64,
	pub title: String,
	pub description: String,
	pub point_cost: u64,
	pub business: Address,
	pub is_active: bool,
}

/// Redemption record as read from the ledger.
#[derive(Debug, Clone)]
pub struct RedemptionInfo {
	pub id: u64,
	pub voucher_id: u64,
	pub redeemer: Address,
	pub timestamp: u64,
	pub fulfilled: bool,
}

/// Connectivity and binding status reported by the status endpoint.
#[derive(Debug, Clone)]
pub struct LedgerStatus {
	pub connected: bool,
	pub token: Option<Address>,
	pub registry: Option<Address>,
	pub voucher: Option<Address>,
	pub factory: Option<Address>,
}

impl LedgerStatus {
	/// Converts into the public status response shape.
	pub fn into_response(self) -> ContractStatusResponse {
		fn binding(address: Option<Address>) -> ContractBindingStatus {
			ContractBindingStatus {
				address: address.map(|a| a.to_string()),
				initialized: address.is_some(),
			}
		}

		ContractStatusResponse {
			blockchain_connected: self.connected,
			token: binding(self.token),
			registry: binding(self.registry),
			voucher: binding(self.voucher),
			factory: binding(self.factory),
		}
	}
}

/// Typed operations against the remote ledger.
///
/// Write operations block until the transaction is mined; a mined but
/// reverted transaction surfaces as [`LedgerError::Reverted`]. No retries
/// are performed and no reads are cached.
#[async_trait]
pub trait Ledger: Send + Sync {
	/// Node connectivity and per-contract binding status.
	async fn status(&self) -> LedgerStatus;

	// Token
	async fn balance_of(&self, owner: Address) -> Result<U256, LedgerError>;
	async fn total_supply(&self) -> Result<U256, LedgerError>;
	async fn mint(&self, to: Address, amount: U256) -> Result<TxOutcome, LedgerError>;

	// Registry
	async fn register_business(
		&self,
		account: Address,
		name: &str,
	) -> Result<TxOutcome, LedgerError>;
	async fn approve_business(&self, account: Address) -> Result<TxOutcome, LedgerError>;
	async fn is_approved(&self, account: Address) -> Result<bool, LedgerError>;

	// Vouchers
	async fn create_voucher(
		&self,
		business: Address,
		title: &str,
		description: &str,
		point_cost: U256,
	) -> Result<(TxOutcome, u64), LedgerError>;
	async fn set_voucher_active(
		&self,
		business: Address,
		voucher_id: u64,
		active: bool,
	) -> Result<TxOutcome, LedgerError>;
	/// Reads one voucher; a "does not exist" revert maps to `Ok(None)`.
	async fn voucher(&self, voucher_id: u64) -> Result<Option<VoucherInfo>, LedgerError>;
	async fn vouchers_of(&self, business: Address) -> Result<Vec<VoucherInfo>, LedgerError>;

	// Redemptions
	async fn redeem_voucher(
		&self,
		customer: Address,
		voucher_id: u64,
	) -> Result<TxOutcome, LedgerError>;
	async fn redemptions_of(
		&self,
		customer: Address,
	) -> Result<Vec<RedemptionInfo>, LedgerError>;
	async fn fulfill_redemption(
		&self,
		business: Address,
		redemption_id: u64,
	) -> Result<TxOutcome, LedgerError>;
}
