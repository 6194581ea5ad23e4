//! Alloy-backed implementation of the [`Ledger`] trait.
//!
//! One HTTP provider with wallet fillers handles both read calls and
//! transaction submission. Contract bindings are plain optional addresses
//! fixed at construction; every operation checks its binding once up front
//! and fails with [`LedgerError::NotInitialized`] instead of crashing.

use crate::contracts::{IBusinessRegistry, ILoyaltyToken, IVoucherFactory, IVoucherManager};
use crate::{
	classify_revert, Contract, Ledger, LedgerError, LedgerStatus, RedemptionInfo, TxOutcome,
	VoucherInfo,
};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use gateway_config::Config;

/// Alloy-based ledger client.
pub struct EvmLedger {
	provider: DynProvider,
	operator: Address,
	token: Option<Address>,
	registry: Option<Address>,
	voucher: Option<Address>,
	factory: Option<Address>,
}

impl EvmLedger {
	/// Connects to the configured node and resolves contract bindings.
	///
	/// Bindings left unconfigured stay uninitialized. When a factory address
	/// is configured, missing downstream addresses are resolved from it with
	/// a single query each; resolution failures are logged and are not fatal
	/// to startup.
	pub async fn connect(config: &Config) -> Result<Self, LedgerError> {
		let signer_key = config
			.signer_key()
			.map_err(|e| LedgerError::Network(e.to_string()))?;
		let signer: PrivateKeySigner = signer_key
			.parse()
			.map_err(|e| LedgerError::Network(format!("Invalid signer key: {e}")))?;
		let operator = signer.address();
		let wallet = EthereumWallet::from(signer);

		let url = config
			.ledger
			.rpc_url
			.parse()
			.map_err(|e| LedgerError::Network(format!("Invalid RPC URL: {e}")))?;
		let provider = ProviderBuilder::new()
			.wallet(wallet)
			.connect_http(url)
			.erased();

		if let Err(e) = provider.get_chain_id().await {
			tracing::warn!("Ledger node is not reachable at startup: {e}");
		}

		let mut ledger = Self {
			provider,
			operator,
			token: config.contracts.token,
			registry: config.contracts.registry,
			voucher: config.contracts.voucher,
			factory: config.contracts.factory,
		};
		ledger.resolve_from_factory().await;
		Ok(ledger)
	}

	/// The address transactions are signed with.
	pub fn operator(&self) -> Address {
		self.operator
	}

	async fn resolve_from_factory(&mut self) {
		let Some(factory) = self.factory else {
			return;
		};
		if self.token.is_some() && self.registry.is_some() && self.voucher.is_some() {
			return;
		}

		if self.token.is_none() {
			self.token = self
				.resolve_binding(factory, "token", IVoucherFactory::tokenContractCall {})
				.await;
		}
		if self.registry.is_none() {
			self.registry = self
				.resolve_binding(factory, "registry", IVoucherFactory::registryContractCall {})
				.await;
		}
		if self.voucher.is_none() {
			self.voucher = self
				.resolve_binding(factory, "voucher", IVoucherFactory::voucherContractCall {})
				.await;
		}
	}

	async fn resolve_binding<C>(&self, factory: Address, name: &str, call: C) -> Option<Address>
	where
		C: SolCall<Return = Address>,
	{
		match self.read(factory, call).await {
			Ok(address) if address != Address::ZERO => {
				tracing::info!("Resolved {name} contract from factory: {address}");
				Some(address)
			},
			Ok(_) => {
				tracing::warn!("Factory reports no {name} contract deployed");
				None
			},
			Err(e) => {
				tracing::warn!("Failed to resolve {name} contract from factory: {e}");
				None
			},
		}
	}

	fn ensure(&self, contract: Contract) -> Result<Address, LedgerError> {
		let binding = match contract {
			Contract::Token => self.token,
			Contract::Registry => self.registry,
			Contract::Voucher => self.voucher,
			Contract::Factory => self.factory,
		};
		binding.ok_or(LedgerError::NotInitialized(contract))
	}

	/// Read-only contract call; no side effect, no gas.
	async fn read<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return, LedgerError> {
		let request = TransactionRequest::default()
			.to(to)
			.input(call.abi_encode().into());
		let bytes = self
			.provider
			.call(request)
			.await
			.map_err(|e| call_error(&e.to_string()))?;
		C::abi_decode_returns(&bytes)
			.map_err(|e| LedgerError::Network(format!("Failed to decode call response: {e}")))
	}

	/// Submits a state-changing call and blocks until it is mined.
	///
	/// A receipt with a failed status is replayed as a read call once to
	/// recover the revert reason; no retries are performed.
	async fn submit<C: SolCall>(&self, to: Address, call: C) -> Result<TxOutcome, LedgerError> {
		let request = TransactionRequest::default()
			.from(self.operator)
			.to(to)
			.input(call.abi_encode().into());

		let pending = self
			.provider
			.send_transaction(request.clone())
			.await
			.map_err(|e| call_error(&e.to_string()))?;
		let receipt = pending
			.get_receipt()
			.await
			.map_err(|e| LedgerError::Network(format!("Failed to confirm transaction: {e}")))?;

		if !receipt.status() {
			let reason = match self.provider.call(request).await {
				Err(e) => revert_reason(&e.to_string()),
				Ok(_) => "execution reverted".to_string(),
			};
			return Err(LedgerError::Reverted(classify_revert(&reason)));
		}

		Ok(TxOutcome {
			tx_hash: receipt.transaction_hash.to_string(),
			block_number: receipt.block_number.unwrap_or(0),
		})
	}

	async fn voucher_by_id(&self, manager: Address, id: u64) -> Result<Option<VoucherInfo>, LedgerError> {
		let call = IVoucherManager::getVoucherCall {
			voucherId: U256::from(id),
		};
		match self.read(manager, call).await {
			Ok(voucher) => Ok(Some(VoucherInfo {
				id,
				title: voucher.title,
				description: voucher.description,
				point_cost: u64::try_from(voucher.pointCost).unwrap_or(u64::MAX),
				business: voucher.business,
				is_active: voucher.active,
			})),
			Err(LedgerError::Reverted(crate::RevertReason::NotFound(_))) => Ok(None),
			Err(e) => Err(e),
		}
	}
}

#[async_trait]
impl Ledger for EvmLedger {
	async fn status(&self) -> LedgerStatus {
		LedgerStatus {
			connected: self.provider.get_block_number().await.is_ok(),
			token: self.token,
			registry: self.registry,
			voucher: self.voucher,
			factory: self.factory,
		}
	}

	async fn balance_of(&self, owner: Address) -> Result<U256, LedgerError> {
		let token = self.ensure(Contract::Token)?;
		self.read(token, ILoyaltyToken::balanceOfCall { owner }).await
	}

	async fn total_supply(&self) -> Result<U256, LedgerError> {
		let token = self.ensure(Contract::Token)?;
		self.read(token, ILoyaltyToken::totalSupplyCall {}).await
	}

	async fn mint(&self, to: Address, amount: U256) -> Result<TxOutcome, LedgerError> {
		let token = self.ensure(Contract::Token)?;
		self.submit(token, ILoyaltyToken::mintCall { to, amount }).await
	}

	async fn register_business(
		&self,
		account: Address,
		name: &str,
	) -> Result<TxOutcome, LedgerError> {
		let registry = self.ensure(Contract::Registry)?;
		let call = IBusinessRegistry::registerBusinessCall {
			account,
			name: name.to_string(),
		};
		self.submit(registry, call).await
	}

	async fn approve_business(&self, account: Address) -> Result<TxOutcome, LedgerError> {
		let registry = self.ensure(Contract::Registry)?;
		self.submit(registry, IBusinessRegistry::approveBusinessCall { account })
			.await
	}

	async fn is_approved(&self, account: Address) -> Result<bool, LedgerError> {
		let registry = self.ensure(Contract::Registry)?;
		self.read(registry, IBusinessRegistry::isApprovedCall { account })
			.await
	}

	async fn create_voucher(
		&self,
		business: Address,
		title: &str,
		description: &str,
		point_cost: U256,
	) -> Result<(TxOutcome, u64), LedgerError> {
		let manager = self.ensure(Contract::Voucher)?;
		let call = IVoucherManager::createVoucherCall {
			business,
			title: title.to_string(),
			description: description.to_string(),
			pointCost: point_cost,
		};
		let outcome = self.submit(manager, call).await?;

		// Ids are assigned sequentially, so the latest count is the new id.
		let count = self
			.read(manager, IVoucherManager::voucherCountCall {})
			.await?;
		Ok((outcome, u64::try_from(count).unwrap_or(u64::MAX)))
	}

	async fn set_voucher_active(
		&self,
		business: Address,
		voucher_id: u64,
		active: bool,
	) -> Result<TxOutcome, LedgerError> {
		let manager = self.ensure(Contract::Voucher)?;
		let call = IVoucherManager::setVoucherActiveCall {
			business,
			voucherId: U256::from(voucher_id),
			active,
		};
		self.submit(manager, call).await
	}

	async fn voucher(&self, voucher_id: u64) -> Result<Option<VoucherInfo>, LedgerError> {
		let manager = self.ensure(Contract::Voucher)?;
		self.voucher_by_id(manager, voucher_id).await
	}

	async fn vouchers_of(&self, business: Address) -> Result<Vec<VoucherInfo>, LedgerError> {
		let manager = self.ensure(Contract::Voucher)?;
		let ids = self
			.read(manager, IVoucherManager::voucherIdsOfCall { business })
			.await?;

		let mut vouchers = Vec::with_capacity(ids.len());
		for id in ids {
			let id = u64::try_from(id).unwrap_or(u64::MAX);
			if let Some(voucher) = self.voucher_by_id(manager, id).await? {
				vouchers.push(voucher);
			}
		}
		Ok(vouchers)
	}

	async fn redeem_voucher(
		&self,
		customer: Address,
		voucher_id: u64,
	) -> Result<TxOutcome, LedgerError> {
		let manager = self.ensure(Contract::Voucher)?;
		let call = IVoucherManager::redeemVoucherCall {
			customer,
			voucherId: U256::from(voucher_id),
		};
		self.submit(manager, call).await
	}

	async fn redemptions_of(
		&self,
		customer: Address,
	) -> Result<Vec<RedemptionInfo>, LedgerError> {
		let manager = self.ensure(Contract::Voucher)?;
		let ids = self
			.read(manager, IVoucherManager::redemptionIdsOfCall { customer })
			.await?;

		let mut redemptions = Vec::with_capacity(ids.len());
		for id in ids {
			let redemption_id = u64::try_from(id).unwrap_or(u64::MAX);
			let record = self
				.read(
					manager,
					IVoucherManager::getRedemptionCall {
						redemptionId: U256::from(redemption_id),
					},
				)
				.await?;
			redemptions.push(RedemptionInfo {
				id: redemption_id,
				voucher_id: u64::try_from(record.voucherId).unwrap_or(u64::MAX),
				redeemer: record.redeemer,
				timestamp: u64::try_from(record.timestamp).unwrap_or(0),
				fulfilled: record.fulfilled,
			});
		}
		Ok(redemptions)
	}

	async fn fulfill_redemption(
		&self,
		business: Address,
		redemption_id: u64,
	) -> Result<TxOutcome, LedgerError> {
		let manager = self.ensure(Contract::Voucher)?;
		let call = IVoucherManager::fulfillRedemptionCall {
			business,
			redemptionId: U256::from(redemption_id),
		};
		self.submit(manager, call).await
	}
}

/// Maps a node error message to either a classified revert or a network error.
fn call_error(message: &str) -> LedgerError {
	if message.contains("execution reverted") || message.contains("revert") {
		LedgerError::Reverted(classify_revert(&revert_reason(message)))
	} else {
		LedgerError::Network(message.to_string())
	}
}

/// Extracts the revert reason string from a node error message.
///
/// Nodes report reverts as "execution reverted: <reason>" with the reason
/// omitted when the contract gave none.
fn revert_reason(message: &str) -> String {
	match message.split_once("execution reverted") {
		Some((_, rest)) => {
			let reason = rest
				.trim_start_matches([':', ' '])
				.split(['\n', '"'])
				.next()
				.unwrap_or("")
				.trim()
				.trim_end_matches([',', '.']);
			if reason.is_empty() {
				"execution reverted".to_string()
			} else {
				reason.to_string()
			}
		},
		None => message.trim().to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::RevertReason;

	#[test]
	fn extracts_reason_from_node_error_message() {
		let message = "server returned an error response: error code 3: execution reverted: Business not approved";
		assert_eq!(revert_reason(message), "Business not approved");
	}

	#[test]
	fn bare_revert_keeps_a_generic_reason() {
		assert_eq!(revert_reason("execution reverted"), "execution reverted");
	}

	#[test]
	fn non_revert_errors_stay_network_errors() {
		assert!(matches!(
			call_error("connection refused"),
			LedgerError::Network(_)
		));
	}

	#[test]
	fn reverted_calls_are_classified() {
		let err = call_error("execution reverted: Voucher does not exist");
		assert!(matches!(
			err,
			LedgerError::Reverted(RevertReason::NotFound(_))
		));
	}

	#[tokio::test]
	async fn unconfigured_bindings_fail_operations_without_crashing() {
		// Startup tolerates an unreachable node, so no live RPC is needed.
		let config = Config::from_toml_str(
			r#"
			[ledger]
			rpc_url = "http://127.0.0.1:1"
			signer_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

			[contracts]
			token = "0x0000000000000000000000000000000000000010"
			"#,
		)
		.unwrap();
		let ledger = EvmLedger::connect(&config).await.unwrap();

		assert!(matches!(
			ledger.voucher(1).await,
			Err(LedgerError::NotInitialized(Contract::Voucher))
		));
		assert!(matches!(
			ledger.is_approved(Address::ZERO).await,
			Err(LedgerError::NotInitialized(Contract::Registry))
		));
	}
}
