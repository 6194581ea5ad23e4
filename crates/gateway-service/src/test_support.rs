//! Shared test fixtures: an in-memory ledger and state builders.

use crate::auth::{AdminAccess, JwtService};
use crate::server::AppState;
use crate::store::CredentialStore;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chrono::Utc;
use gateway_ledger::{
	Ledger, LedgerError, LedgerStatus, RedemptionInfo, TxOutcome, VoucherInfo,
};
use gateway_types::{AuthConfig, Claims, Role};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory [`Ledger`] with sequential voucher ids and a submit counter,
/// so tests can assert that rejected requests never produce transactions.
#[derive(Default)]
pub struct MockLedger {
	vouchers: Mutex<HashMap<u64, VoucherInfo>>,
	next_voucher_id: AtomicUsize,
	balances: Mutex<HashMap<Address, U256>>,
	approved: Mutex<HashSet<Address>>,
	redemptions: Mutex<Vec<RedemptionInfo>>,
	submits: AtomicUsize,
}

impl MockLedger {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn submit_count(&self) -> usize {
		self.submits.load(Ordering::SeqCst)
	}

	pub fn balance(&self, address: Address) -> U256 {
		self.balances
			.lock()
			.unwrap()
			.get(&address)
			.copied()
			.unwrap_or(U256::ZERO)
	}

	pub fn set_balance(&self, address: Address, balance: U256) {
		self.balances.lock().unwrap().insert(address, balance);
	}

	pub fn approve(&self, address: Address) {
		self.approved.lock().unwrap().insert(address);
	}

	/// Seeds a voucher directly, bypassing the submit counter.
	pub fn seed_voucher(&self, title: &str, point_cost: u64, business: Address, active: bool) -> u64 {
		let id = self.next_voucher_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
		self.vouchers.lock().unwrap().insert(
			id,
			VoucherInfo {
				id,
				title: title.to_string(),
				description: format!("{title} description"),
				point_cost,
				business,
				is_active: active,
			},
		);
		id
	}

	pub fn remove_voucher(&self, id: u64) {
		self.vouchers.lock().unwrap().remove(&id);
	}

	fn outcome(&self) -> TxOutcome {
		let n = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
		TxOutcome {
			tx_hash: format!("0x{n:064x}"),
			block_number: n as u64,
		}
	}
}

#[async_trait]
impl Ledger for MockLedger {
	async fn status(&self) -> LedgerStatus {
		LedgerStatus {
			connected: true,
			token: Some(Address::repeat_byte(0x10)),
			registry: Some(Address::repeat_byte(0x20)),
			voucher: Some(Address::repeat_byte(0x30)),
			factory: None,
		}
	}

	async fn balance_of(&self, owner: Address) -> Result<U256, LedgerError> {
		Ok(self.balance(owner))
	}

	async fn total_supply(&self) -> Result<U256, LedgerError> {
		// Only minting creates points here, so the supply is the balance sum.
		Ok(self
			.balances
			.lock()
			.unwrap()
			.values()
			.fold(U256::ZERO, |acc, b| acc + *b))
	}

	async fn mint(&self, to: Address, amount: U256) -> Result<TxOutcome, LedgerError> {
		let outcome = self.outcome();
		let mut balances = self.balances.lock().unwrap();
		let entry = balances.entry(to).or_insert(U256::ZERO);
		*entry += amount;
		Ok(outcome)
	}

	async fn register_business(
		&self,
		_account: Address,
		_name: &str,
	) -> Result<TxOutcome, LedgerError> {
		Ok(self.outcome())
	}

	async fn approve_business(&self, account: Address) -> Result<TxOutcome, LedgerError> {
		let outcome = self.outcome();
		self.approve(account);
		Ok(outcome)
	}

	async fn is_approved(&self, account: Address) -> Result<bool, LedgerError> {
		Ok(self.approved.lock().unwrap().contains(&account))
	}

	async fn create_voucher(
		&self,
		business: Address,
		title: &str,
		description: &str,
		point_cost: U256,
	) -> Result<(TxOutcome, u64), LedgerError> {
		let outcome = self.outcome();
		let id = self.next_voucher_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
		self.vouchers.lock().unwrap().insert(
			id,
			VoucherInfo {
				id,
				title: title.to_string(),
				description: description.to_string(),
				point_cost: u64::try_from(point_cost).unwrap_or(u64::MAX),
				business,
				is_active: true,
			},
		);
		Ok((outcome, id))
	}

	async fn set_voucher_active(
		&self,
		_business: Address,
		voucher_id: u64,
		active: bool,
	) -> Result<TxOutcome, LedgerError> {
		let outcome = self.outcome();
		if let Some(voucher) = self.vouchers.lock().unwrap().get_mut(&voucher_id) {
			voucher.is_active = active;
		}
		Ok(outcome)
	}

	async fn voucher(&self, voucher_id: u64) -> Result<Option<VoucherInfo>, LedgerError> {
		Ok(self.vouchers.lock().unwrap().get(&voucher_id).cloned())
	}

	async fn vouchers_of(&self, business: Address) -> Result<Vec<VoucherInfo>, LedgerError> {
		let mut vouchers: Vec<VoucherInfo> = self
			.vouchers
			.lock()
			.unwrap()
			.values()
			.filter(|v| v.business == business)
			.cloned()
			.collect();
		vouchers.sort_by_key(|v| v.id);
		Ok(vouchers)
	}

	async fn redeem_voucher(
		&self,
		customer: Address,
		voucher_id: u64,
	) -> Result<TxOutcome, LedgerError> {
		let outcome = self.outcome();
		let mut redemptions = self.redemptions.lock().unwrap();
		let id = redemptions.len() as u64 + 1;
		redemptions.push(RedemptionInfo {
			id,
			voucher_id,
			redeemer: customer,
			timestamp: Utc::now().timestamp() as u64,
			fulfilled: false,
		});
		Ok(outcome)
	}

	async fn redemptions_of(
		&self,
		customer: Address,
	) -> Result<Vec<RedemptionInfo>, LedgerError> {
		Ok(self
			.redemptions
			.lock()
			.unwrap()
			.iter()
			.filter(|r| r.redeemer == customer)
			.cloned()
			.collect())
	}

	async fn fulfill_redemption(
		&self,
		_business: Address,
		redemption_id: u64,
	) -> Result<TxOutcome, LedgerError> {
		let outcome = self.outcome();
		let mut redemptions = self.redemptions.lock().unwrap();
		if let Some(record) = redemptions.iter_mut().find(|r| r.id == redemption_id) {
			record.fulfilled = true;
		}
		Ok(outcome)
	}
}

/// Builds an [`AppState`] backed by a [`MockLedger`], returning both.
pub fn test_state() -> (AppState, Arc<MockLedger>) {
	let ledger = Arc::new(MockLedger::new());
	let state = AppState {
		store: Arc::new(CredentialStore::new()),
		jwt: Arc::new(JwtService::new(&AuthConfig::default())),
		ledger: ledger.clone(),
		admin: Arc::new(AdminAccess::generate().unwrap()),
	};
	(state, ledger)
}

/// Claims as the auth middleware would inject them for a verified token.
pub fn claims_for(role: Role, username: &str, address: &str) -> Claims {
	let now = Utc::now().timestamp();
	Claims {
		sub: username.to_string(),
		role,
		address: address.to_string(),
		exp: now + 3600,
		iat: now,
		iss: "loyalty-gateway".to_string(),
	}
}
