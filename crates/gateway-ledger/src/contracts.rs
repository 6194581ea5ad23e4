//! Solidity interfaces for the four gateway contracts.
//!
//! The contracts are externally owned; these bindings only describe the call
//! surface the gateway uses. All state-changing functions take the acting
//! account as an argument because every transaction is signed by the gateway
//! operator key.

use alloy_sol_types::sol;

sol! {
	/// ERC20-style loyalty point token.
	interface ILoyaltyToken {
		function balanceOf(address owner) external view returns (uint256);
		function totalSupply() external view returns (uint256);
		function mint(address to, uint256 amount) external;
	}

	/// Registry of businesses allowed to issue vouchers.
	interface IBusinessRegistry {
		function registerBusiness(address account, string name) external;
		function approveBusiness(address account) external;
		function isApproved(address account) external view returns (bool);
	}

	/// Voucher lifecycle and redemption bookkeeping.
	interface IVoucherManager {
		function createVoucher(
			address business,
			string title,
			string description,
			uint256 pointCost
		) external;
		function setVoucherActive(address business, uint256 voucherId, bool active) external;
		function voucherCount() external view returns (uint256);
		function getVoucher(uint256 voucherId)
			external
			view
			returns (
				string title,
				string description,
				uint256 pointCost,
				address business,
				bool active
			);
		function voucherIdsOf(address business) external view returns (uint256[] ids);
		function redeemVoucher(address customer, uint256 voucherId) external;
		function redemptionIdsOf(address customer) external view returns (uint256[] ids);
		function getRedemption(uint256 redemptionId)
			external
			view
			returns (uint256 voucherId, address redeemer, uint256 timestamp, bool fulfilled);
		function fulfillRedemption(address business, uint256 redemptionId) external;
	}

	/// Deployment factory that knows the downstream contract addresses.
	interface IVoucherFactory {
		function tokenContract() external view returns (address);
		function registryContract() external view returns (address);
		function voucherContract() external view returns (address);
	}
}
