//! Configuration module for the loyalty gateway.
//!
//! Configuration is loaded from a TOML file and validated before the service
//! starts. Contract addresses are individually optional: a missing address
//! disables the dependent endpoints without failing startup.

use alloy_primitives::Address;
use gateway_types::AuthConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable consulted for the operator signing key when the
/// config file does not carry one.
pub const SIGNER_KEY_ENV: &str = "GATEWAY_SIGNER_KEY";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration for the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Ledger node connection settings.
	pub ledger: LedgerConfig,
	/// Contract address bindings; each one is optional.
	#[serde(default)]
	pub contracts: ContractsConfig,
	/// HTTP API server settings.
	#[serde(default)]
	pub api: ApiConfig,
	/// Session token settings.
	#[serde(default)]
	pub auth: AuthConfig,
}

/// Ledger node connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
	/// HTTP RPC URL of the ledger node.
	pub rpc_url: String,
	/// Hex-encoded operator private key used to sign every submitted
	/// transaction. Falls back to the `GATEWAY_SIGNER_KEY` environment
	/// variable when absent.
	#[serde(default)]
	pub signer_key: Option<String>,
}

/// Contract address bindings resolved from configuration.
///
/// When the factory address is configured and any of the others is not, the
/// ledger client attempts to resolve the missing ones from the factory once
/// at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractsConfig {
	/// LoyaltyToken contract address.
	pub token: Option<Address>,
	/// BusinessRegistry contract address.
	pub registry: Option<Address>,
	/// VoucherManager contract address.
	pub voucher: Option<Address>,
	/// Factory contract address.
	pub factory: Option<Address>,
}

/// HTTP API server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
	/// Bind host.
	#[serde(default = "default_host")]
	pub host: String,
	/// Bind port.
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
		}
	}
}

fn default_host() -> String {
	"127.0.0.1".to_string()
}

fn default_port() -> u16 {
	3000
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Resolves the operator signing key from config or environment.
	pub fn signer_key(&self) -> Result<String, ConfigError> {
		if let Some(key) = &self.ledger.signer_key {
			return Ok(key.clone());
		}
		std::env::var(SIGNER_KEY_ENV).map_err(|_| {
			ConfigError::Validation(format!(
				"No signer key in config and {SIGNER_KEY_ENV} is not set"
			))
		})
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.ledger.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation("ledger.rpc_url must be set".into()));
		}
		if self.api.port == 0 {
			return Err(ConfigError::Validation("api.port must be non-zero".into()));
		}
		if self.auth.token_expiry_hours == 0 {
			return Err(ConfigError::Validation(
				"auth.token_expiry_hours must be non-zero".into(),
			));
		}
		Ok(())
	}
}
