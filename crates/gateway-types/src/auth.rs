//! Authentication and authorization types for the gateway API.
//!
//! This module provides the principal roles, JWT claims, and authentication
//! configuration shared between the token service and the HTTP middleware.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Principal roles recognized by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// End user that holds points and redeems vouchers.
	Customer,
	/// Merchant that issues vouchers and fulfills redemptions.
	Business,
	/// Operator role with access to registry administration.
	Admin,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let role_str = match self {
			Role::Customer => "customer",
			Role::Business => "business",
			Role::Admin => "admin",
		};
		write!(f, "{role_str}")
	}
}

impl FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"customer" => Ok(Role::Customer),
			"business" => Ok(Role::Business),
			"admin" => Ok(Role::Admin),
			_ => Err(format!("Unknown role: {s}")),
		}
	}
}

/// JWT claims carried by every session token.
///
/// The on-chain address used by authenticated handlers always comes from
/// these verified claims, never from request fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
	/// Subject (username of the principal)
	pub sub: String,
	/// Role granted to this token
	pub role: Role,
	/// On-chain account address of the principal, hex encoded
	pub address: String,
	/// Expiration time (Unix timestamp)
	pub exp: i64,
	/// Issued at (Unix timestamp)
	pub iat: i64,
	/// Issuer
	pub iss: String,
}

/// Authentication configuration for the token service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
	/// Issuer claim placed in and required from every token.
	#[serde(default = "default_issuer")]
	pub issuer: String,
	/// Token lifetime in hours.
	#[serde(default = "default_token_expiry_hours")]
	pub token_expiry_hours: u32,
	/// Optional fixed signing secret. When absent a random secret is
	/// generated at startup, so a restart invalidates all sessions.
	#[serde(default)]
	pub secret: Option<String>,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			issuer: default_issuer(),
			token_expiry_hours: default_token_expiry_hours(),
			secret: None,
		}
	}
}

fn default_issuer() -> String {
	"loyalty-gateway".to_string()
}

fn default_token_expiry_hours() -> u32 {
	24
}
