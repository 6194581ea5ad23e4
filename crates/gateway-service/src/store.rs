//! In-process credential store.
//!
//! Principals are keyed by `(role, username)` and live for the lifetime of
//! the process; there is no persistence layer. The store takes its write
//! lock across the duplicate check and the insert, so concurrent
//! registrations of the same username cannot both succeed.

use alloy_primitives::Address;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use gateway_types::{ApiError, Role};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors produced by the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
	/// A required field is empty or absent.
	#[error("Missing required field: {0}")]
	MissingField(&'static str),
	/// The username is already taken within the role partition.
	#[error("Username already exists")]
	DuplicateUsername,
	/// Unknown user or wrong password; deliberately indistinguishable.
	#[error("Invalid credentials")]
	InvalidCredentials,
	/// Password hashing failure.
	#[error("Failed to hash password")]
	Hashing,
}

impl From<StoreError> for ApiError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::MissingField(_) => ApiError::Validation(err.to_string()),
			StoreError::DuplicateUsername => ApiError::Conflict(err.to_string()),
			StoreError::InvalidCredentials => ApiError::Auth(err.to_string()),
			StoreError::Hashing => ApiError::Internal(err.to_string()),
		}
	}
}

/// A registered principal.
#[derive(Debug, Clone)]
pub struct Principal {
	pub username: String,
	pub password_hash: String,
	pub address: Address,
	pub role: Role,
	/// Display name; only set for businesses.
	pub display_name: Option<String>,
}

/// In-memory principal registry.
#[derive(Default)]
pub struct CredentialStore {
	principals: RwLock<HashMap<(Role, String), Principal>>,
}

impl CredentialStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new principal.
	///
	/// The password is hashed with argon2 and a random salt before storage.
	/// Duplicate usernames within the same role partition are rejected
	/// before any mutation.
	pub async fn register(
		&self,
		role: Role,
		username: &str,
		password: &str,
		address: Address,
		display_name: Option<String>,
	) -> Result<Principal, StoreError> {
		let username = username.trim();
		if username.is_empty() {
			return Err(StoreError::MissingField("username"));
		}
		if password.is_empty() {
			return Err(StoreError::MissingField("password"));
		}
		let display_name = match role {
			Role::Business => {
				let name = display_name.as_deref().map(str::trim).unwrap_or_default();
				if name.is_empty() {
					return Err(StoreError::MissingField("name"));
				}
				Some(name.to_string())
			},
			_ => None,
		};

		let salt = SaltString::generate(&mut OsRng);
		let password_hash = Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map_err(|_| StoreError::Hashing)?
			.to_string();

		let principal = Principal {
			username: username.to_string(),
			password_hash,
			address,
			role,
			display_name,
		};

		let mut principals = self.principals.write().await;
		let key = (role, username.to_string());
		if principals.contains_key(&key) {
			return Err(StoreError::DuplicateUsername);
		}
		principals.insert(key, principal.clone());
		Ok(principal)
	}

	/// Verifies credentials and returns the matching principal.
	///
	/// Unknown usernames and wrong passwords produce the same error; the
	/// password comparison itself is argon2's constant-time verify.
	pub async fn authenticate(
		&self,
		role: Role,
		username: &str,
		password: &str,
	) -> Result<Principal, StoreError> {
		let principals = self.principals.read().await;
		let principal = principals
			.get(&(role, username.trim().to_string()))
			.ok_or(StoreError::InvalidCredentials)?;

		let parsed =
			PasswordHash::new(&principal.password_hash).map_err(|_| StoreError::InvalidCredentials)?;
		Argon2::default()
			.verify_password(password.as_bytes(), &parsed)
			.map_err(|_| StoreError::InvalidCredentials)?;
		Ok(principal.clone())
	}

	/// Looks up a principal without checking credentials.
	pub async fn find(&self, role: Role, username: &str) -> Option<Principal> {
		let principals = self.principals.read().await;
		principals.get(&(role, username.to_string())).cloned()
	}

	/// Snapshot of all registered businesses, ordered by username.
	pub async fn businesses(&self) -> Vec<Principal> {
		let principals = self.principals.read().await;
		let mut businesses: Vec<Principal> = principals
			.values()
			.filter(|p| p.role == Role::Business)
			.cloned()
			.collect();
		businesses.sort_by(|a, b| a.username.cmp(&b.username));
		businesses
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(byte: u8) -> Address {
		Address::repeat_byte(byte)
	}

	#[tokio::test]
	async fn duplicate_registration_is_rejected_and_first_record_unchanged() {
		let store = CredentialStore::new();
		store
			.register(Role::Customer, "alice", "pw1", addr(1), None)
			.await
			.unwrap();

		let err = store
			.register(Role::Customer, "alice", "pw2", addr(2), None)
			.await
			.unwrap_err();
		assert!(matches!(err, StoreError::DuplicateUsername));

		// Original credentials and address still in place
		let principal = store
			.authenticate(Role::Customer, "alice", "pw1")
			.await
			.unwrap();
		assert_eq!(principal.address, addr(1));
		assert!(store
			.authenticate(Role::Customer, "alice", "pw2")
			.await
			.is_err());
	}

	#[tokio::test]
	async fn same_username_is_allowed_across_role_partitions() {
		let store = CredentialStore::new();
		store
			.register(Role::Customer, "acme", "pw", addr(1), None)
			.await
			.unwrap();
		store
			.register(Role::Business, "acme", "pw", addr(2), Some("Acme".into()))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn missing_fields_are_rejected_before_mutation() {
		let store = CredentialStore::new();
		assert!(matches!(
			store.register(Role::Customer, "  ", "pw", addr(1), None).await,
			Err(StoreError::MissingField("username"))
		));
		assert!(matches!(
			store.register(Role::Customer, "bob", "", addr(1), None).await,
			Err(StoreError::MissingField("password"))
		));
		assert!(matches!(
			store
				.register(Role::Business, "acme", "pw", addr(1), None)
				.await,
			Err(StoreError::MissingField("name"))
		));
		assert!(store.find(Role::Business, "acme").await.is_none());
	}

	#[tokio::test]
	async fn unknown_user_and_wrong_password_are_indistinguishable() {
		let store = CredentialStore::new();
		store
			.register(Role::Customer, "alice", "pw", addr(1), None)
			.await
			.unwrap();

		let unknown = store
			.authenticate(Role::Customer, "nobody", "pw")
			.await
			.unwrap_err();
		let wrong = store
			.authenticate(Role::Customer, "alice", "bad")
			.await
			.unwrap_err();
		assert_eq!(unknown.to_string(), wrong.to_string());
	}

	#[tokio::test]
	async fn passwords_are_stored_hashed() {
		let store = CredentialStore::new();
		let principal = store
			.register(Role::Customer, "alice", "secret", addr(1), None)
			.await
			.unwrap();
		assert!(!principal.password_hash.contains("secret"));
		assert!(principal.password_hash.starts_with("$argon2"));
	}

	#[tokio::test]
	async fn businesses_lists_only_businesses_sorted() {
		let store = CredentialStore::new();
		store
			.register(Role::Business, "zeta", "pw", addr(3), Some("Zeta".into()))
			.await
			.unwrap();
		store
			.register(Role::Customer, "alice", "pw", addr(1), None)
			.await
			.unwrap();
		store
			.register(Role::Business, "acme", "pw", addr(2), Some("Acme".into()))
			.await
			.unwrap();

		let businesses = store.businesses().await;
		let names: Vec<&str> = businesses.iter().map(|p| p.username.as_str()).collect();
		assert_eq!(names, vec!["acme", "zeta"]);
	}
}
