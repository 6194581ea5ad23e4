//! Session token service and admin bootstrap credentials.
//!
//! Tokens are stateless JWTs signed with a process-wide secret. Unless a
//! secret is configured, one is generated at startup, so a restart
//! invalidates every outstanding session.

pub mod middleware;

pub use middleware::{require_role, AuthState};

use chrono::{Duration, Utc};
use gateway_types::{ApiError, AuthConfig, Claims, Role};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Mutex;

/// Service for issuing and verifying session tokens.
pub struct JwtService {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	issuer: String,
	token_expiry_hours: u32,
}

impl JwtService {
	/// Creates the token service from configuration.
	pub fn new(config: &AuthConfig) -> Self {
		let secret = config
			.secret
			.clone()
			.unwrap_or_else(|| random_string(64));

		let mut validation = Validation::new(Algorithm::HS256);
		validation.set_issuer(&[config.issuer.clone()]);
		validation.leeway = 0;

		Self {
			encoding_key: EncodingKey::from_secret(secret.as_bytes()),
			decoding_key: DecodingKey::from_secret(secret.as_bytes()),
			validation,
			issuer: config.issuer.clone(),
			token_expiry_hours: config.token_expiry_hours,
		}
	}

	/// Issues a token binding username, role, and on-chain address.
	pub fn issue(&self, username: &str, role: Role, address: &str) -> Result<String, ApiError> {
		let ttl = i64::from(self.token_expiry_hours).saturating_mul(3600);
		self.issue_with_ttl_seconds(username, role, address, ttl)
	}

	/// Issues a token with an explicit TTL in seconds.
	pub fn issue_with_ttl_seconds(
		&self,
		username: &str,
		role: Role,
		address: &str,
		ttl_seconds: i64,
	) -> Result<String, ApiError> {
		let now = Utc::now();
		let claims = Claims {
			sub: username.to_string(),
			role,
			address: address.to_string(),
			exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
			iat: now.timestamp(),
			iss: self.issuer.clone(),
		};
		encode(&Header::default(), &claims, &self.encoding_key)
			.map_err(|e| ApiError::Internal(format!("Failed to generate token: {e}")))
	}

	/// Verifies a token and returns its claims.
	///
	/// Every verification failure (malformed, bad signature, expired, wrong
	/// issuer) maps to the same error so the cause is not leaked.
	pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
		decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|_| ApiError::Auth("Invalid or expired token".to_string()))
	}
}

/// Admin credentials generated once at startup.
///
/// The password is never persisted; it can be read exactly once through the
/// dedicated endpoint, and logins verify against an argon2 hash.
pub struct AdminAccess {
	password_hash: String,
	handout: Mutex<Option<String>>,
}

impl AdminAccess {
	/// Generates a fresh random admin password.
	///
	/// A hashing failure is fatal: an unverifiable hash would silently lock
	/// out every admin login.
	pub fn generate() -> Result<Self, ApiError> {
		Self::with_password(random_string(24))
	}

	fn with_password(password: String) -> Result<Self, ApiError> {
		use argon2::password_hash::rand_core::OsRng;
		use argon2::password_hash::{PasswordHasher, SaltString};

		let salt = SaltString::generate(&mut OsRng);
		let password_hash = argon2::Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map(|h| h.to_string())
			.map_err(|e| ApiError::Internal(format!("Failed to hash admin password: {e}")))?;
		Ok(Self {
			password_hash,
			handout: Mutex::new(Some(password)),
		})
	}

	/// Hands out the plaintext password; subsequent calls return `None`.
	pub fn take_password(&self) -> Option<String> {
		self.handout
			.lock()
			.map(|mut slot| slot.take())
			.unwrap_or(None)
	}

	/// Verifies a login attempt against the stored hash.
	pub fn verify(&self, candidate: &str) -> bool {
		use argon2::password_hash::{PasswordHash, PasswordVerifier};

		let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
			return false;
		};
		argon2::Argon2::default()
			.verify_password(candidate.as_bytes(), &parsed)
			.is_ok()
	}
}

fn random_string(len: usize) -> String {
	rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(len)
		.map(char::from)
		.collect()
}
