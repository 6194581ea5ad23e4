//! Axum middleware for session token authentication.
//!
//! Validates the `Bearer` token on every role-scoped request, enforces the
//! required role, and places the verified claims into request extensions.
//! Handlers take the acting address from those claims only.

use super::JwtService;
use axum::{
	extract::State,
	http::{HeaderMap, Method, Request},
	middleware::Next,
	response::{IntoResponse, Response},
};
use gateway_types::{ApiError, Role};
use std::sync::Arc;

/// Authentication state for middleware: token service plus required role.
#[derive(Clone)]
pub struct AuthState {
	/// Token service for verification
	pub jwt: Arc<JwtService>,
	/// Role required for the protected subtree
	pub required_role: Role,
}

/// Middleware that authenticates the request and enforces its role.
pub async fn require_role(
	State(state): State<AuthState>,
	mut request: Request<axum::body::Body>,
	next: Next,
) -> Response {
	// CORS preflight carries no credentials
	if request.method() == Method::OPTIONS {
		return next.run(request).await;
	}

	let Some(token) = extract_bearer_token(request.headers()) else {
		return ApiError::Auth("Missing or invalid Authorization header".to_string())
			.into_response();
	};

	let claims = match state.jwt.verify(token) {
		Ok(claims) => claims,
		Err(err) => return err.into_response(),
	};

	if claims.role != state.required_role {
		return ApiError::Forbidden(format!(
			"This endpoint requires the {} role",
			state.required_role
		))
		.into_response();
	}

	request.extensions_mut().insert(claims);
	next.run(request).await
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get("authorization")
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
}
