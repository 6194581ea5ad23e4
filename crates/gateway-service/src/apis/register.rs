//! Registration, login, and the one-shot admin password endpoint.

use crate::server::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gateway_types::{
	parse_address, AdminPasswordResponse, ApiError, LoginRequest, LoginResponse, MessageResponse,
	RegisterRequest, Role,
};

/// Handles `POST /api/register/customer`.
pub async fn register_customer(
	State(state): State<AppState>,
	Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
	let address = parse_address(&request.address)?;
	state
		.store
		.register(Role::Customer, &request.username, &request.password, address, None)
		.await?;
	tracing::info!(username = %request.username, "Registered customer");
	Ok((
		StatusCode::CREATED,
		Json(MessageResponse::new("Customer registered successfully")),
	))
}

/// Handles `POST /api/register/business`.
pub async fn register_business(
	State(state): State<AppState>,
	Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
	let address = parse_address(&request.address)?;
	state
		.store
		.register(
			Role::Business,
			&request.username,
			&request.password,
			address,
			request.name,
		)
		.await?;
	tracing::info!(username = %request.username, "Registered business");
	Ok((
		StatusCode::CREATED,
		Json(MessageResponse::new("Business registered successfully")),
	))
}

/// Handles `POST /api/login` for all three roles.
///
/// Admin logins are checked against the startup-generated password; customer
/// and business logins go through the credential store.
pub async fn login(
	State(state): State<AppState>,
	Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
	let role: Role = request
		.role
		.parse()
		.map_err(|_| ApiError::Validation(format!("Unknown role: {}", request.role)))?;

	match role {
		Role::Admin => {
			if !state.admin.verify(&request.password) {
				return Err(ApiError::Auth("Invalid credentials".to_string()));
			}
			let token = state.jwt.issue(&request.username, Role::Admin, "")?;
			Ok(Json(LoginResponse {
				token,
				role: Role::Admin,
				address: None,
			}))
		},
		_ => {
			let principal = state
				.store
				.authenticate(role, &request.username, &request.password)
				.await?;
			let address = principal.address.to_string();
			let token = state.jwt.issue(&principal.username, role, &address)?;
			Ok(Json(LoginResponse {
				token,
				role,
				address: Some(address),
			}))
		},
	}
}

/// Handles `GET /api/admin/password`.
///
/// Exposes the startup-generated admin password exactly once. A deliberately
/// weak bootstrap scheme kept for parity with the admin dashboard flow.
pub async fn admin_password(
	State(state): State<AppState>,
) -> Result<Json<AdminPasswordResponse>, ApiError> {
	match state.admin.take_password() {
		Some(password) => Ok(Json(AdminPasswordResponse { password })),
		None => Err(ApiError::NotFound(
			"Admin password has already been retrieved".to_string(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::test_state;

	fn register_request(username: &str, address: &str, name: Option<&str>) -> RegisterRequest {
		RegisterRequest {
			username: username.to_string(),
			password: "hunter22".to_string(),
			address: address.to_string(),
			name: name.map(str::to_string),
		}
	}

	#[tokio::test]
	async fn duplicate_customer_registration_conflicts() {
		let (state, _) = test_state();
		let addr = "0x1111111111111111111111111111111111111111";

		let (status, _) = register_customer(
			State(state.clone()),
			Json(register_request("alice", addr, None)),
		)
		.await
		.unwrap();
		assert_eq!(status, StatusCode::CREATED);

		let err = register_customer(State(state), Json(register_request("alice", addr, None)))
			.await
			.unwrap_err();
		assert_eq!(err.status_code(), 409);
	}

	#[tokio::test]
	async fn bad_address_is_rejected_before_the_store() {
		let (state, _) = test_state();
		let err = register_customer(
			State(state.clone()),
			Json(register_request("alice", "0x123", None)),
		)
		.await
		.unwrap_err();
		assert_eq!(err.status_code(), 400);
		assert!(state.store.find(Role::Customer, "alice").await.is_none());
	}

	#[tokio::test]
	async fn business_registration_requires_a_name() {
		let (state, _) = test_state();
		let err = register_business(
			State(state),
			Json(register_request(
				"acme",
				"0x2222222222222222222222222222222222222222",
				None,
			)),
		)
		.await
		.unwrap_err();
		assert_eq!(err.status_code(), 400);
	}

	#[tokio::test]
	async fn login_issues_token_with_role_and_address() {
		let (state, _) = test_state();
		let addr = "0x1111111111111111111111111111111111111111";
		register_customer(State(state.clone()), Json(register_request("alice", addr, None)))
			.await
			.unwrap();

		let Json(response) = login(
			State(state.clone()),
			Json(LoginRequest {
				username: "alice".to_string(),
				password: "hunter22".to_string(),
				role: "customer".to_string(),
			}),
		)
		.await
		.unwrap();
		assert_eq!(response.role, Role::Customer);
		let claims = state.jwt.verify(&response.token).unwrap();
		assert_eq!(claims.sub, "alice");
		assert_eq!(Some(claims.address), response.address);
	}

	#[tokio::test]
	async fn login_with_wrong_password_or_unknown_role_fails() {
		let (state, _) = test_state();
		let addr = "0x1111111111111111111111111111111111111111";
		register_customer(State(state.clone()), Json(register_request("alice", addr, None)))
			.await
			.unwrap();

		let err = login(
			State(state.clone()),
			Json(LoginRequest {
				username: "alice".to_string(),
				password: "wrong".to_string(),
				role: "customer".to_string(),
			}),
		)
		.await
		.unwrap_err();
		assert_eq!(err.status_code(), 401);

		let err = login(
			State(state),
			Json(LoginRequest {
				username: "alice".to_string(),
				password: "hunter22".to_string(),
				role: "superuser".to_string(),
			}),
		)
		.await
		.unwrap_err();
		assert_eq!(err.status_code(), 400);
	}

	#[tokio::test]
	async fn admin_logs_in_with_generated_password() {
		let (state, _) = test_state();
		let Json(handout) = admin_password(State(state.clone())).await.unwrap();

		let Json(response) = login(
			State(state.clone()),
			Json(LoginRequest {
				username: "admin".to_string(),
				password: handout.password,
				role: "admin".to_string(),
			}),
		)
		.await
		.unwrap();
		assert_eq!(response.role, Role::Admin);
		assert!(response.address.is_none());

		// The handout endpoint is one-shot
		let err = admin_password(State(state)).await.unwrap_err();
		assert_eq!(err.status_code(), 404);
	}
}
