//! HTTP server for the loyalty gateway API.

use crate::apis::{admin, business, customer, public, register};
use crate::auth::{require_role, AdminAccess, AuthState, JwtService};
use crate::store::CredentialStore;
use axum::routing::{get, post};
use axum::{middleware, Router};
use gateway_config::ApiConfig;
use gateway_ledger::Ledger;
use gateway_types::Role;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// In-process principal registry.
	pub store: Arc<CredentialStore>,
	/// Session token service.
	pub jwt: Arc<JwtService>,
	/// Remote ledger client.
	pub ledger: Arc<dyn Ledger>,
	/// Startup-generated admin credentials.
	pub admin: Arc<AdminAccess>,
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
	let admin_auth = AuthState {
		jwt: state.jwt.clone(),
		required_role: Role::Admin,
	};
	let business_auth = AuthState {
		jwt: state.jwt.clone(),
		required_role: Role::Business,
	};
	let customer_auth = AuthState {
		jwt: state.jwt.clone(),
		required_role: Role::Customer,
	};

	let admin_routes = Router::new()
		// The password handout is the bootstrap path, so it stays open
		.route("/password", get(register::admin_password))
		.merge(
			Router::new()
				.route("/businesses", get(admin::list_businesses))
				.route("/approve-business", post(admin::approve_business))
				.route("/register-business", post(admin::register_business_on_chain))
				.route("/mint", post(admin::mint))
				.route_layer(middleware::from_fn_with_state(admin_auth, require_role)),
		);

	let business_routes = Router::new()
		.route("/register-on-chain", post(business::register_on_chain))
		.route("/create-voucher", post(business::create_voucher))
		.route("/toggle-voucher/{id}", post(business::toggle_voucher))
		.route("/vouchers", get(business::list_vouchers))
		.route("/fulfill-redemption/{id}", post(business::fulfill_redemption))
		.route_layer(middleware::from_fn_with_state(business_auth, require_role));

	let customer_routes = Router::new()
		.route("/balance", get(customer::balance))
		.route("/available-vouchers", get(customer::available_vouchers))
		.route("/redeem-voucher/{id}", post(customer::redeem_voucher))
		.route("/redemptions", get(customer::redemptions))
		.route_layer(middleware::from_fn_with_state(customer_auth, require_role));

	let api = Router::new()
		.route("/register/customer", post(register::register_customer))
		.route("/register/business", post(register::register_business))
		.route("/login", post(register::login))
		.route("/voucher/{id}", get(public::voucher_details))
		.route("/total-supply", get(public::total_supply))
		.route("/contract-status", get(public::contract_status))
		.nest("/admin", admin_routes)
		.nest("/business", business_routes)
		.nest("/customer", customer_routes);

	let cors = CorsLayer::new()
		.allow_origin(Any)
		.allow_methods(Any)
		.allow_headers(Any);

	Router::new()
		.route("/health", get(public::health))
		.nest("/api", api)
		.layer(cors)
		.with_state(state)
}

/// Starts the HTTP server and runs it until ctrl-c.
pub async fn start_server(
	api_config: &ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state);
	let addr = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&addr).await?;
	tracing::info!("API server listening on {addr}");

	axum::serve(listener, app)
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
			tracing::info!("Shutdown signal received");
		})
		.await?;
	Ok(())
}
