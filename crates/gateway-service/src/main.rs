//! Main entry point for the loyalty gateway service.
//!
//! Loads configuration, connects the ledger client (contract bindings left
//! unconfigured stay disabled rather than failing startup), generates the
//! admin bootstrap credentials, and serves the HTTP API.

use clap::Parser;
use gateway_config::Config;
use gateway_ledger::EvmLedger;
use gateway_service::auth::{AdminAccess, JwtService};
use gateway_service::store::CredentialStore;
use gateway_service::{start_server, AppState};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments for the gateway service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to the TOML configuration file
	#[arg(short, long, default_value = "gateway.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
	fmt().with_env_filter(env_filter).with_target(true).init();

	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration from {}", args.config.display());

	let ledger = EvmLedger::connect(&config).await?;
	tracing::info!(operator = %ledger.operator(), "Connected ledger client");

	let admin = AdminAccess::generate()?;
	tracing::info!("Admin password generated; retrieve it once via GET /api/admin/password");

	let state = AppState {
		store: Arc::new(CredentialStore::new()),
		jwt: Arc::new(JwtService::new(&config.auth)),
		ledger: Arc::new(ledger),
		admin: Arc::new(admin),
	};

	start_server(&config.api, state).await
}
