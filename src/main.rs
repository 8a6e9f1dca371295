//! sse-staking-gateway server entry point.
//!
//! Loads configuration, wires the ledger and snapshot collaborators, and
//! starts the Axum HTTP server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use sse_staking_gateway::api;
use sse_staking_gateway::app_state::AppState;
use sse_staking_gateway::config::{LogFormat, StakingConfig};
use sse_staking_gateway::ledger::RpcLedger;
use sse_staking_gateway::service::StakingService;
use sse_staking_gateway::snapshot::FileSnapshotStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = StakingConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        rpc = %config.rpc_url,
        legacy_program = %config.programs.legacy,
        sustainable_program = %config.programs.sustainable,
        custodial = %config.custodial_authority.pubkey(),
        "starting sse-staking-gateway"
    );

    // Build collaborators
    let ledger = Arc::new(RpcLedger::new(
        config.rpc_url.clone(),
        Duration::from_secs(config.rpc_timeout_secs),
    ));
    let snapshots = Arc::new(FileSnapshotStore::new(
        config.migration_snapshot_path.clone(),
    ));

    // Build service layer
    let staking_service = Arc::new(StakingService::new(
        ledger,
        snapshots,
        config.programs,
        config.token_mint,
        config.token_decimals,
        config.custodial_authority.clone(),
    ));

    // Build router
    let app = api::build_app(
        AppState { staking_service },
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
