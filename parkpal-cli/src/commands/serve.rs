//! HTTP server command
//!
//! Resolves configuration, picks the store backend and runs the API server
//! until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use parkpal_server::{
    run_server, AppState, Connector, MemoryConnector, PgConnector, ReservationMode,
    ServerConfig, StoreBackend,
};

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "PARKPAL_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Reservation strategy: atomic (single conditional update) or legacy (read, then write)
    #[arg(long, env = "PARKPAL_RESERVATION_MODE", default_value = "atomic")]
    pub reservation_mode: ReservationMode,

    /// Store backend: postgres or memory (memory loses data on exit)
    #[arg(long, env = "PARKPAL_STORE", default_value = "postgres")]
    pub store: StoreBackend,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let connector: Arc<dyn Connector> = match args.store {
        StoreBackend::Postgres => {
            let db = args
                .db
                .into_config()
                .context("Invalid database configuration")?;
            tracing::info!(
                host = %db.host,
                port = db.port,
                database = %db.database,
                "Using postgres store"
            );
            Arc::new(PgConnector::new(&db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - data is lost on exit");
            Arc::new(MemoryConnector::new())
        }
    };

    if args.reservation_mode == ReservationMode::Legacy {
        tracing::warn!("Legacy reservation mode: concurrent requests can double-book a bay");
    }

    tracing::info!("Starting parkpal server on {}", args.bind);

    let state = AppState::new(connector, args.reservation_mode);
    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Run server (blocks until shutdown)
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
