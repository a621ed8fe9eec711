//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use parkpal_server::db::migrations;
use parkpal_server::PgConnector;

use super::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create the carpark table on the configured database
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let db = args
        .db
        .into_config()
        .context("Invalid database configuration")?;

    migrations::run(&PgConnector::new(&db))
        .await
        .context("Migration failed")?;

    Ok(())
}
