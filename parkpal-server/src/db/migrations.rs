//! Schema setup for the `carpark` table

use sqlx::Connection as _;

use super::connector::StoreError;
use super::postgres::PgConnector;

/// Create the `carpark` table if it does not exist.
///
/// New tables get a UNIQUE (carparkname, carparkbay) constraint. Existing
/// tables are left alone, duplicates and all.
pub async fn run(connector: &PgConnector) -> Result<(), StoreError> {
    tracing::info!("Running carpark migrations...");

    let mut conn = connector.connect().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS carpark (
            carparkname TEXT NOT NULL,
            carparkbay TEXT NOT NULL,
            location_x DOUBLE PRECISION,
            location_y DOUBLE PRECISION,
            baystatus INTEGER NOT NULL DEFAULT 0,
            CONSTRAINT carpark_bay_key UNIQUE (carparkname, carparkbay)
        )
        "#,
    )
    .execute(&mut conn)
    .await
    .map_err(|e| StoreError::query(e.to_string()))?;

    conn.close()
        .await
        .map_err(|e| StoreError::connection(e.to_string()))?;

    tracing::info!("carpark migrations complete");
    Ok(())
}
