//! Postgres backend
//!
//! Opens a plain `PgConnection` per request (no pool) from the configured
//! credentials. Every statement binds its parameters.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection as _;

use super::connector::{BaySession, Connector, StoreError};
use crate::config::DatabaseConfig;
use crate::models::{BayKey, BayStatus, NewBay};

/// Opens one Postgres connection per session.
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
    connect_timeout: Duration,
    target: String,
}

impl PgConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            options: config.connect_options(),
            connect_timeout: config.connect_timeout,
            target: format!("{}:{}/{}", config.host, config.port, config.database),
        }
    }

    /// Open a raw connection, bounded by the connect timeout.
    pub async fn connect(&self) -> Result<PgConnection, StoreError> {
        let attempt = PgConnection::connect_with(&self.options);
        match tokio::time::timeout(self.connect_timeout, attempt).await {
            Ok(Ok(conn)) => {
                tracing::debug!(target_db = %self.target, "database connection opened");
                Ok(conn)
            }
            Ok(Err(e)) => {
                tracing::error!(target_db = %self.target, error = %e, "database connection failed");
                Err(StoreError::connection(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    target_db = %self.target,
                    timeout_secs = self.connect_timeout.as_secs(),
                    "database connection timed out"
                );
                Err(StoreError::connection(format!(
                    "timed out after {}s",
                    self.connect_timeout.as_secs()
                )))
            }
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn acquire(&self) -> Result<Box<dyn BaySession>, StoreError> {
        let conn = self.connect().await?;
        Ok(Box::new(PgSession { conn }))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// A single open Postgres connection.
pub struct PgSession {
    conn: PgConnection,
}

#[async_trait]
impl BaySession for PgSession {
    async fn bay_status(&mut self, key: &BayKey) -> Result<Option<BayStatus>, StoreError> {
        // LIMIT 1: without a uniqueness constraint the first row wins
        let code = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT baystatus FROM carpark
            WHERE carparkname = $1 AND carparkbay = $2
            LIMIT 1
            "#,
        )
        .bind(key.lot())
        .bind(key.bay())
        .fetch_optional(&mut self.conn)
        .await
        .map_err(classify)?;

        Ok(code.map(BayStatus::from_stored))
    }

    async fn mark_reserved(&mut self, key: &BayKey) -> Result<u64, StoreError> {
        let mut tx = self.conn.begin().await.map_err(classify)?;

        let done = sqlx::query(
            r#"
            UPDATE carpark SET baystatus = $3
            WHERE carparkname = $1 AND carparkbay = $2
            "#,
        )
        .bind(key.lot())
        .bind(key.bay())
        .bind(BayStatus::Reserved.code())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(done.rows_affected())
    }

    async fn reserve_if_vacant(&mut self, key: &BayKey) -> Result<u64, StoreError> {
        // Target the same row `bay_status` reads, then test it is still vacant
        let done = sqlx::query(
            r#"
            UPDATE carpark SET baystatus = $3
            WHERE ctid = (
                SELECT ctid FROM carpark
                WHERE carparkname = $1 AND carparkbay = $2
                LIMIT 1
                FOR UPDATE
            )
            AND baystatus = $4
            "#,
        )
        .bind(key.lot())
        .bind(key.bay())
        .bind(BayStatus::Reserved.code())
        .bind(BayStatus::Vacant.code())
        .execute(&mut self.conn)
        .await
        .map_err(classify)?;

        Ok(done.rows_affected())
    }

    async fn insert_bay(&mut self, bay: &NewBay) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO carpark (carparkname, carparkbay, location_x, location_y, baystatus)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(bay.key.lot())
        .bind(bay.key.bay())
        .bind(bay.location_x)
        .bind(bay.location_y)
        .bind(bay.status.code())
        .execute(&mut self.conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate {
                    key: bay.key.clone(),
                })
            }
            Err(e) => Err(classify(e)),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        let session = *self;
        session.conn.close().await.map_err(classify)
    }
}

/// Split sqlx errors into "lost the connection" and "statement failed".
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        e @ (sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed) => StoreError::connection(e.to_string()),
        e => StoreError::query(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseSettings, ReservationMode};
    use crate::db::migrations;
    use crate::db::repos::BayRepo;
    use crate::models::Reservation;

    // Integration tests require a real database
    // Run with: DB_USER=... DB_PASSWORD=... DB_NAME=... cargo test -p parkpal-server -- --ignored

    fn env_config() -> DatabaseConfig {
        DatabaseConfig::from_settings(DatabaseSettings {
            host: std::env::var("DB_HOST").ok(),
            port: std::env::var("DB_PORT").ok().and_then(|p| p.parse().ok()),
            user: std::env::var("DB_USER").ok(),
            password: std::env::var("DB_PASSWORD").ok(),
            database: std::env::var("DB_NAME").ok(),
            connect_timeout_secs: None,
        })
        .expect("DB_USER, DB_PASSWORD and DB_NAME required")
    }

    fn unique_lot(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{}-{}", prefix, nanos)
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connection_error() {
        let config = DatabaseConfig::from_settings(DatabaseSettings {
            host: Some("127.0.0.1".into()),
            port: Some(1),
            user: Some("nobody".into()),
            password: Some("nothing".into()),
            database: Some("nowhere".into()),
            connect_timeout_secs: Some(2),
        })
        .unwrap();

        let err = PgConnector::new(&config).acquire().await.err().unwrap();
        assert!(matches!(err, StoreError::Connection { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn reserve_if_vacant_only_matches_vacant_rows() {
        let connector = PgConnector::new(&env_config());
        migrations::run(&connector).await.expect("migration failed");

        let key = BayKey::new(unique_lot("pg-cas"), "1").unwrap();
        let mut session = connector.acquire().await.expect("connect failed");
        session
            .insert_bay(&NewBay {
                key: key.clone(),
                location_x: None,
                location_y: Some(1.5),
                status: BayStatus::Vacant,
            })
            .await
            .expect("insert failed");

        assert_eq!(session.reserve_if_vacant(&key).await.unwrap(), 1);
        assert_eq!(session.reserve_if_vacant(&key).await.unwrap(), 0);
        assert_eq!(
            session.bay_status(&key).await.unwrap(),
            Some(BayStatus::Reserved)
        );
        session.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_insert_hits_unique_constraint() {
        let connector = PgConnector::new(&env_config());
        migrations::run(&connector).await.expect("migration failed");

        let bay = NewBay {
            key: BayKey::new(unique_lot("pg-dup"), "1").unwrap(),
            location_x: None,
            location_y: None,
            status: BayStatus::Vacant,
        };
        let mut session = connector.acquire().await.expect("connect failed");
        session.insert_bay(&bay).await.expect("first insert failed");

        let err = session.insert_bay(&bay).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_atomic_reserves_book_once() {
        let connector = PgConnector::new(&env_config());
        migrations::run(&connector).await.expect("migration failed");

        let key = BayKey::new(unique_lot("pg-race"), "1").unwrap();
        BayRepo::new(&connector)
            .insert(&NewBay {
                key: key.clone(),
                location_x: None,
                location_y: None,
                status: BayStatus::Vacant,
            })
            .await
            .expect("insert failed");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let connector = connector.clone();
                let key = key.clone();
                tokio::spawn(async move {
                    BayRepo::new(&connector)
                        .reserve(&key, ReservationMode::Atomic)
                        .await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap().expect("reserve failed"));
        }

        let reserved = outcomes
            .iter()
            .filter(|o| **o == Reservation::Reserved)
            .count();
        let taken = outcomes
            .iter()
            .filter(|o| **o == Reservation::AlreadyTaken)
            .count();
        assert_eq!(reserved, 1);
        assert_eq!(taken, 7);
    }
}
