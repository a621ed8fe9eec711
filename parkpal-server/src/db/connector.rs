//! Connection provider seam
//!
//! A [`Connector`] opens one session per request. Sessions expose exactly the
//! statements the repositories need, so the reservation logic can run against
//! Postgres or the in-memory table unchanged.

use async_trait::async_trait;

use crate::models::{BayKey, BayStatus, NewBay};

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store unreachable, timed out, or rejected the credentials.
    #[error("database connection failed: {reason}")]
    Connection { reason: String },

    /// Connected, but a statement failed.
    #[error("database query failed: {reason}")]
    Query { reason: String },

    /// Insert hit the (car park, bay) uniqueness constraint.
    #[error("bay already exists: {key}")]
    Duplicate { key: BayKey },
}

impl StoreError {
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    pub fn query(reason: impl Into<String>) -> Self {
        Self::Query {
            reason: reason.into(),
        }
    }
}

/// Opens sessions against the store.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a fresh session. Never retried internally.
    async fn acquire(&self) -> Result<Box<dyn BaySession>, StoreError>;

    fn backend_name(&self) -> &'static str;
}

/// One open connection to the store.
///
/// Dropping a session releases it; [`BaySession::close`] does so gracefully.
#[async_trait]
pub trait BaySession: Send {
    /// Status of the first row matching `key`, if any.
    async fn bay_status(&mut self, key: &BayKey) -> Result<Option<BayStatus>, StoreError>;

    /// Set every matching row to reserved, unconditionally, in its own
    /// committed transaction. Returns affected rows.
    async fn mark_reserved(&mut self, key: &BayKey) -> Result<u64, StoreError>;

    /// Reserve the row [`BaySession::bay_status`] would read, only if it is
    /// still vacant, as one statement. Other rows sharing the key are left
    /// alone. Returns affected rows (0 or 1).
    async fn reserve_if_vacant(&mut self, key: &BayKey) -> Result<u64, StoreError>;

    async fn insert_bay(&mut self, bay: &NewBay) -> Result<(), StoreError>;

    async fn close(self: Box<Self>) -> Result<(), StoreError>;
}
