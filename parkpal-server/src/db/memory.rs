//! In-memory backend.
//!
//! Stands in for the relational store during local development and tests.
//! The table is a `Vec` behind a `tokio::sync::Mutex`; each session method
//! takes the lock for exactly one statement, so a read followed by a write
//! behaves like two separate statements against a real database.
//!
//! - **Not durable**: all rows are lost on restart.
//! - **Outages**: [`MemoryConnector::set_available`] makes `acquire` fail
//!   with a connection error; [`MemoryConnector::set_failing`] makes every
//!   statement on an open session fail with a query error.
//! - **Interleaving**: [`MemoryConnector::with_read_gate`] parks every
//!   status read on a barrier, which forces concurrent legacy reservations
//!   to all read before any of them writes.
//! - **Accounting**: [`MemoryConnector::open_sessions`] counts sessions
//!   acquired but not yet closed; [`MemoryConnector::rows_written`] counts
//!   rows changed by updates and inserts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Barrier, Mutex, MutexGuard};

use super::connector::{BaySession, Connector, StoreError};
use crate::models::{BayKey, BayStatus, NewBay, ParkingBay};

/// In-memory `carpark` table.
#[derive(Clone)]
pub struct MemoryConnector {
    rows: Arc<Mutex<Vec<ParkingBay>>>,
    available: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
    open_sessions: Arc<AtomicUsize>,
    rows_written: Arc<AtomicUsize>,
    enforce_unique: bool,
    read_gate: Option<Arc<Barrier>>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnector {
    /// Empty table with the (car park, bay) uniqueness constraint.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
            failing: Arc::new(AtomicBool::new(false)),
            open_sessions: Arc::new(AtomicUsize::new(0)),
            rows_written: Arc::new(AtomicUsize::new(0)),
            enforce_unique: true,
            read_gate: None,
        }
    }

    /// Replace the table contents.
    pub fn with_rows(mut self, rows: Vec<ParkingBay>) -> Self {
        self.rows = Arc::new(Mutex::new(rows));
        self
    }

    /// Accept duplicate (car park, bay) rows, like the legacy schema.
    pub fn without_unique_constraint(mut self) -> Self {
        self.enforce_unique = false;
        self
    }

    /// Make every status read wait on `gate` after reading.
    pub fn with_read_gate(mut self, gate: Arc<Barrier>) -> Self {
        self.read_gate = Some(gate);
        self
    }

    /// Simulate the store going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make statements on open sessions fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sessions acquired and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Rows changed by updates and inserts since creation.
    pub fn rows_written(&self) -> usize {
        self.rows_written.load(Ordering::SeqCst)
    }

    /// Copy of the current table.
    pub async fn rows(&self) -> Vec<ParkingBay> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn acquire(&self) -> Result<Box<dyn BaySession>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            tracing::error!("memory store unavailable");
            return Err(StoreError::connection("memory store unavailable"));
        }
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            store: self.clone(),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

struct MemorySession {
    store: MemoryConnector,
}

impl MemorySession {
    /// Lock the table for one statement, honouring the fault switch.
    async fn statement(&self) -> Result<MutexGuard<'_, Vec<ParkingBay>>, StoreError> {
        if self.store.failing.load(Ordering::SeqCst) {
            return Err(StoreError::query("memory store statement failed"));
        }
        Ok(self.store.rows.lock().await)
    }

    fn record_writes(&self, rows: u64) {
        self.store
            .rows_written
            .fetch_add(rows as usize, Ordering::SeqCst);
    }
}

#[async_trait]
impl BaySession for MemorySession {
    async fn bay_status(&mut self, key: &BayKey) -> Result<Option<BayStatus>, StoreError> {
        let status = {
            let rows = self.statement().await?;
            rows.iter().find(|r| &r.key == key).map(|r| r.status)
        };

        if let Some(gate) = &self.store.read_gate {
            gate.wait().await;
        }
        Ok(status)
    }

    async fn mark_reserved(&mut self, key: &BayKey) -> Result<u64, StoreError> {
        let affected = {
            let mut rows = self.statement().await?;
            let mut affected = 0;
            for row in rows.iter_mut().filter(|r| &r.key == key) {
                row.status = BayStatus::Reserved;
                affected += 1;
            }
            affected
        };
        self.record_writes(affected);
        Ok(affected)
    }

    async fn reserve_if_vacant(&mut self, key: &BayKey) -> Result<u64, StoreError> {
        // Only the row a status read would return is a candidate
        let affected = {
            let mut rows = self.statement().await?;
            match rows.iter_mut().find(|r| &r.key == key) {
                Some(row) if row.status.is_vacant() => {
                    row.status = BayStatus::Reserved;
                    1
                }
                _ => 0,
            }
        };
        self.record_writes(affected);
        Ok(affected)
    }

    async fn insert_bay(&mut self, bay: &NewBay) -> Result<(), StoreError> {
        {
            let mut rows = self.statement().await?;
            if self.store.enforce_unique && rows.iter().any(|r| r.key == bay.key) {
                return Err(StoreError::Duplicate {
                    key: bay.key.clone(),
                });
            }
            rows.push(ParkingBay::from(bay.clone()));
        }
        self.record_writes(1);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.store.open_sessions.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_bay(lot: &str, bay: &str, status: BayStatus) -> NewBay {
        NewBay {
            key: BayKey::new(lot, bay).unwrap(),
            location_x: None,
            location_y: None,
            status,
        }
    }

    #[tokio::test]
    async fn insert_then_read() {
        let store = MemoryConnector::new();
        let mut session = store.acquire().await.unwrap();
        let bay = new_bay("A", "1", BayStatus::Vacant);

        session.insert_bay(&bay).await.unwrap();
        assert_eq!(
            session.bay_status(&bay.key).await.unwrap(),
            Some(BayStatus::Vacant)
        );
        assert_eq!(store.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn unique_constraint_rejects_duplicates() {
        let store = MemoryConnector::new();
        let mut session = store.acquire().await.unwrap();
        let bay = new_bay("A", "1", BayStatus::Vacant);

        session.insert_bay(&bay).await.unwrap();
        let err = session.insert_bay(&bay).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn legacy_schema_keeps_duplicates_and_reads_first() {
        let store = MemoryConnector::new().without_unique_constraint();
        let mut session = store.acquire().await.unwrap();

        session
            .insert_bay(&new_bay("A", "1", BayStatus::Reserved))
            .await
            .unwrap();
        session
            .insert_bay(&new_bay("A", "1", BayStatus::Vacant))
            .await
            .unwrap();

        let key = BayKey::new("A", "1").unwrap();
        assert_eq!(store.rows().await.len(), 2);
        assert_eq!(
            session.bay_status(&key).await.unwrap(),
            Some(BayStatus::Reserved)
        );
    }

    #[tokio::test]
    async fn conditional_update_skips_taken_rows() {
        let store = MemoryConnector::new();
        let mut session = store.acquire().await.unwrap();
        let bay = new_bay("A", "1", BayStatus::Reserved);
        session.insert_bay(&bay).await.unwrap();

        assert_eq!(session.reserve_if_vacant(&bay.key).await.unwrap(), 0);
        assert_eq!(session.mark_reserved(&bay.key).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn conditional_update_only_considers_first_match() {
        let store = MemoryConnector::new().without_unique_constraint();
        let mut session = store.acquire().await.unwrap();
        session
            .insert_bay(&new_bay("A", "1", BayStatus::Reserved))
            .await
            .unwrap();
        session
            .insert_bay(&new_bay("A", "1", BayStatus::Vacant))
            .await
            .unwrap();

        let key = BayKey::new("A", "1").unwrap();
        assert_eq!(session.reserve_if_vacant(&key).await.unwrap(), 0);
        assert_eq!(store.rows().await[1].status, BayStatus::Vacant);
    }

    #[tokio::test]
    async fn sessions_and_writes_are_counted() {
        let store = MemoryConnector::new();
        let mut session = store.acquire().await.unwrap();
        assert_eq!(store.open_sessions(), 1);

        let bay = new_bay("A", "1", BayStatus::Vacant);
        session.insert_bay(&bay).await.unwrap();
        session.reserve_if_vacant(&bay.key).await.unwrap();
        session.reserve_if_vacant(&bay.key).await.unwrap();
        assert_eq!(store.rows_written(), 2);

        session.close().await.unwrap();
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn failing_store_rejects_statements() {
        let store = MemoryConnector::new();
        let mut session = store.acquire().await.unwrap();
        store.set_failing(true);

        let key = BayKey::new("A", "1").unwrap();
        let err = session.bay_status(&key).await.unwrap_err();
        assert!(matches!(err, StoreError::Query { .. }));

        store.set_failing(false);
        assert_eq!(session.bay_status(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unavailable_store_fails_acquire() {
        let store = MemoryConnector::new();
        store.set_available(false);
        let err = store.acquire().await.err().unwrap();
        assert!(matches!(err, StoreError::Connection { .. }));

        store.set_available(true);
        assert!(store.acquire().await.is_ok());
    }
}
