//! Bay repository
//!
//! - query_status: point lookup, first matching row wins
//! - reserve: check-and-set, either as one conditional UPDATE (atomic) or as
//!   read-then-write (legacy, racy under concurrency)
//! - insert: pass-through provisioning

use crate::config::ReservationMode;
use crate::db::connector::{BaySession, Connector, StoreError};
use crate::models::{BayKey, BayStatus, NewBay, Reservation};

/// Bay repository
pub struct BayRepo<'a> {
    connector: &'a dyn Connector,
}

impl<'a> BayRepo<'a> {
    pub fn new(connector: &'a dyn Connector) -> Self {
        Self { connector }
    }

    /// Current status of a bay, `None` when no row matches.
    pub async fn query_status(&self, key: &BayKey) -> Result<Option<BayStatus>, StoreError> {
        let mut session = self.connector.acquire().await?;
        let result = session.bay_status(key).await;
        release(session).await;
        result
    }

    /// Reserve a bay if it is vacant.
    pub async fn reserve(
        &self,
        key: &BayKey,
        mode: ReservationMode,
    ) -> Result<Reservation, StoreError> {
        let mut session = self.connector.acquire().await?;
        let result = match mode {
            ReservationMode::Atomic => reserve_atomic(session.as_mut(), key).await,
            ReservationMode::Legacy => reserve_legacy(session.as_mut(), key).await,
        };
        release(session).await;

        if let Ok(outcome) = &result {
            tracing::info!(
                lot = %key.lot(),
                bay = %key.bay(),
                mode = %mode,
                outcome = outcome.as_str(),
                "reservation processed"
            );
        }
        result
    }

    /// Insert a new bay. No existence check beyond the schema's own.
    pub async fn insert(&self, bay: &NewBay) -> Result<(), StoreError> {
        let mut session = self.connector.acquire().await?;
        let result = session.insert_bay(bay).await;
        release(session).await;

        if result.is_ok() {
            tracing::info!(
                lot = %bay.key.lot(),
                bay = %bay.key.bay(),
                status = bay.status.code(),
                "parking spot added"
            );
        }
        result
    }
}

/// One conditional UPDATE decides; a follow-up read only classifies a miss.
async fn reserve_atomic(
    session: &mut dyn BaySession,
    key: &BayKey,
) -> Result<Reservation, StoreError> {
    if session.reserve_if_vacant(key).await? > 0 {
        return Ok(Reservation::Reserved);
    }

    match session.bay_status(key).await? {
        None => Ok(Reservation::NotFound),
        Some(_) => Ok(Reservation::AlreadyTaken),
    }
}

/// Read, then write. The gap between the two statements is a race window.
async fn reserve_legacy(
    session: &mut dyn BaySession,
    key: &BayKey,
) -> Result<Reservation, StoreError> {
    match session.bay_status(key).await? {
        None => Ok(Reservation::NotFound),
        Some(status) if !status.is_vacant() => Ok(Reservation::AlreadyTaken),
        Some(_) => {
            session.mark_reserved(key).await?;
            Ok(Reservation::Reserved)
        }
    }
}

async fn release(session: Box<dyn BaySession>) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close database session");
    }
}
