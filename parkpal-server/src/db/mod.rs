//! Database layer - connection provider and repositories
//!
//! # Design Principles
//!
//! - One fresh connection per request, no pool, released on every exit path
//! - Lookups tolerate duplicate rows and take the first match
//! - Reservations are a single conditional UPDATE unless legacy mode is asked for
//! - No retries; failures surface to the caller

pub mod connector;
pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod repos;

pub use connector::{BaySession, Connector, StoreError};
pub use memory::MemoryConnector;
pub use postgres::PgConnector;
pub use repos::BayRepo;
