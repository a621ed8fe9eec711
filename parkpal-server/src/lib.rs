//! parkpal-server: HTTP service for parking bay availability and reservations
//!
//! One table (`carpark`), three endpoints. Every request opens its own
//! store connection; the service keeps no state between requests.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{ConfigError, DatabaseConfig, DatabaseSettings, ReservationMode, StoreBackend};
pub use db::{BayRepo, Connector, MemoryConnector, PgConnector, StoreError};
pub use http::{build_router, run_server, AppState, ServerConfig};
