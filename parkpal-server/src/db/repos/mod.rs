//! Repository implementations for database access
//!
//! Repositories borrow a [`Connector`](super::Connector) and open one session
//! per call, closing it on every path before returning.

pub mod bays;

pub use bays::BayRepo;
