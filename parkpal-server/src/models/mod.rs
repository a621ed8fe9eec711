//! Domain models with validation at construction
//!
//! Request parameters arrive untyped; they are parsed into these types once,
//! at the HTTP boundary. Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod bay;
pub mod params;

pub use validation::ValidationError;
pub use bay::{BayKey, BayStatus, NewBay, ParkingBay, Reservation};
pub use params::{AddSpotParams, AvailabilityParams, ReservationRequest};
