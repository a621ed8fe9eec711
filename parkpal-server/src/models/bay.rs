//! Parking bay model
//!
//! A bay is identified by the pair (car park name, bay id). The legacy table
//! carries no uniqueness constraint on that pair, so lookups take the first
//! matching row.

use std::fmt;

use super::ValidationError;

/// Maximum length for car park names and bay ids
const MAX_IDENT_LEN: usize = 255;

/// Occupancy status of a bay, stored as an integer in `baystatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayStatus {
    Vacant,
    Reserved,
}

impl BayStatus {
    /// Integer code written to the store.
    pub fn code(self) -> i32 {
        match self {
            Self::Vacant => 0,
            Self::Reserved => 1,
        }
    }

    /// Interpret a stored code. Anything but 0 counts as taken, since older
    /// rows may carry codes this service never writes.
    pub fn from_stored(code: i32) -> Self {
        if code == 0 {
            Self::Vacant
        } else {
            Self::Reserved
        }
    }

    pub fn is_vacant(self) -> bool {
        self == Self::Vacant
    }
}

impl TryFrom<i32> for BayStatus {
    type Error = ValidationError;

    /// Strict parse for client input: only 0 and 1 are accepted.
    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Vacant),
            1 => Ok(Self::Reserved),
            other => Err(ValidationError::InvalidVariant {
                field: "baystatus",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity of a bay: (car park name, bay id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BayKey {
    lot: String,
    bay: String,
}

impl BayKey {
    /// Create a key, rejecting empty or oversized identifiers.
    ///
    /// # Example
    /// ```
    /// use parkpal_server::models::BayKey;
    ///
    /// assert!(BayKey::new("A", "12").is_ok());
    /// assert!(BayKey::new("", "12").is_err());
    /// ```
    pub fn new(lot: impl Into<String>, bay: impl Into<String>) -> Result<Self, ValidationError> {
        let lot = check_ident(lot.into(), "carparkname")?;
        let bay = check_ident(bay.into(), "carparkbay")?;
        Ok(Self { lot, bay })
    }

    pub fn lot(&self) -> &str {
        &self.lot
    }

    pub fn bay(&self) -> &str {
        &self.bay
    }
}

impl fmt::Display for BayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.lot, self.bay)
    }
}

fn check_ident(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > MAX_IDENT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_IDENT_LEN,
        });
    }
    Ok(value)
}

/// A bay to be provisioned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBay {
    pub key: BayKey,
    pub location_x: Option<f64>,
    pub location_y: Option<f64>,
    pub status: BayStatus,
}

/// A stored row of the `carpark` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingBay {
    pub key: BayKey,
    pub location_x: Option<f64>,
    pub location_y: Option<f64>,
    pub status: BayStatus,
}

impl From<NewBay> for ParkingBay {
    fn from(bay: NewBay) -> Self {
        Self {
            key: bay.key,
            location_x: bay.location_x,
            location_y: bay.location_y,
            status: bay.status,
        }
    }
}

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The bay was vacant and is now reserved.
    Reserved,
    /// The bay exists but is not vacant; nothing was written.
    AlreadyTaken,
    /// No bay matches the key.
    NotFound,
}

impl Reservation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::AlreadyTaken => "already_taken",
            Self::NotFound => "not_found",
        }
    }
}
