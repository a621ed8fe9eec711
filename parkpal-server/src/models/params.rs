//! Request parameter structs
//!
//! Query strings and JSON bodies deserialize into these loosely typed
//! structs; `into_*` turns them into validated domain values. The literal
//! string "null" for a location means "no location".

use serde::Deserialize;

use super::{BayKey, BayStatus, NewBay, ValidationError};

/// Query for `GET /check_availability`
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    pub carparkname: Option<String>,
    pub carparkbay: Option<String>,
}

impl AvailabilityParams {
    pub fn into_key(self) -> Result<BayKey, ValidationError> {
        BayKey::new(
            self.carparkname.unwrap_or_default(),
            self.carparkbay.unwrap_or_default(),
        )
    }
}

/// Body for `POST /make_reservation`
#[derive(Debug, Deserialize)]
pub struct ReservationRequest {
    pub carparkname: String,
    pub carparkbay: String,
}

impl ReservationRequest {
    pub fn into_key(self) -> Result<BayKey, ValidationError> {
        BayKey::new(self.carparkname, self.carparkbay)
    }
}

/// Query for `GET /add_parking_spot`
#[derive(Debug, Default, Deserialize)]
pub struct AddSpotParams {
    pub carparkname: Option<String>,
    pub carparkbay: Option<String>,
    pub location_x: Option<String>,
    pub location_y: Option<String>,
    pub baystatus: Option<String>,
}

impl AddSpotParams {
    pub fn into_new_bay(self) -> Result<NewBay, ValidationError> {
        let key = BayKey::new(
            self.carparkname.unwrap_or_default(),
            self.carparkbay.unwrap_or_default(),
        )?;
        let location_x = parse_location("location_x", self.location_x)?;
        let location_y = parse_location("location_y", self.location_y)?;
        let status = parse_status(self.baystatus)?;

        Ok(NewBay {
            key,
            location_x,
            location_y,
            status,
        })
    }
}

fn parse_location(
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<f64>, ValidationError> {
    let raw = match raw {
        None => return Ok(None),
        Some(raw) => raw,
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ValidationError::NotANumber { field, value: raw }),
    }
}

fn parse_status(raw: Option<String>) -> Result<BayStatus, ValidationError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::Empty { field: "baystatus" })?;

    let code: i32 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidVariant {
            field: "baystatus",
            value: raw.clone(),
        })?;

    BayStatus::try_from(code)
}
