//! Route handlers organized by resource

pub mod index;
pub mod health;
pub mod availability;
pub mod reservations;
pub mod spots;

use serde::Serialize;

/// `{"success": true}` body shared by the write endpoints
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
