//! Reservation endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use super::SuccessResponse;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{Reservation, ReservationRequest};

/// POST /make_reservation
async fn make_reservation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;
    let key = req.into_key()?;

    match state.bays().reserve(&key, state.reservation_mode).await? {
        Reservation::Reserved => Ok(Json(SuccessResponse::ok())),
        Reservation::AlreadyTaken => Err(ApiError::NotAvailable),
        Reservation::NotFound => Err(ApiError::NotFound),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/make_reservation", post(make_reservation))
}
