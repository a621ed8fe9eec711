//! Availability endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::AvailabilityParams;

/// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub is_available: bool,
}

/// GET /check_availability?carparkname=&carparkbay=
async fn check_availability(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AvailabilityParams>, QueryRejection>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let Query(params) = params?;
    let key = params.into_key()?;

    let status = state
        .bays()
        .query_status(&key)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(AvailabilityResponse {
        is_available: status.is_vacant(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/check_availability", get(check_availability))
}
