//! Provisioning endpoint
//!
//! Kept as a GET with query parameters for compatibility with existing
//! provisioning scripts.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};

use super::SuccessResponse;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::AddSpotParams;

/// GET /add_parking_spot?carparkname=&carparkbay=&location_x=&location_y=&baystatus=
async fn add_parking_spot(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AddSpotParams>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Query(params) = params?;
    let bay = params.into_new_bay()?;

    state.bays().insert(&bay).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/add_parking_spot", get(add_parking_spot))
}
