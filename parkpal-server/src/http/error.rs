//! API error types with IntoResponse
//!
//! Every failure is a JSON body of the form `{"error": "<message>"}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::StoreError;
use crate::models::{BayKey, ValidationError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Parameter validation failed (400)
    Validation(ValidationError),

    /// Body or query string could not be decoded (400)
    BadRequest { message: String },

    /// No bay matches (404)
    NotFound,

    /// Bay exists but is not vacant (409)
    NotAvailable,

    /// Bay already provisioned (409)
    Duplicate { key: BayKey },

    /// Store unreachable (500, logged)
    Connection { reason: String },

    /// Statement failed (500, logged)
    Query { reason: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotAvailable | Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::Connection { .. } | Self::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::BadRequest { message } => message.clone(),
            Self::NotFound => "Parking spot not found".into(),
            Self::NotAvailable => "Spot not available".into(),
            Self::Duplicate { .. } => "Parking spot already exists".into(),
            Self::Connection { .. } => "Database connection failed".into(),
            Self::Query { .. } => "Database query failed".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log the actual cause, return the generic message
        match &self {
            Self::Connection { reason } => {
                tracing::error!("Database connection error: {}", reason);
            }
            Self::Query { reason } => {
                tracing::error!("Database query error: {}", reason);
            }
            Self::Duplicate { key } => {
                tracing::debug!(bay = %key, "duplicate parking spot rejected");
            }
            _ => {}
        }

        let body = json!({ "error": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Connection { reason } => Self::Connection { reason },
            StoreError::Query { reason } => Self::Query { reason },
            StoreError::Duplicate { key } => Self::Duplicate { key },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let (status, body) =
            body_json(ApiError::Validation(ValidationError::Empty { field: "carparkname" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "carparkname is required");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_json(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Parking spot not found" }));
    }

    #[tokio::test]
    async fn not_available_is_409() {
        let (status, body) = body_json(ApiError::NotAvailable).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "error": "Spot not available" }));
    }

    #[tokio::test]
    async fn connection_error_hides_cause() {
        let err: ApiError = StoreError::connection("password authentication failed").into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Database connection failed" }));
    }

    #[tokio::test]
    async fn duplicate_is_409() {
        let err: ApiError = StoreError::Duplicate {
            key: BayKey::new("A", "1").unwrap(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
