//! Shape REST handlers.
//!
//! Bodies are taken as raw bytes so malformed JSON surfaces as a typed
//! `E_INVALID_BODY` error instead of the extractor's plain-text rejection.

#[cfg(test)]
#[path = "shapes_test.rs"]
mod shapes_test;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::shape::{self, ShapeError, ShapeRecord};
use crate::state::AppState;

impl ShapeError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Seed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingField(_)
            | Self::UnknownType(_)
            | Self::TooFewPoints { .. }
            | Self::InvalidBody(_)
            | Self::TypeImmutable { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ShapeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "shape request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "shape request rejected");
        }
        (status, Json(json!({ "error": self.error_code(), "message": self.to_string() }))).into_response()
    }
}

pub async fn list_shapes(State(state): State<AppState>) -> Json<Vec<ShapeRecord>> {
    Json(shape::list_shapes(&state).await)
}

pub async fn get_shape(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShapeRecord>, ShapeError> {
    Ok(Json(shape::get_shape(&state, &id).await?))
}

pub async fn create_shape(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ShapeRecord>), ShapeError> {
    let record = shape::create_shape(&state, &body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_shape(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ShapeRecord>, ShapeError> {
    Ok(Json(shape::update_shape(&state, &id, &body).await?))
}

pub async fn delete_shape(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ShapeError> {
    shape::delete_shape(&state, &id).await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
