//! Shared API types and the simple read-only handlers.

use crate::AppState;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gauntlet_scenario::{persona_template, PersonaTemplate, ValidationError};
use gauntlet_types::PersonaType;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    /// Scenario rejected at session setup. The body lists every issue.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err.to_string(), "issues": err.messages() }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Health check handler.
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "activeSessions": state.sessions.len(),
    }))
}

#[derive(Debug, Serialize)]
pub struct PersonasResponse {
    pub personas: Vec<PersonaTemplate>,
}

/// Handler for `GET /api/personas`.
pub async fn list_personas_handler() -> Json<PersonasResponse> {
    Json(PersonasResponse {
        personas: PersonaType::ALL.into_iter().map(persona_template).collect(),
    })
}
