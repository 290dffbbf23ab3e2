//! HTTP error mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Errors returned by request handlers, rendered as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid input (400)
    #[error("{0}")]
    BadRequest(String),

    /// Unknown id (404)
    #[error("{0}")]
    NotFound(String),

    /// Id already taken (409)
    #[error("{0}")]
    Conflict(String),

    /// Anything else: storage or model failure (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map an insert failure: a taken id is a 409 naming `kind` and `id`,
    /// anything else goes through [`ApiError::internal`].
    pub fn insert_failed(operation: &'static str, kind: &str, id: &str, err: anyhow::Error) -> Self {
        if crate::db::is_duplicate_key(&err) {
            tracing::warn!(operation, id, "duplicate id rejected");
            return Self::Conflict(format!("{kind} with id '{id}' already exists"));
        }
        Self::internal(operation, err)
    }

    /// Log `err` under `operation` and wrap its full text as a 500.
    pub fn internal(operation: &'static str, err: anyhow::Error) -> Self {
        tracing::error!(operation, error = %format!("{err:#}"), "request failed");
        Self::Internal(format!("{err:#}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
