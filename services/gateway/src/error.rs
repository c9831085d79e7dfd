use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use types::errors::SwapError;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Swap(#[from] SwapError),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Swap(err) => match err {
                SwapError::NotFound { .. } => StatusCode::NOT_FOUND,
                SwapError::Forbidden(_) => StatusCode::FORBIDDEN,
                SwapError::Validation { .. }
                | SwapError::State(_)
                | SwapError::InvalidOperation(_)
                | SwapError::Conflict(_) => StatusCode::BAD_REQUEST,
                SwapError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
            AppError::Swap(SwapError::Internal(reason)) => {
                tracing::error!(%reason, "Engine fault");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
            AppError::Swap(err) => (err.code(), err.to_string()),
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "Unhandled gateway error");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
