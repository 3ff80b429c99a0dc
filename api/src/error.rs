use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use maum_core::error::{ApiError, codes};

use crate::upstream::UpstreamError;

/// Failures a handler can produce, mapped onto the wire error contract.
#[derive(Debug)]
pub enum AppError {
    /// Request rejected before any side effect (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Dialogue engine exchange failed; session state untouched (500)
    Upstream(UpstreamError),
    /// sqlx failure on the edit store (500)
    Database(sqlx::Error),
    /// Anything else; detail stays in the log (500)
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = uuid::Uuid::now_v7().to_string();

        let body = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => ApiError {
                error: codes::VALIDATION_FAILED.to_string(),
                message,
                field,
                received,
                request_id,
                docs_hint,
            },
            AppError::Upstream(err) => {
                tracing::error!(error = %err, "dialogue engine call failed");
                ApiError {
                    docs_hint: Some(
                        "Resend the same message; the conversation state was not changed."
                            .to_string(),
                    ),
                    ..ApiError::opaque(
                        codes::UPSTREAM_ERROR,
                        "The dialogue engine could not be reached",
                        request_id,
                    )
                }
            }
            AppError::Database(err) => {
                tracing::error!(error = ?err, "database operation failed");
                ApiError::opaque(codes::INTERNAL_ERROR, "An internal error occurred", request_id)
            }
            AppError::Internal(msg) => {
                tracing::error!(message = %msg, "internal failure");
                ApiError::opaque(codes::INTERNAL_ERROR, "An internal error occurred", request_id)
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        AppError::Upstream(err)
    }
}
