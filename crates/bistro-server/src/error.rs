use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Structural field violations, all of them collected before rejecting.
    #[error("{}", .0.join("; "))]
    FieldValidation(Vec<String>),

    /// First business rule broken; the caller must correct and resubmit.
    #[error("{0}")]
    BusinessRule(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            Self::FieldValidation(violations) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(serde_json::json!(violations)),
            ),
            Self::BusinessRule(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "business_rule_violation",
                None,
            ),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
