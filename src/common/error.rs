// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application error taxonomy. Every domain workflow runs inside one
/// transaction; any of these raised mid-flight rolls the whole thing back.
#[derive(Debug, Error)]
pub enum AppError {
    /// No identity, invalid token, or inactive account. Deliberately carries
    /// no detail about which part of the credential was wrong.
    #[error("not authenticated")]
    Authentication,

    /// Identity resolved but the role lacks the required permission code.
    #[error("missing permission '{permission}'")]
    Authorization { permission: &'static str },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Structured field errors from `validator` payload checks.
    #[error("invalid payload")]
    Payload(#[from] validator::ValidationErrors),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Storage-level constraint violation (e.g. a race on a unique column).
    /// Callers may retry the whole operation.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),

    #[error("hashing error")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Authentication => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "not authenticated" }),
            ),
            AppError::Authorization { permission } => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": format!("missing permission '{permission}'"),
                    "permission": permission,
                }),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found") }),
            ),
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            AppError::Payload(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "one or more fields are invalid", "details": details }),
                )
            }
            AppError::InsufficientStock {
                product_id,
                requested,
                available,
            } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "insufficient stock",
                    "productId": product_id,
                    "requested": requested,
                    "available": available,
                }),
            ),
            AppError::Integrity(message) => (StatusCode::CONFLICT, json!({ "error": message })),
            // Everything else is a 500: log the detail server-side, return a
            // generic message to the caller.
            ref e => {
                tracing::error!("internal server error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "unexpected server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
