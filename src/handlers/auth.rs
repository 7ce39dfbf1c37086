// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{CurrentActor, ExtractClientMeta},
    models::session::LoginPayload,
};

pub async fn login(
    State(app_state): State<AppState>,
    ExtractClientMeta(meta): ExtractClientMeta,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let response = app_state
        .auth_service
        .login(&payload.login, &payload.password, &meta)
        .await?;
    Ok(Json(response))
}

/// Public on purpose: a token whose session is already closed would not get
/// past the auth guard, and logout must stay idempotent.
pub async fn logout(
    State(app_state): State<AppState>,
    ExtractClientMeta(meta): ExtractClientMeta,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Authentication)?;

    let closed = app_state.auth_service.logout(token, &meta).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "sessionClosed": closed })),
    ))
}

pub async fn me(CurrentActor(actor): CurrentActor) -> impl IntoResponse {
    Json(actor)
}
