// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{employee::Employee, session::ClientMeta},
};

/// Resolves the bearer token to an employee and stashes it in the request
/// extensions. Routes behind this layer can rely on `CurrentActor`.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Authentication)?;

    let employee = app_state.auth_service.resolve_token(token).await?;

    request.extensions_mut().insert(employee);
    Ok(next.run(request).await)
}

/// The authenticated employee, extracted in handlers behind `auth_guard`.
pub struct CurrentActor(pub Employee);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Employee>()
            .cloned()
            .map(CurrentActor)
            .ok_or(AppError::Authentication)
    }
}

/// Best-effort client address and user agent for sessions and audit rows.
pub struct ExtractClientMeta(pub ClientMeta);

impl<S> FromRequestParts<S> for ExtractClientMeta
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_owned())
        };
        let ip_address = header("x-forwarded-for")
            .map(|v| v.split(',').next().unwrap_or("").trim().to_owned())
            .filter(|v| !v.is_empty());
        Ok(ExtractClientMeta(ClientMeta {
            ip_address,
            user_agent: header("user-agent"),
        }))
    }
}
