// src/handlers/system.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{common::error::AppError, config::AppState, middleware::auth::CurrentActor};

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn audit_trail(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state
        .system_service
        .audit_trail(&actor, query.limit, query.offset)
        .await?;
    Ok(Json(entries))
}

pub async fn audit_for_record(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((table_name, record_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state
        .system_service
        .audit_for_record(&actor, &table_name, record_id)
        .await?;
    Ok(Json(entries))
}

pub async fn active_sessions(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let sessions = app_state.system_service.active_sessions(&actor).await?;
    Ok(Json(sessions))
}
