// src/handlers/employees.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{CurrentActor, ExtractClientMeta},
    models::employee::{CreateEmployeePayload, UpdateEmployeePayload},
};

pub async fn list_employees(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let employees = app_state.employee_service.list_employees(&actor).await?;
    Ok(Json(employees))
}

pub async fn get_employee(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(employee_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let employee = app_state
        .employee_service
        .get_employee(&actor, employee_id)
        .await?;
    Ok(Json(employee))
}

pub async fn create_employee(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let employee = app_state
        .employee_service
        .create_employee(&actor, &meta, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn update_employee(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(employee_id): Path<i64>,
    Json(payload): Json<UpdateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let employee = app_state
        .employee_service
        .update_employee(&actor, &meta, employee_id, payload)
        .await?;
    Ok(Json(employee))
}

pub async fn deactivate_employee(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(employee_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .employee_service
        .deactivate_employee(&actor, &meta, employee_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_roles(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.employee_service.list_roles(&actor).await?;
    Ok(Json(roles))
}

pub async fn list_permissions(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let permissions = app_state.employee_service.list_permissions(&actor).await?;
    Ok(Json(permissions))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrantPayload {
    pub permission_code: String,
}

pub async fn grant_permission(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(role_id): Path<i64>,
    Json(payload): Json<PermissionGrantPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .employee_service
        .grant_permission(&actor, &meta, role_id, &payload.permission_code)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_permission(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path((role_id, permission_code)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .employee_service
        .revoke_permission(&actor, &meta, role_id, &permission_code)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
