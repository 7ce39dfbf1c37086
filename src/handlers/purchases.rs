// src/handlers/purchases.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{CurrentActor, ExtractClientMeta},
    models::purchase::CreatePurchasePayload,
};

pub async fn list_purchases(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let purchases = app_state.purchase_service.list_purchases(&actor).await?;
    Ok(Json(purchases))
}

pub async fn get_purchase(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(purchase_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state
        .purchase_service
        .get_purchase(&actor, purchase_id)
        .await?;
    Ok(Json(purchase))
}

pub async fn create_purchase(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let purchase = app_state
        .purchase_service
        .create_purchase(&actor, &meta, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn mark_delivered(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(purchase_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state
        .purchase_service
        .mark_delivered(&actor, &meta, purchase_id)
        .await?;
    Ok(Json(purchase))
}

pub async fn cancel_purchase(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(purchase_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state
        .purchase_service
        .cancel_purchase(&actor, &meta, purchase_id)
        .await?;
    Ok(Json(purchase))
}
