// src/handlers/orders.rs

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
    models::orders::{CreateOrderPayload, UpdateOrderStatusPayload},
};

pub async fn list_orders(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list_orders(&actor).await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get_order(&actor, order_id).await?;
    Ok(Json(order))
}

pub async fn create_order(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let order = app_state
        .order_service
        .create_order(&actor, &meta, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_status(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(order_id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .order_service
        .update_status(&actor, &meta, order_id, payload.status)
        .await?;
    Ok(Json(order))
}

pub async fn cancel_order(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .order_service
        .cancel_order(&actor, &meta, order_id)
        .await?;
    Ok(Json(order))
}
