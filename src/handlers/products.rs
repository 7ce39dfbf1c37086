// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{CurrentActor, ExtractClientMeta},
    models::{
        inventory::ManualAdjustmentPayload,
        product::{ChangePricePayload, CreateProductPayload, UpdateProductPayload},
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_products(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .product_service
        .list_products(&actor, query.include_inactive)
        .await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get_product(&actor, product_id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product = app_state
        .product_service
        .create_product(&actor, &meta, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(product_id): Path<i64>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product = app_state
        .product_service
        .update_product(&actor, &meta, product_id, payload)
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let hard_deleted = app_state
        .product_service
        .delete_product(&actor, &meta, product_id)
        .await?;
    Ok(Json(serde_json::json!({ "hardDeleted": hard_deleted })))
}

pub async fn change_price(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Path(product_id): Path<i64>,
    Json(payload): Json<ChangePricePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let entry = app_state
        .product_service
        .change_price(&actor, &meta, product_id, payload)
        .await?;
    Ok(Json(entry))
}

pub async fn price_history(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.product_service.price_history(&actor, product_id).await?;
    Ok(Json(entries))
}

pub async fn stock_movements(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state
        .ledger_service
        .movements_for_product(&actor, product_id)
        .await?;
    Ok(Json(movements))
}

pub async fn adjust_stock(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ExtractClientMeta(meta): ExtractClientMeta,
    Json(payload): Json<ManualAdjustmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let movement = app_state
        .ledger_service
        .manual_adjustment(&actor, &meta, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn list_categories(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.product_service.list_categories(&actor).await?;
    Ok(Json(categories))
}

pub async fn list_suppliers(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.product_service.list_suppliers(&actor).await?;
    Ok(Json(suppliers))
}

pub async fn list_customers(
    State(app_state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.product_service.list_customers(&actor).await?;
    Ok(Json(customers))
}
