// src/models/purchase.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Ordered,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub purchase_id: i64,
    pub purchase_date: DateTime<Utc>,
    pub supplier_id: i64,
    pub total_amount_cents: i64,
    pub delivery_date: Option<DateTime<Utc>>,
    pub employee_id: i64,
    pub status: PurchaseStatus,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub purchase_item_id: i64,
    pub purchase_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseWithItems {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseItemPayload {
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    #[validate(range(min = 0, message = "unit price cannot be negative"))]
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    pub supplier_id: i64,
    #[validate(length(min = 1, message = "a purchase needs at least one item"), nested)]
    pub items: Vec<CreatePurchaseItemPayload>,
    #[validate(length(min = 1, max = 64, message = "invoice number must be 1-64 characters"))]
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
}
