// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub description: Option<String>,
    pub unit: String,
    pub category_id: i64,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub barcode: Option<String>,
    pub supplier_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by_employee_id: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by_employee_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub supplier_id: i64,
    pub company_name: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: i64,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub price_history_id: i64,
    pub product_id: i64,
    pub old_price_cents: Option<i64>,
    pub new_price_cents: i64,
    pub change_date: DateTime<Utc>,
    pub changed_by_employee_id: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, max = 300, message = "product name must be 1-300 characters"))]
    pub product_name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 20, message = "unit must be 1-20 characters"))]
    pub unit: String,
    pub category_id: i64,
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub price_cents: i64,
    #[validate(range(min = 0, message = "initial stock cannot be negative"))]
    #[serde(default)]
    pub initial_stock: i64,
    #[validate(length(min = 1, max = 64, message = "barcode must be 1-64 characters"))]
    pub barcode: Option<String>,
    pub supplier_id: Option<i64>,
}

/// Price and stock are absent on purpose: prices change through the price
/// endpoint so history is appended, stock changes through the ledger.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, max = 300, message = "product name must be 1-300 characters"))]
    pub product_name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 20, message = "unit must be 1-20 characters"))]
    pub unit: Option<String>,
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 64, message = "barcode must be 1-64 characters"))]
    pub barcode: Option<String>,
    pub supplier_id: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePricePayload {
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub new_price_cents: i64,
    pub reason: Option<String>,
}
