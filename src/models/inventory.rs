// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MovementType {
    Incoming,
    Outgoing,
    Adjustment,
}

/// One row of the append-only stock ledger.
///
/// `quantity` is a positive magnitude for incoming/outgoing rows; for
/// adjustment rows it is the signed delta itself.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub movement_id: i64,
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub movement_date: DateTime<Utc>,
    pub reference_id: Option<i64>,
    pub reference_type: Option<String>,
    pub employee_id: i64,
    pub notes: Option<String>,
}

impl StockMovement {
    /// Signed effect of this row on the product's stock quantity.
    pub fn signed_delta(&self) -> i64 {
        signed_delta(self.movement_type, self.quantity)
    }
}

pub fn signed_delta(movement_type: MovementType, quantity: i64) -> i64 {
    match movement_type {
        MovementType::Incoming => quantity,
        MovementType::Outgoing => -quantity,
        MovementType::Adjustment => quantity,
    }
}

/// Not yet persisted movement, produced by the domain workflows and fed to
/// the ledger inside their transaction.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reference_id: Option<i64>,
    pub reference_type: Option<String>,
    pub employee_id: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ManualAdjustmentPayload {
    pub product_id: i64,
    /// Signed; zero is rejected.
    pub quantity: i64,
    #[validate(length(min = 1, max = 500, message = "notes must be 1-500 characters"))]
    pub notes: Option<String>,
}
