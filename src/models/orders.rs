// src/models/orders.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Received,
    Processing,
    Paid,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Forward status flow; cancellation is reachable from any non-terminal
    /// state and both Completed and Cancelled are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Received, Processing) | (Processing, Paid) | (Paid, Completed) => true,
            (Received | Processing | Paid, Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    pub order_date: DateTime<Utc>,
    pub customer_id: Option<i64>,
    pub total_amount_cents: i64,
    pub status: OrderStatus,
    pub employee_id: i64,
    pub discount_bp: i64,
    pub payment_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub item_price_cents: i64,
    pub item_discount_bp: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemPayload {
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    /// 0..=10000, basis points off the current product price.
    #[validate(range(min = 0, max = 10000, message = "discount must be 0-10000 basis points"))]
    #[serde(default)]
    pub item_discount_bp: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer_id: Option<i64>,
    #[validate(length(min = 1, message = "an order needs at least one item"), nested)]
    pub items: Vec<CreateOrderItemPayload>,
    #[validate(range(min = 0, max = 10000, message = "discount must be 0-10000 basis points"))]
    #[serde(default)]
    pub discount_bp: i64,
    pub payment_type: Option<String>,
    pub notes: Option<String>,
    /// Caller's expected total; rejected when it drifts from the server's
    /// own computation by more than one cent per line.
    pub expected_total_cents: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

/// Price of one line after its discount, rounded half-up.
pub fn line_total_cents(price_cents: i64, quantity: i64, discount_bp: i64) -> i64 {
    (price_cents * quantity * (10_000 - discount_bp) + 5_000) / 10_000
}

/// Order total: discounted lines summed, then the order-level discount
/// applied to the sum, rounded half-up.
pub fn order_total_cents(lines: &[(i64, i64, i64)], order_discount_bp: i64) -> i64 {
    let subtotal: i64 = lines
        .iter()
        .map(|&(price, qty, disc)| line_total_cents(price, qty, disc))
        .sum();
    (subtotal * (10_000 - order_discount_bp) + 5_000) / 10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_flow_is_forward_only() {
        use OrderStatus::*;
        assert!(Received.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Received));
        assert!(!Received.can_transition_to(Paid));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Received));
    }

    #[test]
    fn cancel_allowed_from_any_open_state() {
        use OrderStatus::*;
        for from in [Received, Processing, Paid] {
            assert!(from.can_transition_to(Cancelled));
            assert!(!from.is_terminal());
        }
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn empty_item_list_fails_validation() {
        let payload = CreateOrderPayload {
            customer_id: None,
            items: vec![],
            discount_bp: 0,
            payment_type: None,
            notes: None,
            expected_total_cents: None,
        };
        let err = payload.validate().unwrap_err();
        assert!(err.field_errors().contains_key("items"));
    }

    #[test]
    fn line_total_rounds_half_up() {
        // 333 * 1 at 5% off = 316.35 -> 316
        assert_eq!(line_total_cents(333, 1, 500), 316);
        // 125 * 1 at 10% off = 112.5 -> 113
        assert_eq!(line_total_cents(125, 1, 1000), 113);
        // no discount is exact
        assert_eq!(line_total_cents(999, 3, 0), 2997);
        // full discount zeroes the line
        assert_eq!(line_total_cents(999, 3, 10_000), 0);
    }

    #[test]
    fn order_total_applies_order_discount_after_lines() {
        let lines = [(1000, 2, 0), (500, 1, 1000)];
        // 2000 + 450 = 2450, minus 10% = 2205
        assert_eq!(order_total_cents(&lines, 1000), 2205);
        assert_eq!(order_total_cents(&lines, 0), 2450);
    }
}
