// tests/orders.rs

mod common;

use common::*;
use warehouse_backend::common::AppError;
use warehouse_backend::models::orders::{
    CreateOrderItemPayload, CreateOrderPayload, OrderStatus,
};

fn order_payload(items: Vec<CreateOrderItemPayload>) -> CreateOrderPayload {
    CreateOrderPayload {
        customer_id: None,
        items,
        discount_bp: 0,
        payment_type: None,
        notes: None,
        expected_total_cents: None,
    }
}

fn line(product_id: i64, quantity: i64) -> CreateOrderItemPayload {
    CreateOrderItemPayload {
        product_id,
        quantity,
        item_discount_bp: 0,
    }
}

#[tokio::test]
async fn create_order_decrements_stock_and_books_movements() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &admin, 1500, 10).await;

    let created = state
        .order_service
        .create_order(&actor, &meta(), order_payload(vec![line(product.product_id, 4)]))
        .await
        .unwrap();

    assert_eq!(created.order.status, OrderStatus::Received);
    assert_eq!(created.order.total_amount_cents, 6000);
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].item_price_cents, 1500);
    assert_eq!(stock_of(&state, product.product_id).await, 6);
    // initial stock adjustment + outgoing sale
    assert_eq!(movement_count(&state, product.product_id).await, 2);
    assert!(state.ledger_service.verify_product(product.product_id).await.unwrap());
}

#[tokio::test]
async fn multi_line_order_rolls_back_completely_on_one_short_line() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let plentiful = product(&state, &admin, 1000, 50).await;
    let scarce = product(&state, &admin, 2000, 2).await;

    let err = state
        .order_service
        .create_order(
            &actor,
            &meta(),
            order_payload(vec![line(plentiful.product_id, 10), line(scarce.product_id, 3)]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { .. }));

    // the first line's stock snap back with the rollback
    assert_eq!(stock_of(&state, plentiful.product_id).await, 50);
    assert_eq!(stock_of(&state, scarce.product_id).await, 2);
    assert_eq!(movement_count(&state, plentiful.product_id).await, 1);

    let order_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(&state.pool)
            .await
            .unwrap();
    assert_eq!(order_count, 0);
}

#[tokio::test]
async fn order_total_is_computed_server_side() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &admin, 333, 100).await;

    let mut payload = order_payload(vec![CreateOrderItemPayload {
        product_id: product.product_id,
        quantity: 3,
        item_discount_bp: 500,
    }]);
    payload.discount_bp = 1000;

    let created = state
        .order_service
        .create_order(&actor, &meta(), payload)
        .await
        .unwrap();

    // 333*3 = 999, 5% off -> 949, then 10% off -> 854
    assert_eq!(created.order.total_amount_cents, 854);
}

#[tokio::test]
async fn client_total_drift_beyond_tolerance_is_rejected() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &admin, 1000, 10).await;

    let mut payload = order_payload(vec![line(product.product_id, 2)]);
    payload.expected_total_cents = Some(1800);

    let err = state
        .order_service
        .create_order(&actor, &meta(), payload)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(stock_of(&state, product.product_id).await, 10);

    // within one cent per line it passes
    let mut payload = order_payload(vec![line(product.product_id, 2)]);
    payload.expected_total_cents = Some(2001);
    state
        .order_service
        .create_order(&actor, &meta(), payload)
        .await
        .unwrap();
}

#[tokio::test]
async fn inactive_product_cannot_be_ordered() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &admin, 1000, 10).await;

    sqlx::query("UPDATE product SET is_active = 0 WHERE product_id = ?1")
        .bind(product.product_id)
        .execute(&state.pool)
        .await
        .unwrap();

    let err = state
        .order_service
        .create_order(&actor, &meta(), order_payload(vec![line(product.product_id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn status_flow_is_enforced() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &admin, 1000, 10).await;

    let created = state
        .order_service
        .create_order(&actor, &meta(), order_payload(vec![line(product.product_id, 1)]))
        .await
        .unwrap();
    let order_id = created.order.order_id;

    // skipping a step is rejected
    let err = state
        .order_service
        .update_status(&actor, &meta(), order_id, OrderStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    for next in [OrderStatus::Processing, OrderStatus::Paid, OrderStatus::Completed] {
        let order = state
            .order_service
            .update_status(&actor, &meta(), order_id, next)
            .await
            .unwrap();
        assert_eq!(order.status, next);
    }

    // completed is terminal even for an actor who may cancel
    let err = state
        .order_service
        .cancel_order(&admin, &meta(), order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn cancelled_via_status_endpoint_is_refused() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &admin, 1000, 10).await;

    let created = state
        .order_service
        .create_order(&actor, &meta(), order_payload(vec![line(product.product_id, 1)]))
        .await
        .unwrap();

    let err = state
        .order_service
        .update_status(&actor, &meta(), created.order.order_id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn cancel_restores_stock_through_the_ledger() {
    let state = test_state().await;
    let all = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &all, 1000, 10).await;

    let created = state
        .order_service
        .create_order(&actor, &meta(), order_payload(vec![line(product.product_id, 4)]))
        .await
        .unwrap();
    assert_eq!(stock_of(&state, product.product_id).await, 6);

    // seller cannot cancel, admin can
    let err = state
        .order_service
        .cancel_order(&actor, &meta(), created.order.order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization { permission: "orders.cancel" }));

    let cancelled = state
        .order_service
        .cancel_order(&all, &meta(), created.order.order_id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, product.product_id).await, 10);
    // initial + outgoing + compensating adjustment
    assert_eq!(movement_count(&state, product.product_id).await, 3);
    assert!(state.ledger_service.verify_product(product.product_id).await.unwrap());

    // a cancelled order cannot be cancelled again
    let err = state
        .order_service
        .cancel_order(&all, &meta(), created.order.order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn stored_total_matches_recomputation_from_lines() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let a = product(&state, &admin, 333, 50).await;
    let b = product(&state, &admin, 125, 50).await;

    let mut payload = order_payload(vec![
        CreateOrderItemPayload {
            product_id: a.product_id,
            quantity: 3,
            item_discount_bp: 500,
        },
        CreateOrderItemPayload {
            product_id: b.product_id,
            quantity: 7,
            item_discount_bp: 1000,
        },
    ]);
    payload.discount_bp = 250;

    let created = state
        .order_service
        .create_order(&actor, &meta(), payload)
        .await
        .unwrap();

    let recomputed = state
        .order_service
        .recompute_total(created.order.order_id)
        .await
        .unwrap();
    assert_eq!(created.order.total_amount_cents, recomputed);
}

#[tokio::test]
async fn order_failure_leaves_no_audit_rows() {
    let state = test_state().await;
    let admin = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &admin, 1000, 1).await;

    let audit_before = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_log")
        .fetch_one(&state.pool)
        .await
        .unwrap();

    state
        .order_service
        .create_order(&actor, &meta(), order_payload(vec![line(product.product_id, 5)]))
        .await
        .unwrap_err();

    let audit_after = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_log")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(audit_before, audit_after);
}
