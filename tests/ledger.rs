// tests/ledger.rs

mod common;

use common::*;
use warehouse_backend::common::AppError;
use warehouse_backend::models::inventory::{ManualAdjustmentPayload, MovementType};

#[tokio::test]
async fn manual_adjustment_updates_stock_and_ledger() {
    let state = test_state().await;
    let actor = warehouse_manager(&state).await;
    let product = product(&state, &admin(&state).await, 1000, 10).await;

    let movement = state
        .ledger_service
        .manual_adjustment(
            &actor,
            &meta(),
            ManualAdjustmentPayload {
                product_id: product.product_id,
                quantity: -3,
                notes: Some("shrinkage".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(movement.movement_type, MovementType::Adjustment);
    assert_eq!(movement.quantity, -3);
    assert_eq!(stock_of(&state, product.product_id).await, 7);
    assert!(state.ledger_service.verify_product(product.product_id).await.unwrap());
}

#[tokio::test]
async fn adjustment_cannot_drive_stock_negative() {
    let state = test_state().await;
    let actor = warehouse_manager(&state).await;
    let product = product(&state, &admin(&state).await, 1000, 5).await;
    let movements_before = movement_count(&state, product.product_id).await;

    let err = state
        .ledger_service
        .manual_adjustment(
            &actor,
            &meta(),
            ManualAdjustmentPayload {
                product_id: product.product_id,
                quantity: -6,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    match err {
        AppError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 6);
            assert_eq!(available, 5);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // nothing moved, nothing logged
    assert_eq!(stock_of(&state, product.product_id).await, 5);
    assert_eq!(movement_count(&state, product.product_id).await, movements_before);
}

#[tokio::test]
async fn zero_adjustment_is_rejected() {
    let state = test_state().await;
    let actor = warehouse_manager(&state).await;
    let product = product(&state, &admin(&state).await, 1000, 5).await;

    let err = state
        .ledger_service
        .manual_adjustment(
            &actor,
            &meta(),
            ManualAdjustmentPayload {
                product_id: product.product_id,
                quantity: 0,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn adjustment_on_unknown_product_is_not_found() {
    let state = test_state().await;
    let actor = warehouse_manager(&state).await;

    let err = state
        .ledger_service
        .manual_adjustment(
            &actor,
            &meta(),
            ManualAdjustmentPayload {
                product_id: 9999,
                quantity: 5,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound("product")));
}

#[tokio::test]
async fn adjustment_requires_stock_movement_permission() {
    let state = test_state().await;
    let actor = seller(&state).await;
    let product = product(&state, &admin(&state).await, 1000, 5).await;

    let err = state
        .ledger_service
        .manual_adjustment(
            &actor,
            &meta(),
            ManualAdjustmentPayload {
                product_id: product.product_id,
                quantity: 1,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Authorization {
            permission: "stock.movement"
        }
    ));
    assert_eq!(stock_of(&state, product.product_id).await, 5);
}

#[tokio::test]
async fn initial_stock_is_backed_by_a_movement() {
    let state = test_state().await;
    let product = product(&state, &admin(&state).await, 1000, 12).await;

    assert_eq!(stock_of(&state, product.product_id).await, 12);
    assert_eq!(movement_count(&state, product.product_id).await, 1);
    assert!(state.ledger_service.verify_product(product.product_id).await.unwrap());
}

#[tokio::test]
async fn ledger_sum_tracks_mixed_movements() {
    let state = test_state().await;
    let manager = warehouse_manager(&state).await;
    let product = product(&state, &admin(&state).await, 500, 20).await;

    for qty in [-4, 3, -1] {
        state
            .ledger_service
            .manual_adjustment(
                &manager,
                &meta(),
                ManualAdjustmentPayload {
                    product_id: product.product_id,
                    quantity: qty,
                    notes: None,
                },
            )
            .await
            .unwrap();
    }

    assert_eq!(stock_of(&state, product.product_id).await, 18);
    assert!(state.ledger_service.verify_product(product.product_id).await.unwrap());
}
