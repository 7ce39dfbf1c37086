// tests/pricing.rs

mod common;

use common::*;
use warehouse_backend::common::AppError;
use warehouse_backend::models::product::{ChangePricePayload, UpdateProductPayload};

#[tokio::test]
async fn product_creation_seeds_the_price_history() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let product = product(&state, &boss, 1250, 0).await;

    let history = state
        .product_service
        .price_history(&boss, product.product_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_price_cents, None);
    assert_eq!(history[0].new_price_cents, 1250);
}

#[tokio::test]
async fn change_price_appends_history_with_prior_price() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let actor = accountant(&state).await;
    let product = product(&state, &boss, 1000, 0).await;

    let entry = state
        .product_service
        .change_price(
            &actor,
            &meta(),
            product.product_id,
            ChangePricePayload {
                new_price_cents: 1200,
                reason: Some("supplier price increase".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(entry.old_price_cents, Some(1000));
    assert_eq!(entry.new_price_cents, 1200);

    let updated = state.product_service.get_product(&boss, product.product_id).await.unwrap();
    assert_eq!(updated.price_cents, 1200);
}

#[tokio::test]
async fn setting_the_same_price_still_leaves_a_trace() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let product = product(&state, &boss, 1000, 0).await;

    state
        .product_service
        .change_price(
            &boss,
            &meta(),
            product.product_id,
            ChangePricePayload {
                new_price_cents: 1000,
                reason: None,
            },
        )
        .await
        .unwrap();

    let history = state
        .product_service
        .price_history(&boss, product.product_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].old_price_cents, Some(1000));
    assert_eq!(history[0].new_price_cents, 1000);
}

#[tokio::test]
async fn history_is_newest_first_and_chains_correctly() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let product = product(&state, &boss, 100, 0).await;

    for price in [150, 175, 160] {
        state
            .product_service
            .change_price(
                &boss,
                &meta(),
                product.product_id,
                ChangePricePayload {
                    new_price_cents: price,
                    reason: None,
                },
            )
            .await
            .unwrap();
    }

    let history = state
        .product_service
        .price_history(&boss, product.product_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].new_price_cents, 160);
    assert_eq!(history[0].old_price_cents, Some(175));
    assert_eq!(history[1].old_price_cents, Some(150));
    assert_eq!(history[2].old_price_cents, Some(100));
    assert_eq!(history[3].old_price_cents, None);
}

#[tokio::test]
async fn price_change_requires_its_own_permission() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &boss, 1000, 0).await;

    let err = state
        .product_service
        .change_price(
            &actor,
            &meta(),
            product.product_id,
            ChangePricePayload {
                new_price_cents: 900,
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Authorization {
            permission: "price.change"
        }
    ));
}

#[tokio::test]
async fn product_updates_cannot_sneak_a_price_in() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let product = product(&state, &boss, 1000, 0).await;

    // the update payload simply has no price field; the price survives edits
    state
        .product_service
        .update_product(
            &boss,
            &meta(),
            product.product_id,
            UpdateProductPayload {
                product_name: Some("Renamed".into()),
                description: None,
                unit: None,
                category_id: None,
                barcode: None,
                supplier_id: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

    let updated = state.product_service.get_product(&boss, product.product_id).await.unwrap();
    assert_eq!(updated.price_cents, 1000);
    assert_eq!(updated.product_name, "Renamed");

    let history = state
        .product_service
        .price_history(&boss, product.product_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn referenced_product_is_soft_deleted_unreferenced_is_purged() {
    let state = test_state().await;
    let boss = admin(&state).await;

    // this one has an initial-stock movement referencing it
    let referenced = product(&state, &boss, 1000, 5).await;
    let hard = state
        .product_service
        .delete_product(&boss, &meta(), referenced.product_id)
        .await
        .unwrap();
    assert!(!hard);
    let still_there = state
        .product_service
        .get_product(&boss, referenced.product_id)
        .await
        .unwrap();
    assert!(!still_there.is_active);

    // this one was never touched
    let untouched = product(&state, &boss, 1000, 0).await;
    let hard = state
        .product_service
        .delete_product(&boss, &meta(), untouched.product_id)
        .await
        .unwrap();
    assert!(hard);
    let err = state
        .product_service
        .get_product(&boss, untouched.product_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("product")));
}

#[tokio::test]
async fn denied_delete_leaves_product_and_audit_log_untouched() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let actor = seller(&state).await;
    let product = product(&state, &boss, 1000, 0).await;

    let audit_before = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_log")
        .fetch_one(&state.pool)
        .await
        .unwrap();

    let err = state
        .product_service
        .delete_product(&actor, &meta(), product.product_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Authorization {
            permission: "products.delete"
        }
    ));

    let untouched = state
        .product_service
        .get_product(&boss, product.product_id)
        .await
        .unwrap();
    assert!(untouched.is_active);

    let audit_after = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_log")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(audit_before, audit_after);
}

#[tokio::test]
async fn audit_trail_records_price_changes() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let product = product(&state, &boss, 1000, 0).await;

    state
        .product_service
        .change_price(
            &boss,
            &meta(),
            product.product_id,
            ChangePricePayload {
                new_price_cents: 1100,
                reason: None,
            },
        )
        .await
        .unwrap();

    let entries = state
        .system_service
        .audit_for_record(&boss, "product", product.product_id)
        .await
        .unwrap();
    assert!(entries.iter().any(|e| e.action_type == "price_change"));
    assert!(entries.iter().any(|e| e.action_type == "product_create"));
}
