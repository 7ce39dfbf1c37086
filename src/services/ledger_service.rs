// src/services/ledger_service.rs

use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditRepository, ledger_repo::LedgerRepository,
        product_repo::ProductRepository,
    },
    models::{
        audit::NewAuditEntry,
        employee::Employee,
        inventory::{ManualAdjustmentPayload, MovementType, NewMovement, StockMovement, signed_delta},
        rbac::PermissionCode,
        session::ClientMeta,
    },
    services::authz::AuthorizationGate,
};

/// The only writer of `product.stock_quantity`. Every stock change goes
/// through `apply` on the caller's transaction, which keeps the cached
/// quantity and the movement ledger in lockstep.
#[derive(Clone)]
pub struct LedgerService {
    product_repo: ProductRepository,
    ledger_repo: LedgerRepository,
    audit_repo: AuditRepository,
    gate: AuthorizationGate,
    pool: SqlitePool,
}

impl LedgerService {
    pub fn new(
        product_repo: ProductRepository,
        ledger_repo: LedgerRepository,
        audit_repo: AuditRepository,
        gate: AuthorizationGate,
        pool: SqlitePool,
    ) -> Self {
        Self {
            product_repo,
            ledger_repo,
            audit_repo,
            gate,
            pool,
        }
    }

    /// Applies one movement on an open transaction: guard-checked quantity
    /// update first, ledger row second. Rolls back with the caller on any
    /// failure, so a partial multi-line workflow never leaks stock.
    pub async fn apply(
        &self,
        conn: &mut SqliteConnection,
        mv: NewMovement,
    ) -> Result<StockMovement, AppError> {
        match mv.movement_type {
            MovementType::Incoming | MovementType::Outgoing => {
                if mv.quantity <= 0 {
                    return Err(AppError::Validation(
                        "movement quantity must be positive".into(),
                    ));
                }
            }
            MovementType::Adjustment => {
                if mv.quantity == 0 {
                    return Err(AppError::Validation(
                        "adjustment quantity cannot be zero".into(),
                    ));
                }
            }
        }

        let delta = signed_delta(mv.movement_type, mv.quantity);

        let applied = self
            .product_repo
            .apply_stock_delta(&mut *conn, mv.product_id, delta)
            .await?;

        if !applied {
            // The guarded update refused: either no such product, or the
            // decrement would go below zero.
            let product = self
                .product_repo
                .find_by_id(&mut *conn, mv.product_id)
                .await?
                .ok_or(AppError::NotFound("product"))?;
            return Err(AppError::InsufficientStock {
                product_id: mv.product_id,
                requested: -delta,
                available: product.stock_quantity,
            });
        }

        self.ledger_repo.insert_movement(&mut *conn, &mv).await
    }

    /// Operator-initiated stock correction, signed.
    pub async fn manual_adjustment(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        payload: ManualAdjustmentPayload,
    ) -> Result<StockMovement, AppError> {
        self.gate.require(actor, PermissionCode::StockMovement).await?;

        let mut tx = self.pool.begin().await?;

        let movement = self
            .apply(
                &mut *tx,
                NewMovement {
                    product_id: payload.product_id,
                    movement_type: MovementType::Adjustment,
                    quantity: payload.quantity,
                    reference_id: None,
                    reference_type: Some("manual".into()),
                    employee_id: actor.employee_id,
                    notes: payload.notes,
                },
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("stock_adjustment")
                    .by(actor.employee_id)
                    .on("stock_movement", movement.movement_id)
                    .new_values(serde_json::json!({
                        "productId": movement.product_id,
                        "quantity": movement.quantity,
                    }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(movement)
    }

    pub async fn movements_for_product(
        &self,
        actor: &Employee,
        product_id: i64,
    ) -> Result<Vec<StockMovement>, AppError> {
        self.gate.require(actor, PermissionCode::ProductsView).await?;
        self.ledger_repo.list_for_product(product_id).await
    }

    /// Recomputes a product's stock from the ledger and compares it with
    /// the cached quantity. Used by consistency checks and tests.
    pub async fn verify_product(&self, product_id: i64) -> Result<bool, AppError> {
        let product = self
            .product_repo
            .find_by_id(&self.pool, product_id)
            .await?
            .ok_or(AppError::NotFound("product"))?;
        let ledger_sum = self
            .ledger_repo
            .signed_sum_for_product(&self.pool, product_id)
            .await?;
        Ok(product.stock_quantity == ledger_sum)
    }
}
