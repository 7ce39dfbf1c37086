// src/services/purchase_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditRepository, product_repo::ProductRepository,
        purchase_repo::PurchaseRepository,
    },
    models::{
        audit::NewAuditEntry,
        employee::Employee,
        inventory::{MovementType, NewMovement},
        purchase::{CreatePurchasePayload, Purchase, PurchaseStatus, PurchaseWithItems},
        rbac::PermissionCode,
        session::ClientMeta,
    },
    services::{authz::AuthorizationGate, ledger_service::LedgerService},
};

#[derive(Clone)]
pub struct PurchaseService {
    purchase_repo: PurchaseRepository,
    product_repo: ProductRepository,
    audit_repo: AuditRepository,
    ledger: LedgerService,
    gate: AuthorizationGate,
    pool: SqlitePool,
}

impl PurchaseService {
    pub fn new(
        purchase_repo: PurchaseRepository,
        product_repo: ProductRepository,
        audit_repo: AuditRepository,
        ledger: LedgerService,
        gate: AuthorizationGate,
        pool: SqlitePool,
    ) -> Self {
        Self {
            purchase_repo,
            product_repo,
            audit_repo,
            ledger,
            gate,
            pool,
        }
    }

    /// Records a purchase in `ordered` status. No stock moves yet; that
    /// happens on delivery.
    pub async fn create_purchase(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        payload: CreatePurchasePayload,
    ) -> Result<PurchaseWithItems, AppError> {
        self.gate.require(actor, PermissionCode::PurchasesCreate).await?;

        let mut tx = self.pool.begin().await?;

        if !self
            .product_repo
            .supplier_exists(&mut *tx, payload.supplier_id)
            .await?
        {
            return Err(AppError::NotFound("supplier"));
        }

        for item in &payload.items {
            if self
                .product_repo
                .find_by_id(&mut *tx, item.product_id)
                .await?
                .is_none()
            {
                return Err(AppError::NotFound("product"));
            }
        }

        let total: i64 = payload
            .items
            .iter()
            .map(|i| i.unit_price_cents * i.quantity)
            .sum();

        let purchase = self
            .purchase_repo
            .create(
                &mut *tx,
                payload.supplier_id,
                total,
                actor.employee_id,
                payload.invoice_number.as_deref(),
                payload.notes.as_deref(),
            )
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for item in &payload.items {
            items.push(
                self.purchase_repo
                    .add_item(
                        &mut *tx,
                        purchase.purchase_id,
                        item.product_id,
                        item.quantity,
                        item.unit_price_cents,
                    )
                    .await?,
            );
        }

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("purchase_create")
                    .by(actor.employee_id)
                    .on("purchase", purchase.purchase_id)
                    .new_values(serde_json::json!({
                        "totalAmountCents": purchase.total_amount_cents,
                        "itemCount": items.len(),
                    }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(PurchaseWithItems { purchase, items })
    }

    /// Marks an ordered purchase delivered and books one incoming movement
    /// per line. The guarded status write makes a second delivery attempt
    /// fail without double-counting stock.
    pub async fn mark_delivered(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        purchase_id: i64,
    ) -> Result<Purchase, AppError> {
        self.gate.require(actor, PermissionCode::PurchasesCreate).await?;

        let mut tx = self.pool.begin().await?;

        let purchase = self
            .purchase_repo
            .find_by_id(&mut *tx, purchase_id)
            .await?
            .ok_or(AppError::NotFound("purchase"))?;

        let moved = self
            .purchase_repo
            .set_status(
                &mut *tx,
                purchase_id,
                PurchaseStatus::Ordered,
                PurchaseStatus::Delivered,
            )
            .await?;
        if !moved {
            return Err(AppError::Validation(format!(
                "purchase is not awaiting delivery (status: {})",
                purchase_status_name(purchase.status)
            )));
        }

        let items = self.purchase_repo.items_for(&mut *tx, purchase_id).await?;
        for item in &items {
            self.ledger
                .apply(
                    &mut *tx,
                    NewMovement {
                        product_id: item.product_id,
                        movement_type: MovementType::Incoming,
                        quantity: item.quantity,
                        reference_id: Some(purchase_id),
                        reference_type: Some("purchase".into()),
                        employee_id: actor.employee_id,
                        notes: None,
                    },
                )
                .await?;
        }

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("purchase_delivered")
                    .by(actor.employee_id)
                    .on("purchase", purchase_id)
                    .new_values(serde_json::json!({ "itemCount": items.len() }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        let updated = self
            .purchase_repo
            .find_by_id(&mut *tx, purchase_id)
            .await?
            .ok_or(AppError::NotFound("purchase"))?;

        tx.commit().await?;

        tracing::info!(purchase_id, lines = items.len(), "purchase delivered");
        Ok(updated)
    }

    /// Cancels a purchase that has not been delivered. No stock ever moved,
    /// so there is nothing to compensate.
    pub async fn cancel_purchase(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        purchase_id: i64,
    ) -> Result<Purchase, AppError> {
        self.gate.require(actor, PermissionCode::PurchasesCreate).await?;

        let mut tx = self.pool.begin().await?;

        let purchase = self
            .purchase_repo
            .find_by_id(&mut *tx, purchase_id)
            .await?
            .ok_or(AppError::NotFound("purchase"))?;

        let moved = self
            .purchase_repo
            .set_status(
                &mut *tx,
                purchase_id,
                PurchaseStatus::Ordered,
                PurchaseStatus::Cancelled,
            )
            .await?;
        if !moved {
            return Err(AppError::Validation(format!(
                "only an ordered purchase can be cancelled (status: {})",
                purchase_status_name(purchase.status)
            )));
        }

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("purchase_cancel")
                    .by(actor.employee_id)
                    .on("purchase", purchase_id)
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        let updated = self
            .purchase_repo
            .find_by_id(&mut *tx, purchase_id)
            .await?
            .ok_or(AppError::NotFound("purchase"))?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn get_purchase(
        &self,
        actor: &Employee,
        purchase_id: i64,
    ) -> Result<PurchaseWithItems, AppError> {
        self.gate.require(actor, PermissionCode::PurchasesView).await?;
        let purchase = self
            .purchase_repo
            .find_by_id(&self.pool, purchase_id)
            .await?
            .ok_or(AppError::NotFound("purchase"))?;
        let items = self.purchase_repo.items_for(&self.pool, purchase_id).await?;
        Ok(PurchaseWithItems { purchase, items })
    }

    pub async fn list_purchases(&self, actor: &Employee) -> Result<Vec<Purchase>, AppError> {
        self.gate.require(actor, PermissionCode::PurchasesView).await?;
        self.purchase_repo.list().await
    }
}

fn purchase_status_name(status: PurchaseStatus) -> &'static str {
    match status {
        PurchaseStatus::Ordered => "ordered",
        PurchaseStatus::Delivered => "delivered",
        PurchaseStatus::Cancelled => "cancelled",
    }
}
