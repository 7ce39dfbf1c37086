// src/services/order_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditRepository, order_repo::OrderRepository,
        product_repo::ProductRepository,
    },
    models::{
        audit::NewAuditEntry,
        employee::Employee,
        inventory::{MovementType, NewMovement},
        orders::{CreateOrderPayload, Order, OrderStatus, OrderWithItems, order_total_cents},
        rbac::PermissionCode,
        session::ClientMeta,
    },
    services::{authz::AuthorizationGate, ledger_service::LedgerService},
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    product_repo: ProductRepository,
    audit_repo: AuditRepository,
    ledger: LedgerService,
    gate: AuthorizationGate,
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        product_repo: ProductRepository,
        audit_repo: AuditRepository,
        ledger: LedgerService,
        gate: AuthorizationGate,
        pool: SqlitePool,
    ) -> Self {
        Self {
            order_repo,
            product_repo,
            audit_repo,
            ledger,
            gate,
            pool,
        }
    }

    /// Creates the order header, its lines and one outgoing movement per
    /// line, all in one transaction. Any line failing (unknown or inactive
    /// product, not enough stock, total drift) rolls everything back.
    pub async fn create_order(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        payload: CreateOrderPayload,
    ) -> Result<OrderWithItems, AppError> {
        self.gate.require(actor, PermissionCode::OrdersCreate).await?;

        let mut tx = self.pool.begin().await?;

        if let Some(customer_id) = payload.customer_id {
            if !self.product_repo.customer_exists(&mut *tx, customer_id).await? {
                return Err(AppError::NotFound("customer"));
            }
        }

        // Snapshot the current price of every line before writing anything;
        // the stored line price is the price at sale time.
        let mut lines: Vec<(i64, i64, i64)> = Vec::with_capacity(payload.items.len());
        for item in &payload.items {
            let product = self
                .product_repo
                .find_by_id(&mut *tx, item.product_id)
                .await?
                .ok_or(AppError::NotFound("product"))?;
            if !product.is_active {
                return Err(AppError::Validation(format!(
                    "product {} is no longer sold",
                    product.product_id
                )));
            }
            lines.push((product.price_cents, item.quantity, item.item_discount_bp));
        }

        let total = order_total_cents(&lines, payload.discount_bp);

        // The client shows its own total; reject when it drifts from ours by
        // more than one cent of rounding per line.
        if let Some(expected) = payload.expected_total_cents {
            let tolerance = payload.items.len() as i64;
            if (expected - total).abs() > tolerance {
                return Err(AppError::Validation(format!(
                    "order total mismatch: client sent {expected}, server computed {total}"
                )));
            }
        }

        let order = self
            .order_repo
            .create(
                &mut *tx,
                payload.customer_id,
                total,
                actor.employee_id,
                payload.discount_bp,
                payload.payment_type.as_deref(),
                payload.notes.as_deref(),
            )
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for (item, &(price_cents, _, _)) in payload.items.iter().zip(&lines) {
            let line = self
                .order_repo
                .add_item(
                    &mut *tx,
                    order.order_id,
                    item.product_id,
                    item.quantity,
                    price_cents,
                    item.item_discount_bp,
                )
                .await?;

            self.ledger
                .apply(
                    &mut *tx,
                    NewMovement {
                        product_id: item.product_id,
                        movement_type: MovementType::Outgoing,
                        quantity: item.quantity,
                        reference_id: Some(order.order_id),
                        reference_type: Some("order".into()),
                        employee_id: actor.employee_id,
                        notes: None,
                    },
                )
                .await?;

            items.push(line);
        }

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("order_create")
                    .by(actor.employee_id)
                    .on("orders", order.order_id)
                    .new_values(serde_json::json!({
                        "totalAmountCents": order.total_amount_cents,
                        "itemCount": items.len(),
                    }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = order.order_id,
            total_cents = order.total_amount_cents,
            "order created"
        );

        Ok(OrderWithItems { order, items })
    }

    /// Moves the order one step along received -> processing -> paid ->
    /// completed. Cancellation has its own entry point because it also
    /// restores stock.
    pub async fn update_status(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<Order, AppError> {
        self.gate.require(actor, PermissionCode::OrdersEdit).await?;

        if new_status == OrderStatus::Cancelled {
            return Err(AppError::Validation(
                "use the cancel operation to cancel an order".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound("order"))?;

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::Validation(format!(
                "cannot move order from {} to {}",
                status_name(order.status),
                status_name(new_status)
            )));
        }

        let moved = self
            .order_repo
            .set_status(&mut *tx, order_id, order.status, new_status)
            .await?;
        if !moved {
            // Someone else transitioned the order between our read and write.
            return Err(AppError::Integrity("order status changed concurrently".into()));
        }

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("order_status_change")
                    .by(actor.employee_id)
                    .on("orders", order_id)
                    .old(serde_json::json!({ "status": status_name(order.status) }))
                    .new_values(serde_json::json!({ "status": status_name(new_status) }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        let updated = self
            .order_repo
            .find_by_id(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound("order"))?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Cancels an open order and puts every line's quantity back into stock
    /// as a compensating adjustment referencing the order.
    pub async fn cancel_order(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        order_id: i64,
    ) -> Result<Order, AppError> {
        self.gate.require(actor, PermissionCode::OrdersCancel).await?;

        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound("order"))?;

        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(AppError::Validation(format!(
                "cannot cancel an order in status {}",
                status_name(order.status)
            )));
        }

        let moved = self
            .order_repo
            .set_status(&mut *tx, order_id, order.status, OrderStatus::Cancelled)
            .await?;
        if !moved {
            return Err(AppError::Integrity("order status changed concurrently".into()));
        }

        let items = self.order_repo.items_for(&mut *tx, order_id).await?;
        for item in &items {
            self.ledger
                .apply(
                    &mut *tx,
                    NewMovement {
                        product_id: item.product_id,
                        movement_type: MovementType::Adjustment,
                        quantity: item.quantity,
                        reference_id: Some(order_id),
                        reference_type: Some("order_cancel".into()),
                        employee_id: actor.employee_id,
                        notes: None,
                    },
                )
                .await?;
        }

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("order_cancel")
                    .by(actor.employee_id)
                    .on("orders", order_id)
                    .old(serde_json::json!({ "status": status_name(order.status) }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        let updated = self
            .order_repo
            .find_by_id(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound("order"))?;

        tx.commit().await?;

        tracing::info!(order_id, restored_lines = items.len(), "order cancelled");
        Ok(updated)
    }

    pub async fn get_order(
        &self,
        actor: &Employee,
        order_id: i64,
    ) -> Result<OrderWithItems, AppError> {
        self.gate.require(actor, PermissionCode::OrdersView).await?;
        let order = self
            .order_repo
            .find_by_id(&self.pool, order_id)
            .await?
            .ok_or(AppError::NotFound("order"))?;
        let items = self.order_repo.items_for(&self.pool, order_id).await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn list_orders(&self, actor: &Employee) -> Result<Vec<Order>, AppError> {
        self.gate.require(actor, PermissionCode::OrdersView).await?;
        self.order_repo.list().await
    }

    /// Recomputes the stored total from the stored lines.
    pub async fn recompute_total(&self, order_id: i64) -> Result<i64, AppError> {
        let order = self
            .order_repo
            .find_by_id(&self.pool, order_id)
            .await?
            .ok_or(AppError::NotFound("order"))?;
        let items = self.order_repo.items_for(&self.pool, order_id).await?;
        let lines: Vec<(i64, i64, i64)> = items
            .iter()
            .map(|i| (i.item_price_cents, i.quantity, i.item_discount_bp))
            .collect();
        Ok(order_total_cents(&lines, order.discount_bp))
    }
}

fn status_name(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Received => "received",
        OrderStatus::Processing => "processing",
        OrderStatus::Paid => "paid",
        OrderStatus::Completed => "completed",
        OrderStatus::Cancelled => "cancelled",
    }
}
