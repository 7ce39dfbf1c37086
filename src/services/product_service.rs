// src/services/product_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{audit_repo::AuditRepository, product_repo::ProductRepository},
    models::{
        audit::NewAuditEntry,
        employee::Employee,
        inventory::{MovementType, NewMovement},
        product::{
            Category, ChangePricePayload, CreateProductPayload, Customer, PriceHistoryEntry,
            Product, Supplier, UpdateProductPayload,
        },
        rbac::PermissionCode,
        session::ClientMeta,
    },
    services::{authz::AuthorizationGate, ledger_service::LedgerService},
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    audit_repo: AuditRepository,
    ledger: LedgerService,
    gate: AuthorizationGate,
    pool: SqlitePool,
}

impl ProductService {
    pub fn new(
        product_repo: ProductRepository,
        audit_repo: AuditRepository,
        ledger: LedgerService,
        gate: AuthorizationGate,
        pool: SqlitePool,
    ) -> Self {
        Self {
            product_repo,
            audit_repo,
            ledger,
            gate,
            pool,
        }
    }

    /// Creates a product. A non-zero initial stock is booked through the
    /// ledger as an adjustment, never written directly, so the very first
    /// quantity already has a movement behind it.
    pub async fn create_product(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        payload: CreateProductPayload,
    ) -> Result<Product, AppError> {
        self.gate.require(actor, PermissionCode::ProductsCreate).await?;

        let mut tx = self.pool.begin().await?;

        if !self
            .product_repo
            .category_exists(&mut *tx, payload.category_id)
            .await?
        {
            return Err(AppError::NotFound("category"));
        }
        if let Some(supplier_id) = payload.supplier_id {
            if !self.product_repo.supplier_exists(&mut *tx, supplier_id).await? {
                return Err(AppError::NotFound("supplier"));
            }
        }

        let product = self
            .product_repo
            .create(
                &mut *tx,
                &payload.product_name,
                payload.description.as_deref(),
                &payload.unit,
                payload.category_id,
                payload.price_cents,
                payload.barcode.as_deref(),
                payload.supplier_id,
                actor.employee_id,
            )
            .await?;

        // Opening price is part of the history from day one.
        self.product_repo
            .insert_price_history(
                &mut *tx,
                product.product_id,
                None,
                payload.price_cents,
                actor.employee_id,
                Some("initial price"),
            )
            .await?;

        let product = if payload.initial_stock > 0 {
            self.ledger
                .apply(
                    &mut *tx,
                    NewMovement {
                        product_id: product.product_id,
                        movement_type: MovementType::Adjustment,
                        quantity: payload.initial_stock,
                        reference_id: Some(product.product_id),
                        reference_type: Some("initial_stock".into()),
                        employee_id: actor.employee_id,
                        notes: None,
                    },
                )
                .await?;
            self.product_repo
                .find_by_id(&mut *tx, product.product_id)
                .await?
                .ok_or(AppError::NotFound("product"))?
        } else {
            product
        };

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("product_create")
                    .by(actor.employee_id)
                    .on("product", product.product_id)
                    .new_values(serde_json::json!({
                        "productName": product.product_name,
                        "priceCents": product.price_cents,
                        "stockQuantity": product.stock_quantity,
                    }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        product_id: i64,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        self.gate.require(actor, PermissionCode::ProductsEdit).await?;

        let mut tx = self.pool.begin().await?;

        let before = self
            .product_repo
            .find_by_id(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("product"))?;

        if let Some(category_id) = payload.category_id {
            if !self.product_repo.category_exists(&mut *tx, category_id).await? {
                return Err(AppError::NotFound("category"));
            }
        }
        if let Some(supplier_id) = payload.supplier_id {
            if !self.product_repo.supplier_exists(&mut *tx, supplier_id).await? {
                return Err(AppError::NotFound("supplier"));
            }
        }

        let updated = self
            .product_repo
            .update(
                &mut *tx,
                product_id,
                payload.product_name.as_deref(),
                payload.description.as_deref(),
                payload.unit.as_deref(),
                payload.category_id,
                payload.barcode.as_deref(),
                payload.supplier_id,
                payload.is_active,
                actor.employee_id,
            )
            .await?
            .ok_or(AppError::NotFound("product"))?;

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("product_update")
                    .by(actor.employee_id)
                    .on("product", product_id)
                    .old(serde_json::json!({
                        "productName": before.product_name,
                        "isActive": before.is_active,
                    }))
                    .new_values(serde_json::json!({
                        "productName": updated.product_name,
                        "isActive": updated.is_active,
                    }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Changes the price and appends a history entry in the same
    /// transaction. Setting the same price again still leaves a trace.
    pub async fn change_price(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        product_id: i64,
        payload: ChangePricePayload,
    ) -> Result<PriceHistoryEntry, AppError> {
        self.gate.require(actor, PermissionCode::PriceChange).await?;

        let mut tx = self.pool.begin().await?;

        let product = self
            .product_repo
            .find_by_id(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("product"))?;

        self.product_repo
            .set_price(&mut *tx, product_id, payload.new_price_cents, actor.employee_id)
            .await?;

        let entry = self
            .product_repo
            .insert_price_history(
                &mut *tx,
                product_id,
                Some(product.price_cents),
                payload.new_price_cents,
                actor.employee_id,
                payload.reason.as_deref(),
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("price_change")
                    .by(actor.employee_id)
                    .on("product", product_id)
                    .old(serde_json::json!({ "priceCents": product.price_cents }))
                    .new_values(serde_json::json!({ "priceCents": payload.new_price_cents }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Soft delete when anything references the product, hard delete (row
    /// plus its price history) when nothing does.
    pub async fn delete_product(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        product_id: i64,
    ) -> Result<bool, AppError> {
        self.gate.require(actor, PermissionCode::ProductsDelete).await?;

        let mut tx = self.pool.begin().await?;

        let product = self
            .product_repo
            .find_by_id(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("product"))?;

        let referenced = self.product_repo.is_referenced(&mut *tx, product_id).await?;

        let hard_deleted = if referenced {
            self.product_repo
                .soft_delete(&mut *tx, product_id, actor.employee_id)
                .await?;
            false
        } else {
            self.product_repo.delete_price_history(&mut *tx, product_id).await?;
            self.product_repo.delete_row(&mut *tx, product_id).await?;
            true
        };

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new(if hard_deleted {
                    "product_delete"
                } else {
                    "product_deactivate"
                })
                .by(actor.employee_id)
                .on("product", product_id)
                .old(serde_json::json!({ "productName": product.product_name }))
                .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(hard_deleted)
    }

    pub async fn get_product(
        &self,
        actor: &Employee,
        product_id: i64,
    ) -> Result<Product, AppError> {
        self.gate.require(actor, PermissionCode::ProductsView).await?;
        self.product_repo
            .find_by_id(&self.pool, product_id)
            .await?
            .ok_or(AppError::NotFound("product"))
    }

    pub async fn list_products(
        &self,
        actor: &Employee,
        include_inactive: bool,
    ) -> Result<Vec<Product>, AppError> {
        self.gate.require(actor, PermissionCode::ProductsView).await?;
        self.product_repo.list(include_inactive).await
    }

    pub async fn price_history(
        &self,
        actor: &Employee,
        product_id: i64,
    ) -> Result<Vec<PriceHistoryEntry>, AppError> {
        self.gate.require(actor, PermissionCode::ProductsView).await?;
        if self
            .product_repo
            .find_by_id(&self.pool, product_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("product"));
        }
        self.product_repo.price_history_for(product_id).await
    }

    pub async fn list_categories(&self, actor: &Employee) -> Result<Vec<Category>, AppError> {
        self.gate.require(actor, PermissionCode::ProductsView).await?;
        self.product_repo.list_categories().await
    }

    pub async fn list_suppliers(&self, actor: &Employee) -> Result<Vec<Supplier>, AppError> {
        self.gate.require(actor, PermissionCode::SuppliersView).await?;
        self.product_repo.list_suppliers().await
    }

    pub async fn list_customers(&self, actor: &Employee) -> Result<Vec<Customer>, AppError> {
        self.gate.require(actor, PermissionCode::CustomersView).await?;
        self.product_repo.list_customers().await
    }
}
