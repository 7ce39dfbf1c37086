// src/db/purchase_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::purchase::{Purchase, PurchaseItem, PurchaseStatus};

#[derive(Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        supplier_id: i64,
        total_amount_cents: i64,
        employee_id: i64,
        invoice_number: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchase
                (purchase_date, supplier_id, total_amount_cents, employee_id,
                 status, invoice_number, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, 'ordered', ?5, ?6, ?1)
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(supplier_id)
        .bind(total_amount_cents)
        .bind(employee_id)
        .bind(invoice_number)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        purchase_id: i64,
        product_id: i64,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Result<PurchaseItem, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let item = sqlx::query_as::<_, PurchaseItem>(
            r#"
            INSERT INTO purchase_item (purchase_id, product_id, quantity, unit_price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(purchase_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price_cents)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        purchase_id: i64,
    ) -> Result<Option<Purchase>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let purchase =
            sqlx::query_as::<_, Purchase>("SELECT * FROM purchase WHERE purchase_id = ?1")
                .bind(purchase_id)
                .fetch_optional(executor)
                .await?;
        Ok(purchase)
    }

    pub async fn items_for<'e, E>(
        &self,
        executor: E,
        purchase_id: i64,
    ) -> Result<Vec<PurchaseItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_item WHERE purchase_id = ?1 ORDER BY purchase_item_id ASC",
        )
        .bind(purchase_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list(&self) -> Result<Vec<Purchase>, AppError> {
        let purchases =
            sqlx::query_as::<_, Purchase>("SELECT * FROM purchase ORDER BY purchase_date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(purchases)
    }

    /// Guarded status write; the WHERE clause makes a double delivery (or a
    /// delivery of a cancelled purchase) lose the race cleanly.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        purchase_id: i64,
        from: PurchaseStatus,
        to: PurchaseStatus,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let delivery_date = (to == PurchaseStatus::Delivered).then(Utc::now);
        let result = sqlx::query(
            r#"
            UPDATE purchase
            SET status = ?3, delivery_date = COALESCE(?4, delivery_date)
            WHERE purchase_id = ?1 AND status = ?2
            "#,
        )
        .bind(purchase_id)
        .bind(from)
        .bind(to)
        .bind(delivery_date)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
