// src/db/order_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::orders::{Order, OrderItem, OrderStatus};

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        customer_id: Option<i64>,
        total_amount_cents: i64,
        employee_id: i64,
        discount_bp: i64,
        payment_type: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (order_date, customer_id, total_amount_cents, status, employee_id,
                 discount_bp, payment_type, notes, created_at)
            VALUES (?1, ?2, ?3, 'received', ?4, ?5, ?6, ?7, ?1)
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(customer_id)
        .bind(total_amount_cents)
        .bind(employee_id)
        .bind(discount_bp)
        .bind(payment_type)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        product_id: i64,
        quantity: i64,
        item_price_cents: i64,
        item_discount_bp: i64,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO orders_item
                (order_id, product_id, quantity, item_price_cents, item_discount_bp, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(item_price_cents)
        .bind(item_discount_bp)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        order_id: i64,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = ?1")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn items_for<'e, E>(
        &self,
        executor: E,
        order_id: i64,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM orders_item WHERE order_id = ?1 ORDER BY order_item_id ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list(&self) -> Result<Vec<Order>, AppError> {
        let orders =
            sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY order_date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(orders)
    }

    /// Status write guarded by the expected current status, so two racing
    /// transitions cannot both win.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4 WHERE order_id = ?1 AND status = ?2",
        )
        .bind(order_id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
