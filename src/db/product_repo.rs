// src/db/product_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::product::{Category, Customer, PriceHistoryEntry, Product, Supplier};

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        product_name: &str,
        description: Option<&str>,
        unit: &str,
        category_id: i64,
        price_cents: i64,
        barcode: Option<&str>,
        supplier_id: Option<i64>,
        created_by: i64,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO product
                (product_name, description, unit, category_id, price_cents, stock_quantity,
                 barcode, supplier_id, is_active, created_at, created_by_employee_id)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, 1, ?8, ?9)
            RETURNING *
            "#,
        )
        .bind(product_name)
        .bind(description)
        .bind(unit)
        .bind(category_id)
        .bind(price_cents)
        .bind(barcode)
        .bind(supplier_id)
        .bind(Utc::now())
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Integrity("barcode is already in use".into());
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Product>, AppError> {
        let products = if include_inactive {
            sqlx::query_as::<_, Product>("SELECT * FROM product ORDER BY product_name ASC")
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as::<_, Product>(
                "SELECT * FROM product WHERE is_active = 1 ORDER BY product_name ASC",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(products)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        product_name: Option<&str>,
        description: Option<&str>,
        unit: Option<&str>,
        category_id: Option<i64>,
        barcode: Option<&str>,
        supplier_id: Option<i64>,
        is_active: Option<bool>,
        updated_by: i64,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE product SET
                product_name = COALESCE(?2, product_name),
                description  = COALESCE(?3, description),
                unit         = COALESCE(?4, unit),
                category_id  = COALESCE(?5, category_id),
                barcode      = COALESCE(?6, barcode),
                supplier_id  = COALESCE(?7, supplier_id),
                is_active    = COALESCE(?8, is_active),
                updated_at   = ?9,
                updated_by_employee_id = ?10
            WHERE product_id = ?1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(product_name)
        .bind(description)
        .bind(unit)
        .bind(category_id)
        .bind(barcode)
        .bind(supplier_id)
        .bind(is_active)
        .bind(Utc::now())
        .bind(updated_by)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Integrity("barcode is already in use".into());
                }
            }
            e.into()
        })
    }

    /// Atomic stock write. The quantity is adjusted only when the result
    /// would stay non-negative; a false return means the guard refused it
    /// or the product does not exist (the caller tells those apart).
    pub async fn apply_stock_delta<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        delta: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE product
            SET stock_quantity = stock_quantity + ?1
            WHERE product_id = ?2
              AND stock_quantity + ?1 >= 0
            "#,
        )
        .bind(delta)
        .bind(product_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_price<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        new_price_cents: i64,
        updated_by: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE product
            SET price_cents = ?2, updated_at = ?3, updated_by_employee_id = ?4
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .bind(new_price_cents)
        .bind(Utc::now())
        .bind(updated_by)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn soft_delete<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        updated_by: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE product
            SET is_active = 0, updated_at = ?2, updated_by_employee_id = ?3
            WHERE product_id = ?1 AND is_active = 1
            "#,
        )
        .bind(product_id)
        .bind(Utc::now())
        .bind(updated_by)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// True when any order line, purchase line or ledger row points at the
    /// product. Referenced products may only be soft-deleted.
    pub async fn is_referenced<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM orders_item WHERE product_id = ?1)
                OR EXISTS (SELECT 1 FROM purchase_item WHERE product_id = ?1)
                OR EXISTS (SELECT 1 FROM stock_movement WHERE product_id = ?1)
            "#,
        )
        .bind(product_id)
        .fetch_one(executor)
        .await?;
        Ok(referenced)
    }

    pub async fn delete_price_history<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM price_history WHERE product_id = ?1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_row<'e, E>(&self, executor: E, product_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM product WHERE product_id = ?1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_price_history<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        old_price_cents: Option<i64>,
        new_price_cents: i64,
        changed_by: i64,
        reason: Option<&str>,
    ) -> Result<PriceHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let entry = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            INSERT INTO price_history
                (product_id, old_price_cents, new_price_cents, change_date, changed_by_employee_id, reason)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(old_price_cents)
        .bind(new_price_cents)
        .bind(Utc::now())
        .bind(changed_by)
        .bind(reason)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn price_history_for(
        &self,
        product_id: i64,
    ) -> Result<Vec<PriceHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            SELECT * FROM price_history
            WHERE product_id = ?1
            ORDER BY change_date DESC, price_history_id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn category_exists<'e, E>(
        &self,
        executor: E,
        category_id: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM category WHERE category_id = ?1)",
        )
        .bind(category_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn supplier_exists<'e, E>(
        &self,
        executor: E,
        supplier_id: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM supplier WHERE supplier_id = ?1)",
        )
        .bind(supplier_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn customer_exists<'e, E>(
        &self,
        executor: E,
        customer_id: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM customer WHERE customer_id = ?1)",
        )
        .bind(customer_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM category ORDER BY category_name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers =
            sqlx::query_as::<_, Supplier>("SELECT * FROM supplier ORDER BY company_name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(suppliers)
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let customers =
            sqlx::query_as::<_, Customer>("SELECT * FROM customer ORDER BY customer_name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(customers)
    }
}
