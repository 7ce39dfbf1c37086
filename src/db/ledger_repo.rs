// src/db/ledger_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::inventory::{NewMovement, StockMovement};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        mv: &NewMovement,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movement
                (product_id, movement_type, quantity, movement_date,
                 reference_id, reference_type, employee_id, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(mv.product_id)
        .bind(mv.movement_type)
        .bind(mv.quantity)
        .bind(Utc::now())
        .bind(mv.reference_id)
        .bind(mv.reference_type.as_deref())
        .bind(mv.employee_id)
        .bind(mv.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    pub async fn list_for_product(
        &self,
        product_id: i64,
    ) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movement
            WHERE product_id = ?1
            ORDER BY movement_date DESC, movement_id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Signed sum of the whole ledger for one product. Must always equal the
    /// product's denormalized `stock_quantity`.
    pub async fn signed_sum_for_product<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sum = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(
                CASE movement_type
                    WHEN 'outgoing' THEN -quantity
                    ELSE quantity
                END
            ), 0)
            FROM stock_movement
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_one(executor)
        .await?;
        Ok(sum)
    }
}
