// src/db/audit_repo.rs

use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::audit::{AuditEntry, NewAuditEntry};

#[derive(Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends one audit row. Runs on the caller's transaction so the row
    /// commits (or vanishes) together with the change it describes.
    pub async fn record<'e, E>(
        &self,
        executor: E,
        entry: &NewAuditEntry,
    ) -> Result<AuditEntry, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, AuditEntry>(
            r#"
            INSERT INTO audit_log
                (employee_id, action_type, table_name, record_id,
                 old_values, new_values, ip_address, user_agent, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING *
            "#,
        )
        .bind(entry.employee_id)
        .bind(&entry.action_type)
        .bind(entry.table_name.as_deref())
        .bind(entry.record_id)
        .bind(entry.old_values.clone().map(Json))
        .bind(entry.new_values.clone().map(Json))
        .bind(entry.ip_address.as_deref())
        .bind(entry.user_agent.as_deref())
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AuditEntry>, AppError> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT * FROM audit_log ORDER BY created_at DESC, log_id DESC LIMIT ?1 OFFSET ?2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn list_for_record(
        &self,
        table_name: &str,
        record_id: i64,
    ) -> Result<Vec<AuditEntry>, AppError> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT * FROM audit_log
            WHERE table_name = ?1 AND record_id = ?2
            ORDER BY created_at DESC, log_id DESC
            "#,
        )
        .bind(table_name)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
