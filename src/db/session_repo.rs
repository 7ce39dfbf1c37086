// src/db/session_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::session::UserSession;

#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
        session_token: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<UserSession, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let session = sqlx::query_as::<_, UserSession>(
            r#"
            INSERT INTO user_session (employee_id, session_token, login_time, ip_address, user_agent, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, 1)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(session_token)
        .bind(Utc::now())
        .bind(ip_address)
        .bind(user_agent)
        .fetch_one(executor)
        .await?;
        Ok(session)
    }

    pub async fn find_active_by_token(
        &self,
        session_token: &str,
    ) -> Result<Option<UserSession>, AppError> {
        let session = sqlx::query_as::<_, UserSession>(
            "SELECT * FROM user_session WHERE session_token = ?1 AND is_active = 1",
        )
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Closes the session. Returns false when the token was unknown or the
    /// session was already closed, so a repeated logout is a no-op.
    pub async fn end_by_token<'e, E>(
        &self,
        executor: E,
        session_token: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE user_session
            SET is_active = 0, logout_time = ?2
            WHERE session_token = ?1 AND is_active = 1
            "#,
        )
        .bind(session_token)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Closes every open session of one employee, e.g. on deactivation.
    pub async fn end_all_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE user_session
            SET is_active = 0, logout_time = ?2
            WHERE employee_id = ?1 AND is_active = 1
            "#,
        )
        .bind(employee_id)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_active(&self) -> Result<Vec<UserSession>, AppError> {
        let sessions = sqlx::query_as::<_, UserSession>(
            "SELECT * FROM user_session WHERE is_active = 1 ORDER BY login_time DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }
}
