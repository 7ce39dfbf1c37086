// src/db/rbac_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::rbac::{Permission, Role};

#[derive(Clone)]
pub struct RbacRepository {
    pool: SqlitePool,
}

impl RbacRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO role (role_name, description, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Integrity(format!("role '{name}' already exists"));
                }
            }
            e.into()
        })
    }

    pub async fn find_role<'e, E>(&self, executor: E, role_id: i64) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM role WHERE role_id = ?1")
            .bind(role_id)
            .fetch_optional(executor)
            .await?;
        Ok(role)
    }

    pub async fn find_role_by_name<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM role WHERE role_name = ?1")
            .bind(name)
            .fetch_optional(executor)
            .await?;
        Ok(role)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM role ORDER BY role_name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permission ORDER BY module ASC, permission_code ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    /// Idempotent catalog insert; keeps re-seeding safe.
    pub async fn ensure_permission<'e, E>(
        &self,
        executor: E,
        code: &str,
        module: &str,
        description: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO permission (permission_code, module, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (permission_code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(module)
        .bind(description)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn assign_permission<'e, E>(
        &self,
        executor: E,
        role_id: i64,
        permission_code: &str,
        granted_by: Option<i64>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO role_permission (role_id, permission_id, granted_at, granted_by_employee_id)
            SELECT ?1, permission_id, ?3, ?4
            FROM permission
            WHERE permission_code = ?2
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_code)
        .bind(Utc::now())
        .bind(granted_by)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn revoke_permission<'e, E>(
        &self,
        executor: E,
        role_id: i64,
        permission_code: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM role_permission
            WHERE role_id = ?1
              AND permission_id = (SELECT permission_id FROM permission WHERE permission_code = ?2)
            "#,
        )
        .bind(role_id)
        .bind(permission_code)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn role_permission_codes(&self, role_id: i64) -> Result<Vec<String>, AppError> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.permission_code
            FROM role_permission rp
            JOIN permission p ON p.permission_id = rp.permission_id
            WHERE rp.role_id = ?1
            ORDER BY p.permission_code ASC
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    /// The whole authorization decision as one EXISTS query: the employee
    /// must be active and their role must hold the exact code.
    pub async fn employee_has_permission(
        &self,
        employee_id: i64,
        permission_code: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM employee e
                JOIN role_permission rp ON rp.role_id = e.role_id
                JOIN permission p ON p.permission_id = rp.permission_id
                WHERE e.employee_id = ?1
                  AND e.is_active = 1
                  AND p.permission_code = ?2
            )
            "#,
        )
        .bind(employee_id)
        .bind(permission_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
