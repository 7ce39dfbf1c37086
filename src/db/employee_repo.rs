// src/db/employee_repo.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;
use crate::models::employee::Employee;

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        position: &str,
        role_id: i64,
        hire_date: NaiveDate,
        salary_cents: Option<i64>,
        login: &str,
        password_hash: &str,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employee
                (full_name, position, role_id, hire_date, salary_cents, login, password_hash,
                 is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
            RETURNING *
            "#,
        )
        .bind(full_name)
        .bind(position)
        .bind(role_id)
        .bind(hire_date)
        .bind(salary_cents)
        .bind(login)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Integrity(format!("login '{login}' is already taken"));
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT * FROM employee WHERE employee_id = ?1")
                .bind(employee_id)
                .fetch_optional(executor)
                .await?;
        Ok(employee)
    }

    pub async fn find_by_login(&self, login: &str) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employee WHERE login = ?1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    pub async fn list(&self) -> Result<Vec<Employee>, AppError> {
        let employees =
            sqlx::query_as::<_, Employee>("SELECT * FROM employee ORDER BY full_name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(employees)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
        full_name: Option<&str>,
        position: Option<&str>,
        role_id: Option<i64>,
        salary_cents: Option<i64>,
        is_active: Option<bool>,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employee SET
                full_name    = COALESCE(?2, full_name),
                position     = COALESCE(?3, position),
                role_id      = COALESCE(?4, role_id),
                salary_cents = COALESCE(?5, salary_cents),
                is_active    = COALESCE(?6, is_active),
                updated_at   = ?7
            WHERE employee_id = ?1
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(full_name)
        .bind(position)
        .bind(role_id)
        .bind(salary_cents)
        .bind(is_active)
        .bind(Utc::now())
        .fetch_optional(executor)
        .await?;
        Ok(employee)
    }

    pub async fn deactivate<'e, E>(&self, executor: E, employee_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE employee SET is_active = 0, updated_at = ?2 WHERE employee_id = ?1",
        )
        .bind(employee_id)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_login<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE employee SET last_login = ?2 WHERE employee_id = ?1")
            .bind(employee_id)
            .bind(Utc::now())
            .execute(executor)
            .await?;
        Ok(())
    }
}
