// src/models/employee.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: i64,
    pub full_name: String,
    pub position: String,
    pub role_id: i64,
    pub hire_date: NaiveDate,
    pub salary_cents: Option<i64>,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    #[validate(length(min = 1, max = 200, message = "full name must be 1-200 characters"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 100, message = "position must be 1-100 characters"))]
    pub position: String,
    pub role_id: i64,
    pub hire_date: NaiveDate,
    #[validate(range(min = 0, message = "salary cannot be negative"))]
    pub salary_cents: Option<i64>,
    #[validate(length(min = 3, max = 50, message = "login must be 3-50 characters"))]
    pub login: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeePayload {
    #[validate(length(min = 1, max = 200, message = "full name must be 1-200 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "position must be 1-100 characters"))]
    pub position: Option<String>,
    pub role_id: Option<i64>,
    #[validate(range(min = 0, message = "salary cannot be negative"))]
    pub salary_cents: Option<i64>,
    pub is_active: Option<bool>,
}
