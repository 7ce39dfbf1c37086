// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub log_id: i64,
    pub employee_id: Option<i64>,
    pub action_type: String,
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub old_values: Option<Json<serde_json::Value>>,
    pub new_values: Option<Json<serde_json::Value>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Audit event captured by domain workflows before the commit; the snapshots
/// are whatever JSON best describes the before/after state.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub employee_id: Option<i64>,
    pub action_type: String,
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAuditEntry {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            employee_id: None,
            action_type: action_type.into(),
            table_name: None,
            record_id: None,
            old_values: None,
            new_values: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn by(mut self, employee_id: i64) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    pub fn on(mut self, table_name: impl Into<String>, record_id: i64) -> Self {
        self.table_name = Some(table_name.into());
        self.record_id = Some(record_id);
        self
    }

    pub fn old(mut self, values: serde_json::Value) -> Self {
        self.old_values = Some(values);
        self
    }

    pub fn new_values(mut self, values: serde_json::Value) -> Self {
        self.new_values = Some(values);
        self
    }

    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}
