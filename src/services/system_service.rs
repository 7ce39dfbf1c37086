// src/services/system_service.rs

use crate::{
    common::error::AppError,
    db::audit_repo::AuditRepository,
    models::{audit::AuditEntry, employee::Employee, rbac::PermissionCode, session::UserSession},
    services::{auth_service::AuthService, authz::AuthorizationGate},
};

/// Read-side operations for administrators: audit trail and live sessions.
#[derive(Clone)]
pub struct SystemService {
    audit_repo: AuditRepository,
    auth: AuthService,
    gate: AuthorizationGate,
}

impl SystemService {
    pub fn new(audit_repo: AuditRepository, auth: AuthService, gate: AuthorizationGate) -> Self {
        Self {
            audit_repo,
            auth,
            gate,
        }
    }

    pub async fn audit_trail(
        &self,
        actor: &Employee,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditEntry>, AppError> {
        self.gate.require(actor, PermissionCode::ViewAuditLog).await?;
        self.audit_repo.list(limit.clamp(1, 500), offset.max(0)).await
    }

    pub async fn audit_for_record(
        &self,
        actor: &Employee,
        table_name: &str,
        record_id: i64,
    ) -> Result<Vec<AuditEntry>, AppError> {
        self.gate.require(actor, PermissionCode::ViewAuditLog).await?;
        self.audit_repo.list_for_record(table_name, record_id).await
    }

    pub async fn active_sessions(&self, actor: &Employee) -> Result<Vec<UserSession>, AppError> {
        self.gate.require(actor, PermissionCode::ViewSessions).await?;
        self.auth.list_active_sessions().await
    }
}
