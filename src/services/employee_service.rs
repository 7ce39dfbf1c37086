// src/services/employee_service.rs

use bcrypt::{DEFAULT_COST, hash};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditRepository, employee_repo::EmployeeRepository,
        rbac_repo::RbacRepository, session_repo::SessionRepository,
    },
    models::{
        audit::NewAuditEntry,
        employee::{CreateEmployeePayload, Employee, UpdateEmployeePayload},
        rbac::{Permission, PermissionCode, Role},
        session::ClientMeta,
    },
    services::authz::AuthorizationGate,
};

#[derive(Clone)]
pub struct EmployeeService {
    employee_repo: EmployeeRepository,
    rbac_repo: RbacRepository,
    session_repo: SessionRepository,
    audit_repo: AuditRepository,
    gate: AuthorizationGate,
    pool: SqlitePool,
}

impl EmployeeService {
    pub fn new(
        employee_repo: EmployeeRepository,
        rbac_repo: RbacRepository,
        session_repo: SessionRepository,
        audit_repo: AuditRepository,
        gate: AuthorizationGate,
        pool: SqlitePool,
    ) -> Self {
        Self {
            employee_repo,
            rbac_repo,
            session_repo,
            audit_repo,
            gate,
            pool,
        }
    }

    pub async fn create_employee(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        payload: CreateEmployeePayload,
    ) -> Result<Employee, AppError> {
        self.gate.require(actor, PermissionCode::EmployeesCreate).await?;

        let password = payload.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??;

        let mut tx = self.pool.begin().await?;

        if self
            .rbac_repo
            .find_role(&mut *tx, payload.role_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("role"));
        }

        let employee = self
            .employee_repo
            .create(
                &mut *tx,
                &payload.full_name,
                &payload.position,
                payload.role_id,
                payload.hire_date,
                payload.salary_cents,
                &payload.login,
                &password_hash,
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("employee_create")
                    .by(actor.employee_id)
                    .on("employee", employee.employee_id)
                    .new_values(serde_json::json!({
                        "login": employee.login,
                        "roleId": employee.role_id,
                    }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(employee)
    }

    pub async fn update_employee(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        employee_id: i64,
        payload: UpdateEmployeePayload,
    ) -> Result<Employee, AppError> {
        self.gate.require(actor, PermissionCode::EmployeesEdit).await?;

        let mut tx = self.pool.begin().await?;

        let before = self
            .employee_repo
            .find_by_id(&mut *tx, employee_id)
            .await?
            .ok_or(AppError::NotFound("employee"))?;

        if let Some(role_id) = payload.role_id {
            if self.rbac_repo.find_role(&mut *tx, role_id).await?.is_none() {
                return Err(AppError::NotFound("role"));
            }
        }

        let updated = self
            .employee_repo
            .update(
                &mut *tx,
                employee_id,
                payload.full_name.as_deref(),
                payload.position.as_deref(),
                payload.role_id,
                payload.salary_cents,
                payload.is_active,
            )
            .await?
            .ok_or(AppError::NotFound("employee"))?;

        // Dropping someone's access also kicks them out of open sessions.
        if payload.is_active == Some(false) && before.is_active {
            self.session_repo
                .end_all_for_employee(&mut *tx, employee_id)
                .await?;
        }

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("employee_update")
                    .by(actor.employee_id)
                    .on("employee", employee_id)
                    .old(serde_json::json!({
                        "roleId": before.role_id,
                        "isActive": before.is_active,
                    }))
                    .new_values(serde_json::json!({
                        "roleId": updated.role_id,
                        "isActive": updated.is_active,
                    }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Deactivation, not row deletion: the employee stays referenced by
    /// orders, movements and the audit trail.
    pub async fn deactivate_employee(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        employee_id: i64,
    ) -> Result<(), AppError> {
        self.gate.require(actor, PermissionCode::EmployeesDelete).await?;

        if actor.employee_id == employee_id {
            return Err(AppError::Validation(
                "you cannot deactivate your own account".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let deactivated = self.employee_repo.deactivate(&mut *tx, employee_id).await?;
        if !deactivated {
            return Err(AppError::NotFound("employee"));
        }
        self.session_repo
            .end_all_for_employee(&mut *tx, employee_id)
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("employee_deactivate")
                    .by(actor.employee_id)
                    .on("employee", employee_id)
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_employees(&self, actor: &Employee) -> Result<Vec<Employee>, AppError> {
        self.gate.require(actor, PermissionCode::EmployeesView).await?;
        self.employee_repo.list().await
    }

    pub async fn get_employee(
        &self,
        actor: &Employee,
        employee_id: i64,
    ) -> Result<Employee, AppError> {
        self.gate.require(actor, PermissionCode::EmployeesView).await?;
        self.employee_repo
            .find_by_id(&self.pool, employee_id)
            .await?
            .ok_or(AppError::NotFound("employee"))
    }

    pub async fn list_roles(&self, actor: &Employee) -> Result<Vec<Role>, AppError> {
        self.gate.require(actor, PermissionCode::EmployeesView).await?;
        self.rbac_repo.list_roles().await
    }

    pub async fn list_permissions(&self, actor: &Employee) -> Result<Vec<Permission>, AppError> {
        self.gate.require(actor, PermissionCode::RolesManage).await?;
        self.rbac_repo.list_permissions().await
    }

    pub async fn grant_permission(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        role_id: i64,
        code: &str,
    ) -> Result<(), AppError> {
        self.gate.require(actor, PermissionCode::RolesManage).await?;

        let code = PermissionCode::parse(code)
            .ok_or_else(|| AppError::Validation(format!("unknown permission code '{code}'")))?;

        let mut tx = self.pool.begin().await?;
        if self.rbac_repo.find_role(&mut *tx, role_id).await?.is_none() {
            return Err(AppError::NotFound("role"));
        }
        self.rbac_repo
            .assign_permission(&mut *tx, role_id, code.as_str(), Some(actor.employee_id))
            .await?;
        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("permission_grant")
                    .by(actor.employee_id)
                    .on("role", role_id)
                    .new_values(serde_json::json!({ "permission": code.as_str() }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn revoke_permission(
        &self,
        actor: &Employee,
        meta: &ClientMeta,
        role_id: i64,
        code: &str,
    ) -> Result<(), AppError> {
        self.gate.require(actor, PermissionCode::RolesManage).await?;

        let code = PermissionCode::parse(code)
            .ok_or_else(|| AppError::Validation(format!("unknown permission code '{code}'")))?;

        let mut tx = self.pool.begin().await?;
        let revoked = self
            .rbac_repo
            .revoke_permission(&mut *tx, role_id, code.as_str())
            .await?;
        if !revoked {
            return Err(AppError::NotFound("role permission"));
        }
        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("permission_revoke")
                    .by(actor.employee_id)
                    .on("role", role_id)
                    .old(serde_json::json!({ "permission": code.as_str() }))
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
