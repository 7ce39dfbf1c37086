// src/services/authz.rs

use crate::{
    common::error::AppError,
    db::rbac_repo::RbacRepository,
    models::{employee::Employee, rbac::PermissionCode},
};

/// Single choke point for permission checks. Every gated workflow calls
/// `require` before touching any data.
#[derive(Clone)]
pub struct AuthorizationGate {
    rbac_repo: RbacRepository,
}

impl AuthorizationGate {
    pub fn new(rbac_repo: RbacRepository) -> Self {
        Self { rbac_repo }
    }

    pub async fn require(
        &self,
        actor: &Employee,
        code: PermissionCode,
    ) -> Result<(), AppError> {
        // An account deactivated mid-session fails closed here even though
        // the middleware already resolved it.
        if !actor.is_active {
            return Err(AppError::Authentication);
        }

        let allowed = self
            .rbac_repo
            .employee_has_permission(actor.employee_id, code.as_str())
            .await?;

        if !allowed {
            tracing::warn!(
                employee_id = actor.employee_id,
                permission = code.as_str(),
                "authorization denied"
            );
            return Err(AppError::Authorization {
                permission: code.as_str(),
            });
        }

        Ok(())
    }
}
