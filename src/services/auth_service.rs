// src/services/auth_service.rs

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bcrypt::verify;
use rand::RngCore;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditRepository, employee_repo::EmployeeRepository,
        rbac_repo::RbacRepository, session_repo::SessionRepository,
    },
    models::{
        audit::NewAuditEntry,
        employee::Employee,
        session::{ClientMeta, LoginResponse, UserSession},
    },
};

#[derive(Clone)]
pub struct AuthService {
    employee_repo: EmployeeRepository,
    session_repo: SessionRepository,
    rbac_repo: RbacRepository,
    audit_repo: AuditRepository,
    pool: SqlitePool,
}

impl AuthService {
    pub fn new(
        employee_repo: EmployeeRepository,
        session_repo: SessionRepository,
        rbac_repo: RbacRepository,
        audit_repo: AuditRepository,
        pool: SqlitePool,
    ) -> Self {
        Self {
            employee_repo,
            session_repo,
            rbac_repo,
            audit_repo,
            pool,
        }
    }

    /// Verifies credentials and opens a session. The same opaque
    /// `Authentication` error covers unknown login, wrong password and a
    /// deactivated account.
    pub async fn login(
        &self,
        login: &str,
        password: &str,
        meta: &ClientMeta,
    ) -> Result<LoginResponse, AppError> {
        let Some(employee) = self.employee_repo.find_by_login(login).await? else {
            // unknown logins burn the same hash cost so response time does
            // not reveal whether the account exists
            let password = password.to_owned();
            let _ = tokio::task::spawn_blocking(move || verify(&password, DUMMY_HASH))
                .await
                .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))?;
            return Err(AppError::Authentication);
        };

        let password = password.to_owned();
        let password_hash = employee.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))??;

        if !is_valid || !employee.is_active {
            return Err(AppError::Authentication);
        }

        let token = generate_session_token();

        let mut tx = self.pool.begin().await?;
        let session = self
            .session_repo
            .create(
                &mut *tx,
                employee.employee_id,
                &token,
                meta.ip_address.as_deref(),
                meta.user_agent.as_deref(),
            )
            .await?;
        self.employee_repo
            .touch_last_login(&mut *tx, employee.employee_id)
            .await?;
        self.audit_repo
            .record(
                &mut *tx,
                &NewAuditEntry::new("login")
                    .by(employee.employee_id)
                    .on("user_session", session.session_id)
                    .client(meta.ip_address.clone(), meta.user_agent.clone()),
            )
            .await?;
        tx.commit().await?;

        let permissions = self.rbac_repo.role_permission_codes(employee.role_id).await?;

        tracing::info!(employee_id = employee.employee_id, "login succeeded");

        Ok(LoginResponse {
            session_token: token,
            employee_id: employee.employee_id,
            full_name: employee.full_name,
            role_id: employee.role_id,
            permissions,
        })
    }

    /// Ends the session for the given token. Returns whether a live session
    /// was actually closed; calling it again (or with garbage) is a no-op.
    pub async fn logout(&self, token: &str, meta: &ClientMeta) -> Result<bool, AppError> {
        let session = self.session_repo.find_active_by_token(token).await?;

        let mut tx = self.pool.begin().await?;
        let closed = self.session_repo.end_by_token(&mut *tx, token).await?;
        if closed {
            if let Some(session) = &session {
                self.audit_repo
                    .record(
                        &mut *tx,
                        &NewAuditEntry::new("logout")
                            .by(session.employee_id)
                            .on("user_session", session.session_id)
                            .client(meta.ip_address.clone(), meta.user_agent.clone()),
                    )
                    .await?;
            }
        }
        tx.commit().await?;
        Ok(closed)
    }

    /// Resolves a bearer token to its employee. Fails when the session is
    /// closed or the account has been deactivated since login.
    pub async fn resolve_token(&self, token: &str) -> Result<Employee, AppError> {
        let session = self
            .session_repo
            .find_active_by_token(token)
            .await?
            .ok_or(AppError::Authentication)?;

        let employee = self
            .employee_repo
            .find_by_id(&self.pool, session.employee_id)
            .await?
            .ok_or(AppError::Authentication)?;

        if !employee.is_active {
            return Err(AppError::Authentication);
        }

        Ok(employee)
    }

    pub async fn list_active_sessions(&self) -> Result<Vec<UserSession>, AppError> {
        self.session_repo.list_active().await
    }
}

/// Well-formed bcrypt hash of no account's password, verified against when a
/// login does not exist. Cost 12 matches the hashes stored for employees.
const DUMMY_HASH: &str = "$2b$12$GhvMmNVjRW29ulnudl.LbuAnUtN/LRfe1JsBm1Xu6LE3059z5Tr8m";

/// 32 random bytes, URL-safe base64 without padding: 256 bits of entropy in
/// a header-friendly string.
fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_long_and_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn dummy_hash_is_well_formed() {
        // a malformed constant would make unknown-login verification error
        // instead of just failing
        assert!(verify("anything", DUMMY_HASH).is_ok());
    }
}
