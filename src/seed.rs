// src/seed.rs

use bcrypt::{DEFAULT_COST, hash};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{employee_repo::EmployeeRepository, rbac_repo::RbacRepository},
    models::rbac::ROLE_MATRIX,
};

/// Seeds the permission catalog, the default roles and their grants.
/// Idempotent; safe to run on every startup.
pub async fn seed_rbac(pool: &SqlitePool) -> Result<(), AppError> {
    let rbac_repo = RbacRepository::new(pool.clone());

    let mut tx = pool.begin().await?;

    for (role_name, description, codes) in ROLE_MATRIX.iter().copied() {
        for code in codes.iter() {
            rbac_repo
                .ensure_permission(&mut *tx, code.as_str(), code.module(), None)
                .await?;
        }

        let role = match rbac_repo.find_role_by_name(&mut *tx, role_name).await? {
            Some(role) => role,
            None => {
                rbac_repo
                    .create_role(&mut *tx, role_name, Some(description))
                    .await?
            }
        };

        for code in codes.iter() {
            rbac_repo
                .assign_permission(&mut *tx, role.role_id, code.as_str(), None)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Creates the bootstrap administrator account when no employee exists yet.
/// The password comes from ADMIN_PASSWORD; without it nothing is created.
pub async fn seed_admin(pool: &SqlitePool) -> Result<(), AppError> {
    let rbac_repo = RbacRepository::new(pool.clone());
    let employee_repo = EmployeeRepository::new(pool.clone());

    if employee_repo.find_by_login("admin").await?.is_some() {
        return Ok(());
    }

    let Ok(password) = std::env::var("ADMIN_PASSWORD") else {
        tracing::warn!("no employees and no ADMIN_PASSWORD set; skipping admin bootstrap");
        return Ok(());
    };

    let password_hash = tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??;

    let mut tx = pool.begin().await?;

    let admin_role = rbac_repo
        .find_role_by_name(&mut *tx, "Администратор")
        .await?
        .ok_or_else(|| anyhow::anyhow!("administrator role missing; run seed_rbac first"))?;

    employee_repo
        .create(
            &mut *tx,
            "Администратор системы",
            "Администратор",
            admin_role.role_id,
            Utc::now().date_naive(),
            None,
            "admin",
            &password_hash,
        )
        .await?;

    tx.commit().await?;
    tracing::info!("bootstrap administrator account created");
    Ok(())
}
