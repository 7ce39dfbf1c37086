// src/config.rs

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditRepository, employee_repo::EmployeeRepository,
        ledger_repo::LedgerRepository, order_repo::OrderRepository,
        product_repo::ProductRepository, purchase_repo::PurchaseRepository,
        rbac_repo::RbacRepository, session_repo::SessionRepository,
    },
    services::{
        auth_service::AuthService, authz::AuthorizationGate, employee_service::EmployeeService,
        ledger_service::LedgerService, order_service::OrderService,
        product_service::ProductService, purchase_service::PurchaseService,
        system_service::SystemService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth_service: AuthService,
    pub employee_service: EmployeeService,
    pub product_service: ProductService,
    pub ledger_service: LedgerService,
    pub order_service: OrderService,
    pub purchase_service: PurchaseService,
    pub system_service: SystemService,
}

impl AppState {
    pub async fn new() -> Result<Self, AppError> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://warehouse.db".to_string());

        let options = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self::with_pool(pool))
    }

    /// Wires every repository and service onto an existing pool. Tests use
    /// this with an in-memory database.
    pub fn with_pool(pool: SqlitePool) -> Self {
        let rbac_repo = RbacRepository::new(pool.clone());
        let employee_repo = EmployeeRepository::new(pool.clone());
        let session_repo = SessionRepository::new(pool.clone());
        let product_repo = ProductRepository::new(pool.clone());
        let ledger_repo = LedgerRepository::new(pool.clone());
        let order_repo = OrderRepository::new(pool.clone());
        let purchase_repo = PurchaseRepository::new(pool.clone());
        let audit_repo = AuditRepository::new(pool.clone());

        let gate = AuthorizationGate::new(rbac_repo.clone());

        let auth_service = AuthService::new(
            employee_repo.clone(),
            session_repo.clone(),
            rbac_repo.clone(),
            audit_repo.clone(),
            pool.clone(),
        );
        let ledger_service = LedgerService::new(
            product_repo.clone(),
            ledger_repo.clone(),
            audit_repo.clone(),
            gate.clone(),
            pool.clone(),
        );
        let product_service = ProductService::new(
            product_repo.clone(),
            audit_repo.clone(),
            ledger_service.clone(),
            gate.clone(),
            pool.clone(),
        );
        let order_service = OrderService::new(
            order_repo,
            product_repo.clone(),
            audit_repo.clone(),
            ledger_service.clone(),
            gate.clone(),
            pool.clone(),
        );
        let purchase_service = PurchaseService::new(
            purchase_repo,
            product_repo,
            audit_repo.clone(),
            ledger_service.clone(),
            gate.clone(),
            pool.clone(),
        );
        let employee_service = EmployeeService::new(
            employee_repo,
            rbac_repo,
            session_repo,
            audit_repo.clone(),
            gate.clone(),
            pool.clone(),
        );
        let system_service = SystemService::new(audit_repo, auth_service.clone(), gate);

        Self {
            pool,
            auth_service,
            employee_service,
            product_service,
            ledger_service,
            order_service,
            purchase_service,
            system_service,
        }
    }
}
