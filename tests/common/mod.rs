// tests/common/mod.rs
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use warehouse_backend::{
    MIGRATOR,
    config::AppState,
    db::{employee_repo::EmployeeRepository, rbac_repo::RbacRepository},
    models::{employee::Employee, product::CreateProductPayload, product::Product, session::ClientMeta},
    seed,
};

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub const TEST_PASSWORD: &str = "password123";

/// Fresh in-memory database with migrations and RBAC seed applied.
/// One connection only, so the whole test shares a single SQLite instance.
pub async fn test_state() -> AppState {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool: SqlitePool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    MIGRATOR.run(&pool).await.unwrap();
    seed::seed_rbac(&pool).await.unwrap();

    AppState::with_pool(pool)
}

pub fn meta() -> ClientMeta {
    ClientMeta::default()
}

/// Creates an active employee holding the named seeded role.
pub async fn employee_with_role(state: &AppState, role_name: &str) -> Employee {
    let rbac_repo = RbacRepository::new(state.pool.clone());
    let role = rbac_repo
        .find_role_by_name(&state.pool, role_name)
        .await
        .unwrap()
        .expect("seeded role should exist");

    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let employee_repo = EmployeeRepository::new(state.pool.clone());
    employee_repo
        .create(
            &state.pool,
            &format!("Test Employee {n}"),
            "Tester",
            role.role_id,
            Utc::now().date_naive(),
            None,
            &format!("user{n}"),
            // low cost keeps the suite fast
            &bcrypt::hash(TEST_PASSWORD, 4).unwrap(),
        )
        .await
        .unwrap()
}

pub async fn admin(state: &AppState) -> Employee {
    employee_with_role(state, "Администратор").await
}

pub async fn seller(state: &AppState) -> Employee {
    employee_with_role(state, "Продавец").await
}

pub async fn warehouse_manager(state: &AppState) -> Employee {
    employee_with_role(state, "Менеджер склада").await
}

pub async fn accountant(state: &AppState) -> Employee {
    employee_with_role(state, "Бухгалтер").await
}

pub async fn category_id(state: &AppState) -> i64 {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO category (category_name, created_at) VALUES (?1, ?2) RETURNING category_id",
    )
    .bind(format!("Category {n}"))
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await
    .unwrap()
}

pub async fn supplier_id(state: &AppState) -> i64 {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO supplier (company_name, is_active, created_at) VALUES (?1, 1, ?2) RETURNING supplier_id",
    )
    .bind(format!("Supplier {n}"))
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await
    .unwrap()
}

pub async fn customer_id(state: &AppState) -> i64 {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO customer (customer_name, created_at) VALUES (?1, ?2) RETURNING customer_id",
    )
    .bind(format!("Customer {n}"))
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await
    .unwrap()
}

/// Creates a product through the service so the initial stock flows through
/// the ledger like it would in production.
pub async fn product(
    state: &AppState,
    actor: &Employee,
    price_cents: i64,
    initial_stock: i64,
) -> Product {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let category_id = category_id(state).await;
    state
        .product_service
        .create_product(
            actor,
            &meta(),
            CreateProductPayload {
                product_name: format!("Product {n}"),
                description: None,
                unit: "pcs".into(),
                category_id,
                price_cents,
                initial_stock,
                barcode: None,
                supplier_id: None,
            },
        )
        .await
        .unwrap()
}

pub async fn stock_of(state: &AppState, product_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT stock_quantity FROM product WHERE product_id = ?1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await
        .unwrap()
}

pub async fn movement_count(state: &AppState, product_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_movement WHERE product_id = ?1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await
        .unwrap()
}
