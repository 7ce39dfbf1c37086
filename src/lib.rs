// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod seed;
pub mod services;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Builds the full API router on top of an already wired state.
pub fn build_router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    let me_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route("/{id}/price", put(handlers::products::change_price))
        .route("/{id}/price-history", get(handlers::products::price_history))
        .route("/{id}/movements", get(handlers::products::stock_movements))
        .route("/adjustments", post(handlers::products::adjust_stock))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let reference_routes = Router::new()
        .route("/categories", get(handlers::products::list_categories))
        .route("/suppliers", get(handlers::products::list_suppliers))
        .route("/customers", get(handlers::products::list_customers))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let order_routes = Router::new()
        .route(
            "/",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/{id}", get(handlers::orders::get_order))
        .route("/{id}/status", put(handlers::orders::update_status))
        .route("/{id}/cancel", post(handlers::orders::cancel_order))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let purchase_routes = Router::new()
        .route(
            "/",
            get(handlers::purchases::list_purchases).post(handlers::purchases::create_purchase),
        )
        .route("/{id}", get(handlers::purchases::get_purchase))
        .route("/{id}/deliver", post(handlers::purchases::mark_delivered))
        .route("/{id}/cancel", post(handlers::purchases::cancel_purchase))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let employee_routes = Router::new()
        .route(
            "/",
            get(handlers::employees::list_employees).post(handlers::employees::create_employee),
        )
        .route(
            "/{id}",
            get(handlers::employees::get_employee)
                .put(handlers::employees::update_employee)
                .delete(handlers::employees::deactivate_employee),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let rbac_routes = Router::new()
        .route("/roles", get(handlers::employees::list_roles))
        .route("/permissions", get(handlers::employees::list_permissions))
        .route(
            "/roles/{id}/permissions",
            post(handlers::employees::grant_permission),
        )
        .route(
            "/roles/{id}/permissions/{code}",
            delete(handlers::employees::revoke_permission),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let system_routes = Router::new()
        .route("/audit", get(handlers::system::audit_trail))
        .route(
            "/audit/{table}/{id}",
            get(handlers::system::audit_for_record),
        )
        .route("/sessions", get(handlers::system::active_sessions))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", me_routes)
        .nest("/api/products", product_routes)
        .nest("/api/reference", reference_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/purchases", purchase_routes)
        .nest("/api/employees", employee_routes)
        .nest("/api/rbac", rbac_routes)
        .nest("/api/system", system_routes)
        .with_state(app_state)
}
