// src/main.rs

use tokio::net::TcpListener;

use warehouse_backend::{MIGRATOR, build_router, config::AppState, seed};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).compact().init();

    let app_state = AppState::new()
        .await
        .expect("failed to initialize application state");

    MIGRATOR
        .run(&app_state.pool)
        .await
        .expect("failed to run database migrations");

    seed::seed_rbac(&app_state.pool)
        .await
        .expect("failed to seed roles and permissions");
    seed::seed_admin(&app_state.pool)
        .await
        .expect("failed to bootstrap the administrator account");

    let app = build_router(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await.expect("server error");
}
