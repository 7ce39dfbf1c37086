// tests/sessions.rs

mod common;

use common::*;
use warehouse_backend::common::AppError;
use warehouse_backend::models::employee::UpdateEmployeePayload;

#[tokio::test]
async fn login_returns_token_and_role_permissions() {
    let state = test_state().await;
    let employee = seller(&state).await;

    let response = state
        .auth_service
        .login(&employee.login, TEST_PASSWORD, &meta())
        .await
        .unwrap();

    assert_eq!(response.employee_id, employee.employee_id);
    assert_eq!(response.session_token.len(), 43);
    assert!(response.permissions.contains(&"orders.create".to_string()));
    assert!(!response.permissions.contains(&"products.delete".to_string()));

    let resolved = state
        .auth_service
        .resolve_token(&response.session_token)
        .await
        .unwrap();
    assert_eq!(resolved.employee_id, employee.employee_id);
}

#[tokio::test]
async fn wrong_password_and_unknown_login_fail_alike() {
    let state = test_state().await;
    let employee = seller(&state).await;

    let err = state
        .auth_service
        .login(&employee.login, "not-the-password", &meta())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication));

    let err = state
        .auth_service
        .login("nobody", TEST_PASSWORD, &meta())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication));
}

#[tokio::test]
async fn inactive_account_cannot_log_in() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let employee = seller(&state).await;

    state
        .employee_service
        .deactivate_employee(&boss, &meta(), employee.employee_id)
        .await
        .unwrap();

    let err = state
        .auth_service
        .login(&employee.login, TEST_PASSWORD, &meta())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let state = test_state().await;
    let employee = seller(&state).await;
    let response = state
        .auth_service
        .login(&employee.login, TEST_PASSWORD, &meta())
        .await
        .unwrap();

    assert!(state.auth_service.logout(&response.session_token, &meta()).await.unwrap());
    assert!(!state.auth_service.logout(&response.session_token, &meta()).await.unwrap());
    assert!(!state.auth_service.logout("garbage-token", &meta()).await.unwrap());

    let err = state
        .auth_service
        .resolve_token(&response.session_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication));
}

#[tokio::test]
async fn deactivation_closes_open_sessions() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let employee = seller(&state).await;
    let response = state
        .auth_service
        .login(&employee.login, TEST_PASSWORD, &meta())
        .await
        .unwrap();

    state
        .employee_service
        .update_employee(
            &boss,
            &meta(),
            employee.employee_id,
            UpdateEmployeePayload {
                full_name: None,
                position: None,
                role_id: None,
                salary_cents: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

    let err = state
        .auth_service
        .resolve_token(&response.session_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication));
}

#[tokio::test]
async fn concurrent_sessions_are_independent() {
    let state = test_state().await;
    let employee = seller(&state).await;

    let first = state
        .auth_service
        .login(&employee.login, TEST_PASSWORD, &meta())
        .await
        .unwrap();
    let second = state
        .auth_service
        .login(&employee.login, TEST_PASSWORD, &meta())
        .await
        .unwrap();
    assert_ne!(first.session_token, second.session_token);

    state.auth_service.logout(&first.session_token, &meta()).await.unwrap();
    // the other session stays alive
    state.auth_service.resolve_token(&second.session_token).await.unwrap();
}

#[tokio::test]
async fn admins_see_active_sessions() {
    let state = test_state().await;
    let boss = admin(&state).await;
    let employee = seller(&state).await;
    state
        .auth_service
        .login(&employee.login, TEST_PASSWORD, &meta())
        .await
        .unwrap();

    let sessions = state.system_service.active_sessions(&boss).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].employee_id, employee.employee_id);

    // non-admins are turned away
    let err = state.system_service.active_sessions(&employee).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Authorization {
            permission: "system.view_sessions"
        }
    ));
}
