//! 注册 / 登录 / 刷新流程集成测试

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

use powercore::auth::JwtConfig;
use powercore::db::models::UserCreate;
use powercore::services::{LoginRequest, RefreshRequest};
use powercore::{AppError, Config, ServerState};

async fn test_state() -> ServerState {
    let db = Surreal::new::<Mem>(()).await.expect("mem db");
    db.use_ns("powercore_test")
        .use_db("powercore_test")
        .await
        .expect("ns/db");
    powercore::db::define_tables(&db).await.expect("indexes");

    let config = Config {
        data_dir: "./target/test-data".to_string(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-32-bytes!!".to_string(),
            access_minutes: 30,
            refresh_days: 7,
            issuer: "powercore-test".to_string(),
        },
        cors_origins: vec!["*".to_string()],
        log_level: "warn".to_string(),
        environment: "test".to_string(),
        request_timeout_ms: 30000,
    };

    ServerState::with_db(config, db)
}

fn registration(email: &str) -> UserCreate {
    UserCreate {
        email: email.to_string(),
        password: "hunter2hunter2".to_string(),
        full_name: "Тарас Шевченко".to_string(),
        is_admin: false,
    }
}

#[tokio::test]
async fn test_register_login_refresh() {
    let state = test_state().await;

    let registered = state
        .auth
        .register(registration("taras@example.com"))
        .await
        .expect("register");
    assert_eq!(registered.user.email, "taras@example.com");
    assert!(!registered.user.is_admin);
    assert_eq!(registered.token_type, "bearer");

    let logged_in = state
        .auth
        .login(LoginRequest {
            email: "taras@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        })
        .await
        .expect("login");

    let refreshed = state
        .auth
        .refresh(RefreshRequest {
            refresh_token: logged_in.refresh_token.clone(),
        })
        .await
        .expect("refresh");
    assert!(!refreshed.access_token.is_empty());

    // access token 不能当 refresh token 用
    let err = state
        .auth
        .refresh(RefreshRequest {
            refresh_token: logged_in.access_token.clone(),
        })
        .await
        .expect_err("access token must be rejected");
    assert!(matches!(err, AppError::InvalidToken(_)));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let state = test_state().await;

    state
        .auth
        .register(registration("dup@example.com"))
        .await
        .expect("first");

    let err = state
        .auth
        .register(registration("dup@example.com"))
        .await
        .expect_err("duplicate must fail");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_login_unified_error() {
    let state = test_state().await;
    state
        .auth
        .register(registration("real@example.com"))
        .await
        .expect("register");

    let wrong_password = state
        .auth
        .login(LoginRequest {
            email: "real@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .expect_err("wrong password");
    let unknown_email = state
        .auth
        .login(LoginRequest {
            email: "ghost@example.com".to_string(),
            password: "whatever-password".to_string(),
        })
        .await
        .expect_err("unknown email");

    // 两种失败必须无法区分
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_registration_cannot_grant_admin() {
    let state = test_state().await;

    let mut payload = registration("sneaky@example.com");
    payload.is_admin = true;

    let registered = state.auth.register(payload).await.expect("register");
    assert!(!registered.user.is_admin);
}
