//! Login, current-user and role enforcement over HTTP.

mod common;

use axum::http::StatusCode;
use cadre_api::bootstrap::ensure_admin;
use cadre_api::config::BootstrapAdmin;
use cadre_core::roles::ROLE_TRAINEE;
use cadre_db::repositories::UserRepo;
use common::{
    body_json, get, get_auth, post_json, post_json_auth, seed_user, token_for, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

async fn login(pool: &PgPool, username: &str, password: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_and_user(pool: PgPool) {
    let user = seed_user(&pool, "instructor", "manager").await;

    let response = login(&pool, "instructor", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["status"], "SUCCESS");
    assert!(json["data"]["accessToken"].is_string());
    assert_eq!(json["data"]["tokenType"], "Bearer");
    assert_eq!(json["data"]["expiresIn"], 15 * 60);
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["role"], "manager");
    assert!(json["data"]["user"]["lastLoginAt"].is_string());
    assert!(json["data"]["user"].get("passwordHash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_rejects_bad_credentials(pool: PgPool) {
    seed_user(&pool, "instructor", "manager").await;

    let response = login(&pool, "instructor", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ERROR");
    assert_eq!(json["message"], "Invalid username or password");

    let response = login(&pool, "nobody", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_rejects_deactivated_account(pool: PgPool) {
    let user = seed_user(&pool, "retired", ROLE_TRAINEE).await;
    UserRepo::set_active(&pool, user.id, false, user.id)
        .await
        .unwrap();

    let response = login(&pool, "retired", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_empty_fields_is_a_validation_error(pool: PgPool) {
    let response = login(&pool, "", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_the_caller(pool: PgPool) {
    let user = seed_user(&pool, "cadet", ROLE_TRAINEE).await;
    let token = token_for(&user, ROLE_TRAINEE);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "cadet");
    assert_eq!(json["data"]["role"], ROLE_TRAINEE);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_or_invalid_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/modules").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/modules", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn trainee_cannot_read_admin_catalogs(pool: PgPool) {
    let token = common::token_with_role(&pool, "cadet", ROLE_TRAINEE).await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/modules", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn manager_reads_but_cannot_write(pool: PgPool) {
    let token = common::manager_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/modules", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let body = json!({ "name": "Ethics" });
    let response = post_json_auth(app, "/api/v1/modules", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bootstrap_creates_admin_once(pool: PgPool) {
    let admin = BootstrapAdmin {
        username: "root".to_string(),
        password: "first-start-password".to_string(),
        email: "root@localhost".to_string(),
    };

    assert!(ensure_admin(&pool, &admin).await.unwrap());
    assert!(!ensure_admin(&pool, &admin).await.unwrap());
    assert_eq!(UserRepo::count_with_role(&pool, "admin").await.unwrap(), 1);

    let response = login(&pool, "root", "first-start-password").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bootstrap_rejects_weak_password(pool: PgPool) {
    let admin = BootstrapAdmin {
        username: "root".to_string(),
        password: "short".to_string(),
        email: "root@localhost".to_string(),
    };
    assert!(ensure_admin(&pool, &admin).await.is_err());
    assert_eq!(UserRepo::count_with_role(&pool, "admin").await.unwrap(), 0);
}
