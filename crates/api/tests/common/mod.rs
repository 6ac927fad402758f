#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use cadre_api::auth::jwt::{generate_access_token, JwtConfig};
use cadre_api::auth::password::hash_password;
use cadre_api::config::ServerConfig;
use cadre_api::router::build_app_router;
use cadre_api::state::AppState;
use cadre_db::models::user::{CreateUser, User};
use cadre_db::repositories::{RoleRepo, UserRepo};

/// Password given to every user created by [`seed_user`].
pub const TEST_PASSWORD: &str = "roll-call-at-0600";

/// A `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        log_json: false,
        jwt: JwtConfig {
            secret: "integration-test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
        },
        bootstrap_admin: None,
    }
}

/// The production router on top of `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };
    build_app_router(state)
}

/// Insert a user holding the seeded role `role_name`.
pub async fn seed_user(pool: &PgPool, username: &str, role_name: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role_name)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("role {role_name} should be seeded"));
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@academy.test"),
        full_name: format!("Officer {username}"),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        role_id: role.id,
        org_unit_id: None,
    };
    UserRepo::create(pool, &input, None).await.unwrap()
}

pub fn token_for(user: &User, role_name: &str) -> String {
    generate_access_token(user.id, role_name, &test_config().jwt).unwrap()
}

/// Seed a user with `role_name` and return a Bearer token for them.
pub async fn token_with_role(pool: &PgPool, username: &str, role_name: &str) -> String {
    let user = seed_user(pool, username, role_name).await;
    token_for(&user, role_name)
}

pub async fn admin_token(pool: &PgPool) -> String {
    token_with_role(pool, "chief", "admin").await
}

pub async fn manager_token(pool: &PgPool) -> String {
    token_with_role(pool, "sergeant", "manager").await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Send a raw string body, for malformed-JSON cases.
pub async fn post_raw_auth(app: Router, uri: &str, body: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
