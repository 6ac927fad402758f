//! HTTP tests for roles, permissions and user accounts.

mod common;

use axum::http::StatusCode;
use cadre_core::roles::ROLE_TRAINEE;
use common::{
    body_json, delete_auth, get_auth, patch_auth, post_json, post_json_auth, put_json_auth,
    seed_user, token_for,
};
use serde_json::json;
use sqlx::PgPool;

async fn role_id(pool: &PgPool, name: &str) -> i64 {
    cadre_db::repositories::RoleRepo::find_by_name(pool, name)
        .await
        .unwrap()
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Roles and permissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn seeded_roles_are_listed_with_counts(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/roles?sortBy=name", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["pagination"]["total"], 3);
    let admin = &json["data"][0];
    assert_eq!(admin["name"], "admin");
    assert_eq!(admin["permissionCount"], 10);
    assert_eq!(admin["userCount"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_role_with_permissions_then_replace(pool: PgPool) {
    let token = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/permissions?resource=modules", &token).await;
    let json = body_json(response).await;
    let module_perms: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert!(!module_perms.is_empty());

    let app = common::build_test_app(pool.clone());
    let body = json!({ "name": "curriculum-editor", "permissionIds": module_perms });
    let response = post_json_auth(app, "/api/v1/roles", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(
        json["data"]["permissions"].as_array().unwrap().len(),
        module_perms.len()
    );

    let app = common::build_test_app(pool.clone());
    let body = json!({ "permissionIds": [module_perms[0], module_perms[0]] });
    let uri = format!("/api/v1/roles/{id}/permissions");
    let response = put_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/roles/{id}/permissions"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], module_perms[0]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_permission_ids_leave_role_unchanged(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let manager = role_id(&pool, "manager").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "permissionIds": [987654] });
    let uri = format!("/api/v1/roles/{manager}/permissions");
    let response = put_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/roles/{manager}/permissions"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn permissions_of_missing_role_is_404(pool: PgPool) {
    let token = common::manager_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/roles/999999/permissions", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn role_in_use_cannot_be_deleted(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let admin_role = role_id(&pool, "admin").await;

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/roles/{admin_role}"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "DEPENDENCY_EXISTS");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_role_name_conflicts(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/roles", json!({ "name": "manager" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["message"], "A role with this name already exists");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn permission_crud_and_resources(pool: PgPool) {
    let token = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "name": "reports.export", "resource": "reports" });
    let response = post_json_auth(app, "/api/v1/permissions", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/permissions/resources", &token).await;
    let json = body_json(response).await;
    let resources: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap())
        .collect();
    assert!(resources.contains(&"reports"));
    let mut sorted = resources.clone();
    sorted.sort_unstable();
    assert_eq!(resources, sorted);

    let app = common::build_test_app(pool.clone());
    let response = patch_auth(app, &format!("/api/v1/permissions/{id}/deactivate"), &token).await;
    assert_eq!(body_json(response).await["data"]["isActive"], false);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/permissions/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/permissions/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_user_hides_password_hash(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let trainee = role_id(&pool, ROLE_TRAINEE).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "username": "recruit",
        "email": "recruit@academy.test",
        "fullName": "Recruit One",
        "password": "first-day-on-the-range",
        "roleId": trainee,
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], ROLE_TRAINEE);
    assert!(json["data"].get("passwordHash").is_none());
    assert!(json["data"].get("password").is_none());

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users?search=recruit", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert!(json["data"][0].get("passwordHash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn weak_password_is_rejected(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let trainee = role_id(&pool, ROLE_TRAINEE).await;

    let app = common::build_test_app(pool);
    let body = json!({
        "username": "recruit",
        "email": "recruit@academy.test",
        "fullName": "Recruit One",
        "password": "short",
        "roleId": trainee,
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_email_is_rejected(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let trainee = role_id(&pool, ROLE_TRAINEE).await;

    let app = common::build_test_app(pool);
    let body = json!({
        "username": "recruit",
        "email": "not-an-email",
        "fullName": "Recruit One",
        "password": "first-day-on-the-range",
        "roleId": trainee,
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().starts_with("email:"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_role_is_invalid_reference(pool: PgPool) {
    let token = common::admin_token(&pool).await;

    let app = common::build_test_app(pool);
    let body = json!({
        "username": "recruit",
        "email": "recruit@academy.test",
        "fullName": "Recruit One",
        "password": "first-day-on-the-range",
        "roleId": 987654,
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_REFERENCE");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_username_conflicts(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    seed_user(&pool, "taken", ROLE_TRAINEE).await;
    let trainee = role_id(&pool, ROLE_TRAINEE).await;

    let app = common::build_test_app(pool);
    let body = json!({
        "username": "taken",
        "email": "other@academy.test",
        "fullName": "Someone Else",
        "password": "first-day-on-the-range",
        "roleId": trainee,
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["message"], "A user with this username already exists");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reset_password_allows_new_login(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let user = seed_user(&pool, "forgetful", ROLE_TRAINEE).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/users/{}/reset-password", user.id),
        json!({ "newPassword": "brand-new-secret-42" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "forgetful", "password": common::TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "forgetful", "password": "brand-new-secret-42" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_cannot_delete_or_deactivate_self(pool: PgPool) {
    let admin = seed_user(&pool, "chief", "admin").await;
    let token = token_for(&admin, "admin");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/users/{}", admin.id), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "You cannot delete your own account");

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/users/{}/deactivate", admin.id);
    let response = patch_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn users_filter_by_role_and_unit(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let trainee = role_id(&pool, ROLE_TRAINEE).await;
    seed_user(&pool, "cadet-a", ROLE_TRAINEE).await;
    seed_user(&pool, "cadet-b", ROLE_TRAINEE).await;
    let moved = seed_user(&pool, "cadet-c", ROLE_TRAINEE).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "name": "Platoon 1", "code": "PLT-1" });
    let response = post_json_auth(app, "/api/v1/org-units", body, &token).await;
    let unit = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/users/{}", moved.id),
        json!({ "orgUnitId": unit }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["orgUnitId"], unit);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/users?roleId={trainee}"), &token).await;
    assert_eq!(body_json(response).await["pagination"]["total"], 3);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/users?orgUnitId={unit}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["username"], "cadet-c");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/stats", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["users"]["total"], 4);
    assert_eq!(json["data"]["usersWithoutUnit"], 3);
}
