//! HTTP tests for the organizational hierarchy.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, patch_auth, post_json_auth, put_json_auth};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_unit(
    pool: &PgPool,
    token: &str,
    parent: Option<i64>,
    name: &str,
    code: &str,
) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = json!({ "parentId": parent, "name": name, "code": code });
    let response = post_json_auth(app, "/api/v1/org-units", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn codes(nodes: &Value) -> Vec<&str> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["code"].as_str().unwrap())
        .collect()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tree_nests_units(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let hq = create_unit(&pool, &token, None, "Headquarters", "HQ").await;
    let patrol = create_unit(&pool, &token, Some(hq), "Patrol", "HQ-PTL").await;
    create_unit(&pool, &token, Some(patrol), "Night Shift", "HQ-PTL-N").await;
    create_unit(&pool, &token, None, "Academy", "ACAD").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/org-units/tree", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let roots = &json["data"];
    assert_eq!(roots.as_array().unwrap().len(), 2);
    let hq_node = roots
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["code"] == "HQ")
        .unwrap();
    assert_eq!(codes(&hq_node["children"]), vec!["HQ-PTL"]);
    assert_eq!(codes(&hq_node["children"][0]["children"]), vec!["HQ-PTL-N"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn active_tree_drops_inactive_units(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    create_unit(&pool, &token, None, "Open", "OPEN").await;
    let closed = create_unit(&pool, &token, None, "Closed", "CLOSED").await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/org-units/{closed}/deactivate");
    patch_auth(app, &uri, &token).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/org-units/tree?isActive=true", &token).await;
    let json = body_json(response).await;
    assert_eq!(codes(&json["data"]), vec!["OPEN"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn active_tree_hides_active_units_under_an_inactive_parent(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let agency = create_unit(&pool, &token, None, "Agency", "AGY").await;
    let division = create_unit(&pool, &token, Some(agency), "Division", "AGY-DIV").await;
    create_unit(&pool, &token, Some(division), "Squad", "AGY-DIV-SQD").await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/org-units/{division}/deactivate");
    patch_auth(app, &uri, &token).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/org-units/tree?isActive=true", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(codes(&json["data"]), vec!["AGY"]);
    assert!(json["data"][0]["children"].as_array().unwrap().is_empty());

    // The unfiltered tree still shows the whole branch.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/org-units/tree", &token).await;
    let json = body_json(response).await;
    let division_node = &json["data"][0]["children"][0];
    assert_eq!(codes(&division_node["children"]), vec!["AGY-DIV-SQD"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn children_and_parent_filter(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let hq = create_unit(&pool, &token, None, "Headquarters", "HQ").await;
    create_unit(&pool, &token, Some(hq), "Records", "HQ-REC").await;
    create_unit(&pool, &token, Some(hq), "Dispatch", "HQ-DSP").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/org-units/{hq}/children"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/org-units?parentId={hq}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 2);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/org-units/999999/children", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/org-units?parentId=hq", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn moving_under_descendant_is_rejected(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let top = create_unit(&pool, &token, None, "Top", "TOP").await;
    let mid = create_unit(&pool, &token, Some(top), "Middle", "MID").await;
    let leaf = create_unit(&pool, &token, Some(mid), "Leaf", "LEAF").await;

    for target in [top, leaf] {
        let app = common::build_test_app(pool.clone());
        let response = put_json_auth(
            app,
            &format!("/api/v1/org-units/{top}"),
            json!({ "parentId": target }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/org-units/{top}"), &token).await;
    assert!(body_json(response).await["data"]["parentId"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_code_and_sibling_name_conflict(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let hq = create_unit(&pool, &token, None, "Headquarters", "HQ").await;
    create_unit(&pool, &token, Some(hq), "Records", "HQ-REC").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "name": "Elsewhere", "code": "HQ-REC" });
    let response = post_json_auth(app, "/api/v1/org-units", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(
        json["message"],
        "An organizational unit with this code already exists"
    );

    let app = common::build_test_app(pool);
    let body = json!({ "parentId": hq, "name": "Records", "code": "HQ-REC2" });
    let response = post_json_auth(app, "/api/v1/org-units", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn lowercase_code_is_a_validation_error(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let body = json!({ "name": "Lower", "code": "lower" });
    let response = post_json_auth(app, "/api/v1/org-units", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().starts_with("code:"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_blocked_while_children_exist(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let hq = create_unit(&pool, &token, None, "Headquarters", "HQ").await;
    let child = create_unit(&pool, &token, Some(hq), "Records", "HQ-REC").await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/org-units/{hq}"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "DEPENDENCY_EXISTS");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/org-units/{child}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/org-units/{hq}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unit_stats_and_reorder(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let a = create_unit(&pool, &token, None, "Alpha", "A").await;
    let b = create_unit(&pool, &token, None, "Bravo", "B").await;
    create_unit(&pool, &token, Some(a), "Alpha One", "A-1").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "items": [
        { "id": a, "displayOrder": 2 },
        { "id": b, "displayOrder": 1 },
    ]});
    let response = put_json_auth(app, "/api/v1/org-units/reorder", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/org-units/tree", &token).await;
    assert_eq!(codes(&body_json(response).await["data"]), vec!["B", "A"]);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/org-units/stats", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["units"]["total"], 3);
    assert_eq!(json["data"]["rootUnits"], 2);
    assert_eq!(json["data"]["unitsWithChildren"], 1);
    assert_eq!(json["data"]["unitsWithUsers"], 0);
}
