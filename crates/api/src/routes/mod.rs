pub mod auth;
pub mod health;
pub mod module;
pub mod org_unit;
pub mod permission;
pub mod role;
pub mod topic;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                       login (public)
/// /auth/me                          current user (auth required)
///
/// /modules                          list, create
/// /modules/options|stats|reorder    dropdown, statistics, batch reorder
/// /modules/{id}                     get (with topics), update, delete
/// /modules/{id}/activate|deactivate
/// /modules/{id}/clone
///
/// /topics                           list (?moduleId=), create
/// /topics/stats|reorder
/// /topics/{id}                      get, update, delete
/// /topics/{id}/activate|deactivate|clone
///
/// /roles                            list, create
/// /roles/stats
/// /roles/{id}                       get (with permissions), update, delete
/// /roles/{id}/activate|deactivate
/// /roles/{id}/permissions           list, replace
///
/// /permissions                      list (?resource=), create
/// /permissions/resources
/// /permissions/{id}                 get, update, delete
/// /permissions/{id}/activate|deactivate
///
/// /org-units                        list (?parentId=), create
/// /org-units/tree|stats|reorder
/// /org-units/{id}                   get, update, delete
/// /org-units/{id}/children|activate|deactivate
///
/// /users                            list (?roleId=&orgUnitId=), create
/// /users/stats
/// /users/{id}                       get, update, delete
/// /users/{id}/activate|deactivate|reset-password
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/modules", module::router())
        .nest("/topics", topic::router())
        .nest("/roles", role::router())
        .nest("/permissions", permission::router())
        .nest("/org-units", org_unit::router())
        .nest("/users", user::router())
}
