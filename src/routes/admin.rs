use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// The user-management panel, exclusively for accounts whose **current**
/// persisted role is 'admin'.
///
/// Access Control:
/// This router sits behind the authentication layer, and every handler
/// re-reads the caller's role from the store before proceeding. A token
/// minted while the caller was an admin stops working here the moment the
/// persisted role changes.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/users
        // Lists every registered user (credential hashes excluded), newest first.
        .route("/users", get(handlers::list_users))
        // PUT /api/admin/users/{id}/role
        // Assigns 'user' or 'moderator'. Never promotes to admin, and never
        // touches an existing admin account.
        .route("/users/{id}/role", put(handlers::update_user_role))
}
