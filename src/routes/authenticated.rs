use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any caller who passed the authentication
/// layer: course submission and mutation, plus the profile endpoint.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module, so each handler
/// receives a decoded identity. Mutation handlers then re-read the actor's
/// and the author's **current** records and run the authorization policy;
/// the token's role snapshot alone never authorizes a mutation.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/users/me
        // The caller's fresh profile plus the courses they own.
        .route("/api/users/me", get(handlers::get_me))
        // POST /api/courses
        // Submits a new course; author identity comes from the session and
        // the caller's contribution counter is incremented.
        .route("/api/courses", post(handlers::create_course))
        // PUT/DELETE /api/courses/{id}
        // Mutations gated by the ownership/role policy. Deletion decrements
        // the owning author's contribution counter.
        .route(
            "/api/courses/{id}",
            put(handlers::update_course).delete(handlers::delete_course),
        )
}
