use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the identity gateway (register/login), read-only
/// course browsing, and the public leaderboard.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Human-friendly banner confirming the API is up.
        .route("/", get(|| async { "Course Hub API is running" }))
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/register
        // New account creation. Mints the first identity token on success.
        .route("/api/auth/register", post(handlers::register))
        // POST /api/auth/login
        // Resolves an identity by email-or-username and mints a token.
        // Failures are deliberately indistinguishable (no user enumeration).
        .route("/api/auth/login", post(handlers::login))
        // GET /api/courses?page=...&limit=...
        // Paginated listing of every course, newest first.
        .route("/api/courses", get(handlers::list_courses))
        // GET /api/courses/{id}
        // Detailed view of a single course.
        .route("/api/courses/{id}", get(handlers::get_course))
        // GET /api/users/top-contributors
        // Top 5 users ranked by contribution counter (zero counters excluded).
        .route(
            "/api/users/top-contributors",
            get(handlers::top_contributors),
        )
}
