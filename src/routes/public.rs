use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. Absence of an Authorization header
/// leaves the request anonymous; these handlers never consult the identity.
/// Everything here is nested under `/api/v1` by `create_router`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /auth/login
        // Credential exchange: verifies the password hash and issues a JWT.
        .route("/auth/login", post(handlers::login))
        // GET /categories
        // Lists all categories, each with its derived published-post count.
        .route("/categories", get(handlers::list_categories))
        // GET /categories/{id}
        // Single-category lookup; 404 when absent.
        .route("/categories/{id}", get(handlers::get_category))
        // GET /tags
        // Lists all tags with derived published-post counts.
        .route("/tags", get(handlers::list_tags))
        // GET /posts?categoryId=...&tagId=...
        // Published posts only, optionally narrowed by category and/or tag.
        .route("/posts", get(handlers::list_posts))
}
