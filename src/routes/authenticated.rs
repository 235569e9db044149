use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post},
};

/// Authenticated Router Module
///
/// All mutating endpoints. The `auth_middleware` layer applied in
/// `create_router` rejects requests without a valid bearer token before any
/// handler here runs; each handler additionally takes the `AuthUser` extractor
/// so the resolved identity is an explicit argument.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /categories
        // Creates a category; 409 when the name already exists
        // (case-insensitive comparison).
        .route("/categories", post(handlers::create_category))
        // DELETE /categories/{id}
        // Removes a category; blocked with 409 while posts reference it.
        .route("/categories/{id}", delete(handlers::delete_category))
        // POST /tags
        // Batch tag creation with idempotent, case-insensitive dedup.
        .route("/tags", post(handlers::create_tags))
        // DELETE /tags/{id}
        // Removes a tag unconditionally with respect to posts.
        .route("/tags/{id}", delete(handlers::delete_tag))
}
