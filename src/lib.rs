use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mappers;
pub mod models;
pub mod repository;
pub mod services;

// Routing segregation (public reads + login vs. authenticated mutations).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Core state types for the application entry point (main.rs) and tests.
pub use auth::AuthService;
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use services::{CategoryService, PostService, TagService};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application, aggregating every annotated path and schema. The resulting
/// JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_categories, handlers::get_category, handlers::create_category,
        handlers::delete_category, handlers::list_tags, handlers::create_tags,
        handlers::delete_tag, handlers::list_posts, handlers::login
    ),
    components(
        schemas(
            models::CategoryDto, models::TagDto, models::PostDto, models::PostStatus,
            models::CreateCategoryRequest, models::CreateTagsRequest,
            models::LoginRequest, models::LoginResponse,
        )
    ),
    tags(
        (name = "blog-api", description = "Blog content-management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across every request. The rule engines
/// are constructed explicitly from the repository abstraction; no hidden
/// container resolves anything.
#[derive(Clone)]
pub struct AppState {
    /// Category rule engine: uniqueness and deletion-guard enforcement.
    pub categories: CategoryService,
    /// Tag rule engine: idempotent batch creation, unguarded deletion.
    pub tags: TagService,
    /// Post listing engine over published posts.
    pub posts: PostService,
    /// Token issue/validate collaborator.
    pub auth: AuthService,
    /// Repository layer, still reachable directly for identity lookups.
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires every service from the two real inputs: a repository and the
    /// loaded configuration.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            categories: CategoryService::new(repo.clone()),
            tags: TagService::new(repo.clone()),
            posts: PostService::new(repo.clone()),
            auth: AuthService::new(&config),
            repo,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// These let extractors pull individual components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(app_state: &AppState) -> AuthService {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the mutating routes. `AuthUser` implements
/// `FromRequestParts`, so a failed extraction (missing header, bad token,
/// deleted user) rejects the request with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. API Assembly: anonymous reads + login, then mutations behind the
    //    authentication layer, all nested under the version prefix.
    let api = public::public_routes().merge(
        authenticated::authenticated_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
    );

    let base_router = Router::new()
        // Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // GET /health — unauthenticated liveness probe for monitoring.
        .route("/health", get(|| async { "ok" }))
        .nest("/api/v1", api)
        .with_state(state);

    // 3. Observability and correlation layers (outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span correlated by the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer, applied last.
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes `TraceLayer` span creation: includes the `x-request-id` header
/// (if present) alongside the HTTP method and URI, so every log line for a
/// request carries the same correlation id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
