use crate::{
    AppState,
    auth::{AuthService, AuthUser},
    error::{ApiError, ApiResult},
    mappers,
    models::{
        CategoryDto, CreateCategoryRequest, CreateTagsRequest, LoginRequest, LoginResponse,
        PostDto, TagDto,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// PostFilter
///
/// Accepted query parameters for the post listing endpoint
/// (GET /api/v1/posts). Both filters are optional and combinable.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    /// Restrict the listing to posts in this category.
    pub category_id: Option<Uuid>,
    /// Restrict the listing to posts carrying this tag.
    pub tag_id: Option<Uuid>,
}

// --- Category Handlers ---

/// [Public Route] Lists all categories with their derived published-post counts.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses((status = 200, description = "All categories", body = [CategoryDto]))
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryDto>>> {
    let categories = state.categories.list_categories().await?;
    Ok(Json(categories.iter().map(mappers::category_to_dto).collect()))
}

/// [Public Route] Retrieves a single category by id.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Found", body = CategoryDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CategoryDto>> {
    let category = state.categories.get_category(id).await?;
    Ok(Json(mappers::category_to_dto(&category)))
}

/// [Authenticated Route] Creates a category. Name uniqueness is enforced
/// case-insensitively by the rule engine; a duplicate yields 409.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = CategoryDto),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn create_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryDto>)> {
    let category = state
        .categories
        .create_category(mappers::category_from_request(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(mappers::category_to_dto(&category))))
}

/// [Authenticated Route] Deletes a category. 404 when absent, 409 while any
/// post still references it.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Category has posts")
    )
)]
pub async fn delete_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.categories.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Tag Handlers ---

/// [Public Route] Lists all tags with their derived published-post counts.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    responses((status = 200, description = "All tags", body = [TagDto]))
)]
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<TagDto>>> {
    let tags = state.tags.list_tags().await?;
    Ok(Json(tags.iter().map(mappers::tag_to_dto).collect()))
}

/// [Authenticated Route] Batch tag creation. Names are deduplicated
/// case-insensitively and resolved against existing tags, so repeated
/// identical calls are idempotent.
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    request_body = CreateTagsRequest,
    responses((status = 201, description = "Created or resolved tags", body = [TagDto]))
)]
pub async fn create_tags(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTagsRequest>,
) -> ApiResult<(StatusCode, Json<Vec<TagDto>>)> {
    let tags = state.tags.create_tags(payload.names).await?;
    Ok((
        StatusCode::CREATED,
        Json(tags.iter().map(mappers::tag_to_dto).collect()),
    ))
}

/// [Authenticated Route] Deletes a tag. Unlike categories, tag deletion is not
/// guarded by post associations; the join rows are dropped with it.
#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_tag(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.tags.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Post Handlers ---

/// [Public Route] Lists published posts, newest first, optionally filtered by
/// category and/or tag. Unknown filter ids yield 404.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PostFilter),
    responses(
        (status = 200, description = "Published posts", body = [PostDto]),
        (status = 404, description = "Unknown category or tag filter")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> ApiResult<Json<Vec<PostDto>>> {
    let posts = state
        .posts
        .list_published_posts(filter.category_id, filter.tag_id)
        .await?;
    Ok(Json(posts.iter().map(mappers::post_to_dto).collect()))
}

// --- Auth Handlers ---

/// [Public Route] Exchanges credentials for a signed bearer token.
///
/// The failure mode is deliberately uniform: an unknown email and a wrong
/// password both return 401 without distinguishing which check failed.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !AuthService::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = state.auth.issue_token(user.id)?;
    Ok(Json(LoginResponse {
        token,
        expires_in: state.auth.token_ttl_secs(),
    }))
}
