use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Persisted Entities (Mapped to Database) ---

/// PostStatus
///
/// Editorial state of a post. Only PUBLISHED posts contribute to the derived
/// `postCount` on category and tag representations; DRAFT posts still block
/// category deletion because the foreign key reference exists either way.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "post_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

/// Category
///
/// A category record from the `categories` table. `posts` is not a column; the
/// repository loads the reverse association separately so the mapper can derive
/// the published-post count. A category never owns its posts.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Category {
    pub id: Uuid,
    /// Unique under case-insensitive comparison (enforced optimistically in the
    /// rule engine, with a `lower(name)` unique index as the backstop).
    pub name: String,
    pub description: Option<String>,
    #[sqlx(skip)]
    pub posts: Vec<Post>,
}

/// Tag
///
/// A tag record from the `tags` table, with its many-to-many post association
/// loaded into `posts` for count derivation.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    #[sqlx(skip)]
    pub posts: Vec<Post>,
}

/// Post
///
/// A post record from the `posts` table. The post lifecycle (authoring,
/// publishing) is outside this service; posts matter here as the external
/// driver of category/tag counts and deletion guards.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    // FK to categories.id; a post references zero-or-one category.
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User
///
/// Canonical identity record from the `users` table, resolved during
/// authentication. Never serialized to the API (it carries the password hash).
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// NewCategory
///
/// The user-supplied slice of a category, produced by the request mapper.
/// Carries no identifier, associations, or counts; those are server-assigned
/// or derived.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

// --- Transfer Representations (API Surface) ---

/// CategoryDto
///
/// External-facing shape of a category. `post_count` is derived at mapping
/// time from the loaded post associations, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub post_count: i64,
}

/// TagDto
///
/// External-facing shape of a tag; `post_count` counts PUBLISHED posts only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TagDto {
    pub id: Uuid,
    pub name: String,
    pub post_count: i64,
}

/// PostDto
///
/// External-facing shape of a post in listing responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateCategoryRequest
///
/// Input payload for POST /api/v1/categories.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// CreateTagsRequest
///
/// Input payload for POST /api/v1/tags: a batch of candidate tag names.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateTagsRequest {
    pub names: Vec<String>,
}

/// LoginRequest
///
/// Input payload for POST /api/v1/auth/login. The password is verified against
/// the stored argon2 hash and never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// Output schema of a successful login: a signed bearer token and its lifetime
/// in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}
