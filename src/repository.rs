use crate::models::{Category, NewCategory, Post, Tag, User};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, query_builder::QueryBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Rule engines depend on
/// this trait, never on a concrete storage technology, which also lets the test
/// suite substitute an in-memory implementation.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Categories ---
    /// All categories, name-ascending, with their post associations loaded so
    /// the mapper can derive published-post counts.
    async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error>;
    /// Case-insensitive existence check used as optimistic pre-validation; the
    /// unique index on `lower(name)` is the storage-layer backstop.
    async fn category_exists_by_name(&self, name: &str) -> Result<bool, sqlx::Error>;
    async fn create_category(&self, new: NewCategory) -> Result<Category, sqlx::Error>;
    /// Single category with post associations loaded; None when absent.
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error>;
    /// Returns true if a row was deleted, false if the id matched nothing.
    async fn delete_category(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Tags ---
    /// All tags with their (many-to-many) post associations loaded.
    async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error>;
    /// Case-insensitive lookup by name, for idempotent batch creation.
    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, sqlx::Error>;
    async fn create_tag(&self, name: &str) -> Result<Tag, sqlx::Error>;
    async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>, sqlx::Error>;
    /// Unconditional delete; join rows go with it via ON DELETE CASCADE.
    async fn delete_tag(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Posts ---
    /// PUBLISHED posts, newest first, optionally narrowed to one category
    /// and/or one tag.
    async fn list_published_posts(
        &self,
        category_id: Option<Uuid>,
        tag_id: Option<Uuid>,
    ) -> Result<Vec<Post>, sqlx::Error>;

    // --- Users / Auth ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads every category-referencing post and groups it by category id, so a
    /// listing query attaches associations with two round trips instead of N+1.
    async fn posts_by_category(&self) -> Result<HashMap<Uuid, Vec<Post>>, sqlx::Error> {
        let posts = sqlx::query_as::<_, Post>(
            r#"SELECT id, title, content, status, category_id, created_at, updated_at
               FROM posts WHERE category_id IS NOT NULL"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Post>> = HashMap::new();
        for post in posts {
            if let Some(category_id) = post.category_id {
                grouped.entry(category_id).or_default().push(post);
            }
        }
        Ok(grouped)
    }
}

/// Row shape for the post_tags join: a tag id glued onto a full post row.
#[derive(FromRow)]
struct TagPostRow {
    tag_id: Uuid,
    #[sqlx(flatten)]
    post: Post,
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        let mut categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped = self.posts_by_category().await?;
        for category in &mut categories {
            category.posts = grouped.remove(&category.id).unwrap_or_default();
        }
        Ok(categories)
    }

    async fn category_exists_by_name(&self, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE lower(name) = lower($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)
               RETURNING id, name, description"#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.description)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match category {
            Some(mut category) => {
                category.posts = sqlx::query_as::<_, Post>(
                    r#"SELECT id, title, content, status, category_id, created_at, updated_at
                       FROM posts WHERE category_id = $1"#,
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
                Ok(Some(category))
            }
            None => Ok(None),
        }
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error> {
        let mut tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, TagPostRow>(
            r#"SELECT pt.tag_id, p.id, p.title, p.content, p.status, p.category_id,
                      p.created_at, p.updated_at
               FROM post_tags pt JOIN posts p ON p.id = pt.post_id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Post>> = HashMap::new();
        for row in rows {
            grouped.entry(row.tag_id).or_default().push(row.post);
        }
        for tag in &mut tags {
            tag.posts = grouped.remove(&tag.id).unwrap_or_default();
        }
        Ok(tags)
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE lower(name) = lower($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_tag(&self, name: &str) -> Result<Tag, sqlx::Error> {
        sqlx::query_as::<_, Tag>("INSERT INTO tags (id, name) VALUES ($1, $2) RETURNING id, name")
            .bind(Uuid::new_v4())
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_tag(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flexible filtered listing built with QueryBuilder for safe
    /// parameterization. The PUBLISHED restriction is part of the base query
    /// and is never conditional.
    async fn list_published_posts(
        &self,
        category_id: Option<Uuid>,
        tag_id: Option<Uuid>,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT p.id, p.title, p.content, p.status, p.category_id, p.created_at, p.updated_at
            FROM posts p
            WHERE p.status = 'PUBLISHED'
            "#,
        );

        if let Some(category_id) = category_id {
            builder.push(" AND p.category_id = ");
            builder.push_bind(category_id);
        }

        if let Some(tag_id) = tag_id {
            builder.push(" AND p.id IN (SELECT post_id FROM post_tags WHERE tag_id = ");
            builder.push_bind(tag_id);
            builder.push(")");
        }

        builder.push(" ORDER BY p.created_at DESC");

        builder.build_query_as::<Post>().fetch_all(&self.pool).await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, name, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }
}
