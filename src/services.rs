use crate::{
    error::{ApiError, ApiResult},
    models::{Category, NewCategory, Post, Tag},
    repository::RepositoryState,
};
use std::collections::HashSet;
use uuid::Uuid;

/// CategoryService
///
/// The rule engine for the category lifecycle. It takes its repository
/// abstraction as an explicit constructor argument; the in-service checks are
/// optimistic pre-validation, with the storage constraints (unique index on
/// `lower(name)`, RESTRICT foreign key from posts) as the source of truth under
/// concurrent duplicates.
#[derive(Clone)]
pub struct CategoryService {
    repo: RepositoryState,
}

impl CategoryService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// All categories with post associations loaded for count derivation.
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.repo.list_categories().await?)
    }

    /// Persists a new category unless one with the same name already exists
    /// under case-insensitive comparison.
    pub async fn create_category(&self, new: NewCategory) -> ApiResult<Category> {
        if self.repo.category_exists_by_name(&new.name).await? {
            return Err(ApiError::AlreadyExists(format!(
                "category already exists with name '{}'",
                new.name
            )));
        }
        Ok(self.repo.create_category(new).await?)
    }

    /// Fetch-or-fail lookup.
    pub async fn get_category(&self, id: Uuid) -> ApiResult<Category> {
        self.repo
            .get_category(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("category '{}' not found", id)))
    }

    /// Deletes a category. Fails NotFound when the id matches nothing (a
    /// deliberate departure from the silent no-op this replaces) and
    /// InvalidState while any post, in any status, still references it.
    pub async fn delete_category(&self, id: Uuid) -> ApiResult<()> {
        let category = self.get_category(id).await?;
        if !category.posts.is_empty() {
            return Err(ApiError::InvalidState(
                "category has posts associated with it".to_string(),
            ));
        }
        self.repo.delete_category(id).await?;
        Ok(())
    }
}

/// TagService
///
/// The rule engine for the tag lifecycle. Tag deletion is intentionally
/// unguarded by post associations; the join rows are removed by the storage
/// layer's ON DELETE CASCADE.
#[derive(Clone)]
pub struct TagService {
    repo: RepositoryState,
}

impl TagService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// All tags with post associations loaded for count derivation.
    pub async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        Ok(self.repo.list_tags().await?)
    }

    /// Idempotent-by-name batch creation.
    ///
    /// Each candidate name is trimmed; blanks are dropped, case-insensitive
    /// repeats within the batch are collapsed, and a name matching an existing
    /// tag (case-insensitively) resolves to that tag instead of creating a new
    /// row. The result preserves input order, so repeated identical calls
    /// return the same tags.
    pub async fn create_tags(&self, names: Vec<String>) -> ApiResult<Vec<Tag>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut tags = Vec::new();

        for name in names {
            let name = name.trim();
            if name.is_empty() || !seen.insert(name.to_lowercase()) {
                continue;
            }
            let tag = match self.repo.find_tag_by_name(name).await? {
                Some(existing) => existing,
                None => self.repo.create_tag(name).await?,
            };
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Deletes a tag regardless of post associations; NotFound when absent.
    pub async fn delete_tag(&self, id: Uuid) -> ApiResult<()> {
        if !self.repo.delete_tag(id).await? {
            return Err(ApiError::NotFound(format!("tag '{}' not found", id)));
        }
        Ok(())
    }
}

/// PostService
///
/// Thin listing engine over published posts. Filter ids are validated against
/// their own rule engines' existence semantics before the listing query runs.
#[derive(Clone)]
pub struct PostService {
    repo: RepositoryState,
}

impl PostService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// PUBLISHED posts, newest first, optionally narrowed by category and/or
    /// tag. An unknown filter id fails NotFound rather than returning an
    /// empty list.
    pub async fn list_published_posts(
        &self,
        category_id: Option<Uuid>,
        tag_id: Option<Uuid>,
    ) -> ApiResult<Vec<Post>> {
        if let Some(id) = category_id {
            self.repo
                .get_category(id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("category '{}' not found", id)))?;
        }
        if let Some(id) = tag_id {
            self.repo
                .get_tag(id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("tag '{}' not found", id)))?;
        }
        Ok(self.repo.list_published_posts(category_id, tag_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostStatus, User};
    use crate::repository::Repository;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    // Canned-response repository, the control point for rule-engine tests.
    #[derive(Default)]
    struct MockRepo {
        categories: Vec<Category>,
        tags: Vec<Tag>,
        name_exists: bool,
        delete_result: bool,
        delete_called: AtomicBool,
    }

    #[async_trait]
    impl Repository for MockRepo {
        async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
            Ok(self.categories.clone())
        }
        async fn category_exists_by_name(&self, _name: &str) -> Result<bool, sqlx::Error> {
            Ok(self.name_exists)
        }
        async fn create_category(&self, new: NewCategory) -> Result<Category, sqlx::Error> {
            Ok(Category {
                id: Uuid::new_v4(),
                name: new.name,
                description: new.description,
                posts: vec![],
            })
        }
        async fn get_category(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
            Ok(self.categories.iter().find(|c| c.id == id).cloned())
        }
        async fn delete_category(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
            self.delete_called.store(true, Ordering::SeqCst);
            Ok(self.delete_result)
        }
        async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error> {
            Ok(self.tags.clone())
        }
        async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, sqlx::Error> {
            Ok(self
                .tags
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
                .cloned())
        }
        async fn create_tag(&self, name: &str) -> Result<Tag, sqlx::Error> {
            Ok(Tag {
                id: Uuid::new_v4(),
                name: name.to_string(),
                posts: vec![],
            })
        }
        async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>, sqlx::Error> {
            Ok(self.tags.iter().find(|t| t.id == id).cloned())
        }
        async fn delete_tag(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
            self.delete_called.store(true, Ordering::SeqCst);
            Ok(self.delete_result)
        }
        async fn list_published_posts(
            &self,
            _category_id: Option<Uuid>,
            _tag_id: Option<Uuid>,
        ) -> Result<Vec<Post>, sqlx::Error> {
            Ok(vec![])
        }
        async fn get_user(&self, _id: Uuid) -> Result<Option<User>, sqlx::Error> {
            Ok(None)
        }
        async fn get_user_by_email(&self, _email: &str) -> Result<Option<User>, sqlx::Error> {
            Ok(None)
        }
    }

    fn post(status: PostStatus) -> Post {
        Post {
            id: Uuid::new_v4(),
            status,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_category_rejects_duplicate_name() {
        let repo = Arc::new(MockRepo {
            name_exists: true,
            ..Default::default()
        });
        let service = CategoryService::new(repo);
        let result = service
            .create_category(NewCategory {
                name: "Tech".into(),
                description: None,
            })
            .await;
        assert!(matches!(result, Err(ApiError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn delete_category_blocked_while_posts_reference_it() {
        let id = Uuid::new_v4();
        let repo = Arc::new(MockRepo {
            categories: vec![Category {
                id,
                name: "Tech".into(),
                description: None,
                // A draft still references the category; the guard is not
                // limited to published posts.
                posts: vec![post(PostStatus::Draft)],
            }],
            delete_result: true,
            ..Default::default()
        });
        let service = CategoryService::new(repo.clone());

        let result = service.delete_category(id).await;
        assert!(matches!(result, Err(ApiError::InvalidState(_))));
        assert!(!repo.delete_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn delete_category_succeeds_when_unreferenced() {
        let id = Uuid::new_v4();
        let repo = Arc::new(MockRepo {
            categories: vec![Category {
                id,
                name: "Tech".into(),
                description: None,
                posts: vec![],
            }],
            delete_result: true,
            ..Default::default()
        });
        let service = CategoryService::new(repo.clone());

        service.delete_category(id).await.unwrap();
        assert!(repo.delete_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn delete_absent_category_is_not_found() {
        let repo = Arc::new(MockRepo::default());
        let service = CategoryService::new(repo);
        let result = service.delete_category(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_tags_collapses_case_insensitive_repeats() {
        let repo = Arc::new(MockRepo::default());
        let service = TagService::new(repo);

        let tags = service
            .create_tags(vec![
                "go".into(),
                "Go".into(),
                "rust".into(),
                "  ".into(),
                "go".into(),
            ])
            .await
            .unwrap();

        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["go", "rust"]);
    }

    #[tokio::test]
    async fn create_tags_reuses_existing_tags_by_name() {
        let existing = Tag {
            id: Uuid::new_v4(),
            name: "Rust".into(),
            posts: vec![],
        };
        let repo = Arc::new(MockRepo {
            tags: vec![existing.clone()],
            ..Default::default()
        });
        let service = TagService::new(repo);

        let tags = service
            .create_tags(vec!["rust".into(), "go".into()])
            .await
            .unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].id, existing.id);
        assert_eq!(tags[0].name, "Rust");
    }

    #[tokio::test]
    async fn delete_absent_tag_is_not_found() {
        let repo = Arc::new(MockRepo::default());
        let service = TagService::new(repo);
        let result = service.delete_tag(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn post_listing_rejects_unknown_filter_ids() {
        let repo = Arc::new(MockRepo::default());
        let service = PostService::new(repo);

        let by_category = service
            .list_published_posts(Some(Uuid::new_v4()), None)
            .await;
        assert!(matches!(by_category, Err(ApiError::NotFound(_))));

        let by_tag = service.list_published_posts(None, Some(Uuid::new_v4())).await;
        assert!(matches!(by_tag, Err(ApiError::NotFound(_))));
    }
}
