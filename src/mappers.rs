//! Explicit, hand-written transfer mapping.
//!
//! Every function here is pure and side-effect free: entities go out as DTOs
//! with the derived `postCount` computed on the way, and creation requests
//! come in as bare new-entity values with nothing server-assigned populated.

use crate::models::{
    Category, CategoryDto, CreateCategoryRequest, NewCategory, Post, PostDto, PostStatus, Tag,
    TagDto,
};

/// Counts the posts in a loaded association whose status is PUBLISHED.
/// An empty (unloaded) association is simply a count of zero.
pub fn published_post_count(posts: &[Post]) -> i64 {
    posts
        .iter()
        .filter(|post| post.status == PostStatus::Published)
        .count() as i64
}

/// Category entity → transfer representation.
pub fn category_to_dto(category: &Category) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name: category.name.clone(),
        description: category.description.clone(),
        post_count: published_post_count(&category.posts),
    }
}

/// Creation request → new-entity value. Copies only the user-supplied scalar
/// fields; identifier, associations, and counts are never populated here.
pub fn category_from_request(request: CreateCategoryRequest) -> NewCategory {
    NewCategory {
        name: request.name,
        description: request.description,
    }
}

/// Tag entity → transfer representation.
pub fn tag_to_dto(tag: &Tag) -> TagDto {
    TagDto {
        id: tag.id,
        name: tag.name.clone(),
        post_count: published_post_count(&tag.posts),
    }
}

/// Post entity → transfer representation.
pub fn post_to_dto(post: &Post) -> PostDto {
    PostDto {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        status: post.status,
        category_id: post.category_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn post_with_status(status: PostStatus) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            status,
            ..Default::default()
        }
    }

    #[test]
    fn published_count_excludes_drafts() {
        let posts = vec![
            post_with_status(PostStatus::Published),
            post_with_status(PostStatus::Draft),
            post_with_status(PostStatus::Published),
        ];
        assert_eq!(published_post_count(&posts), 2);
    }

    #[test]
    fn empty_association_counts_zero() {
        assert_eq!(published_post_count(&[]), 0);

        let category = Category {
            id: Uuid::new_v4(),
            name: "Empty".into(),
            description: None,
            posts: vec![],
        };
        assert_eq!(category_to_dto(&category).post_count, 0);
    }

    #[test]
    fn category_dto_carries_scalars_and_derived_count() {
        let category = Category {
            id: Uuid::new_v4(),
            name: "Tech".into(),
            description: Some("d".into()),
            posts: vec![post_with_status(PostStatus::Published)],
        };
        let dto = category_to_dto(&category);
        assert_eq!(dto.id, category.id);
        assert_eq!(dto.name, "Tech");
        assert_eq!(dto.description.as_deref(), Some("d"));
        assert_eq!(dto.post_count, 1);
    }

    #[test]
    fn request_mapping_copies_only_user_fields() {
        let new = category_from_request(CreateCategoryRequest {
            name: "Tech".into(),
            description: Some("d".into()),
        });
        assert_eq!(new.name, "Tech");
        assert_eq!(new.description.as_deref(), Some("d"));
        // NewCategory has no id/count/association fields by construction.
    }

    #[test]
    fn tag_dto_counts_published_only() {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: "rust".into(),
            posts: vec![
                post_with_status(PostStatus::Draft),
                post_with_status(PostStatus::Published),
            ],
        };
        assert_eq!(tag_to_dto(&tag).post_count, 1);
    }
}
