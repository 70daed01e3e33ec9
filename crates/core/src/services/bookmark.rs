//! Bookmark service.
//!
//! Bookmarks share the idempotent-insert pattern with likes but are private
//! to the user: no counter on the post, no notification to the owner.

use coterie_common::{AppResult, IdGenerator};
use coterie_db::{
    entities::{bookmark, post},
    repositories::{BookmarkRepository, PostRepository},
};
use sea_orm::Set;

/// Bookmark service for business logic.
#[derive(Clone)]
pub struct BookmarkService {
    bookmark_repo: BookmarkRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl BookmarkService {
    /// Create a new bookmark service.
    #[must_use]
    pub const fn new(bookmark_repo: BookmarkRepository, post_repo: PostRepository) -> Self {
        Self {
            bookmark_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Bookmark a post. Returns whether a new bookmark was recorded.
    pub async fn bookmark(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        // Post must exist; bookmarks carry no other side effects
        self.post_repo.get_by_id(post_id).await?;

        let model = bookmark::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        Ok(self.bookmark_repo.insert(model).await?.is_inserted())
    }

    /// Remove a bookmark. Returns whether a bookmark was removed.
    pub async fn unbookmark(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.bookmark_repo.delete_by_pair(user_id, post_id).await
    }

    /// Get a user's bookmarked posts (newest bookmark first, offset pagination).
    pub async fn get_bookmarks(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        let bookmarks = self.bookmark_repo.find_by_user(user_id, limit, offset).await?;

        let mut posts = Vec::with_capacity(bookmarks.len());
        for b in bookmarks {
            // A post removed since bookmarking is silently skipped
            if let Some(found) = self.post_repo.find_by_id(&b.post_id).await? {
                posts.push(found);
            }
        }
        Ok(posts)
    }

    /// Of the given posts, return the IDs the user has bookmarked.
    pub async fn bookmarked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<String>> {
        self.bookmark_repo
            .find_bookmarked_post_ids(user_id, post_ids)
            .await
    }
}
