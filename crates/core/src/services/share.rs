//! Share service.
//!
//! A share is a new post that points at the shared post. Shares of shares
//! are flattened: the new post always references the root original, and the
//! root's share counter is the one incremented.

use coterie_common::{AppResult, IdGenerator};
use coterie_db::{entities::post, repositories::PostRepository};
use sea_orm::Set;

/// Share service for business logic.
#[derive(Clone)]
pub struct ShareService {
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl ShareService {
    /// Create a new share service.
    #[must_use]
    pub const fn new(post_repo: PostRepository) -> Self {
        Self {
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Share a post, creating a reshare post owned by `user_id`.
    pub async fn share_post(
        &self,
        user_id: &str,
        post_id: &str,
        caption: Option<&str>,
    ) -> AppResult<post::Model> {
        let original = self.post_repo.get_by_id(post_id).await?;

        // Sharing a share targets the root post
        let root_id = original.shared_post_id.unwrap_or(original.id);

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(user_id.to_string()),
            caption: Set(caption.map(ToString::to_string)),
            shared_post_id: Set(Some(root_id.clone())),
            likes_count: Set(0),
            comments_count: Set(0),
            share_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };

        let share = self.post_repo.create(model).await?;
        // The reshare row is durable; the counter bump is best-effort
        if let Err(e) = self.post_repo.increment_share_count(&root_id).await {
            tracing::warn!(error = %e, root_id, "Failed to bump share counter");
        }

        Ok(share)
    }
}
