//! Like service.
//!
//! Likes are idempotent through the unique (user, target) index: the insert
//! is attempted unconditionally and a duplicate-key rejection means "already
//! liked". There is deliberately no existence pre-check, which would race
//! under concurrent double-clicks.

use crate::services::notification::NotificationService;
use coterie_common::{AppResult, IdGenerator};
use coterie_db::{
    entities::{comment_like, notification::NotificationKind, post_like},
    repositories::{
        CommentLikeRepository, CommentRepository, PairInsert, PostLikeRepository, PostRepository,
    },
};
use sea_orm::Set;
use serde_json::json;

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    post_like_repo: PostLikeRepository,
    comment_like_repo: CommentLikeRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        post_like_repo: PostLikeRepository,
        comment_like_repo: CommentLikeRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            post_like_repo,
            comment_like_repo,
            post_repo,
            comment_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a post. Returns whether a new like was recorded.
    ///
    /// Liking an already-liked post succeeds as a no-op with no counter or
    /// notification side effects.
    pub async fn like_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let model = post_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.post_like_repo.insert(model).await? {
            PairInsert::Duplicate => return Ok(false),
            PairInsert::Inserted(_) => {}
        }

        // The like row is durable; counter and notification writes are
        // best-effort from here on
        if let Err(e) = self.post_repo.increment_likes_count(post_id).await {
            tracing::warn!(error = %e, post_id, "Failed to bump post like counter");
        }

        if let Err(e) = self
            .notifications
            .create(
                &post.owner_id,
                user_id,
                NotificationKind::Like,
                Some(post_id),
                json!({}),
            )
            .await
        {
            tracing::warn!(error = %e, post_id, "Failed to write like notification");
        }

        Ok(true)
    }

    /// Remove a like from a post. Returns whether a like was removed.
    ///
    /// The counter decrement is clamped at zero in the store, so a retried
    /// unlike can never drive the count negative.
    pub async fn unlike_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let removed = self.post_like_repo.delete_by_pair(user_id, post_id).await?;
        if removed
            && let Err(e) = self.post_repo.decrement_likes_count(post_id).await
        {
            tracing::warn!(error = %e, post_id, "Failed to lower post like counter");
        }
        Ok(removed)
    }

    /// Like a comment. Returns whether a new like was recorded.
    pub async fn like_comment(&self, user_id: &str, comment_id: &str) -> AppResult<bool> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        let model = comment_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            comment_id: Set(comment_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.comment_like_repo.insert(model).await? {
            PairInsert::Duplicate => return Ok(false),
            PairInsert::Inserted(_) => {}
        }

        if let Err(e) = self.comment_repo.increment_like_count(comment_id).await {
            tracing::warn!(error = %e, comment_id, "Failed to bump comment like counter");
        }

        if let Err(e) = self
            .notifications
            .create(
                &comment.user_id,
                user_id,
                NotificationKind::Like,
                Some(comment_id),
                json!({}),
            )
            .await
        {
            tracing::warn!(error = %e, comment_id, "Failed to write like notification");
        }

        Ok(true)
    }

    /// Remove a like from a comment. Returns whether a like was removed.
    pub async fn unlike_comment(&self, user_id: &str, comment_id: &str) -> AppResult<bool> {
        let removed = self
            .comment_like_repo
            .delete_by_pair(user_id, comment_id)
            .await?;
        if removed
            && let Err(e) = self.comment_repo.decrement_like_count(comment_id).await
        {
            tracing::warn!(error = %e, comment_id, "Failed to lower comment like counter");
        }
        Ok(removed)
    }

    /// Of the given posts, return the IDs the user has liked. Used by feed
    /// composition to annotate `has_liked` without per-post queries.
    pub async fn liked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<String>> {
        self.post_like_repo.find_liked_post_ids(user_id, post_ids).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coterie_common::AppError;
    use coterie_db::entities::{notification, post};
    use coterie_db::repositories::{NotificationRepository, UserRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_post(id: &str, owner_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            caption: Some("hello".to_string()),
            shared_post_id: None,
            likes_count: 0,
            comments_count: 0,
            share_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_like(id: &str, user_id: &str, post_id: &str) -> post_like::Model {
        post_like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_notification(id: &str, recipient_id: &str, actor_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            actor_id: actor_id.to_string(),
            kind: notification::NotificationKind::Like,
            target_id: Some("post1".to_string()),
            metadata: serde_json::json!({}),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn build_service(
        post_like_db: Arc<DatabaseConnection>,
        post_db: Arc<DatabaseConnection>,
        comment_like_db: Arc<DatabaseConnection>,
        comment_db: Arc<DatabaseConnection>,
        notification_db: Arc<DatabaseConnection>,
    ) -> LikeService {
        let notifications = NotificationService::new(
            NotificationRepository::new(notification_db),
            UserRepository::new(empty_db()),
        );
        LikeService::new(
            PostLikeRepository::new(post_like_db),
            CommentLikeRepository::new(comment_like_db),
            PostRepository::new(post_db),
            CommentRepository::new(comment_db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_like_post_records_and_notifies() {
        let post_like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_like("l1", "user1", "post1")]])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post1", "user2")]])
                .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
                .into_connection(),
        );
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_notification("n1", "user2", "user1")]])
                .into_connection(),
        );

        let service = build_service(post_like_db, post_db, empty_db(), empty_db(), notification_db);
        let newly_liked = service.like_post("user1", "post1").await.unwrap();
        assert!(newly_liked);
    }

    #[tokio::test]
    async fn test_like_post_survives_counter_failure() {
        let post_like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_like("l1", "user1", "post1")]])
                .into_connection(),
        );
        // The like row lands, then the counter update dies
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post1", "user2")]])
                .append_exec_errors([DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_notification("n1", "user2", "user1")]])
                .into_connection(),
        );

        let service = build_service(post_like_db, post_db, empty_db(), empty_db(), notification_db);
        let newly_liked = service.like_post("user1", "post1").await.unwrap();
        assert!(newly_liked);
    }

    #[tokio::test]
    async fn test_like_missing_post_fails() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = build_service(empty_db(), post_db, empty_db(), empty_db(), empty_db());
        let result = service.like_post("user1", "missing").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_unlike_post_without_like_is_noop() {
        let post_like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_like::Model>::new()])
                .into_connection(),
        );
        // Post db has no exec results queued: a decrement would panic the mock
        let service = build_service(post_like_db, empty_db(), empty_db(), empty_db(), empty_db());
        let removed = service.unlike_post("user1", "post1").await.unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_unlike_post_decrements_counter() {
        let post_like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_like("l1", "user1", "post1")]])
                .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
                .into_connection(),
        );

        let service = build_service(post_like_db, post_db, empty_db(), empty_db(), empty_db());
        let removed = service.unlike_post("user1", "post1").await.unwrap();
        assert!(removed);
    }
}
