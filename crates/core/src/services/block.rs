//! Block service.
//!
//! Blocking severs the relationship in both directions. The block edge is
//! written first, then the follow cleanup runs; a narrow window where the
//! block exists alongside stale follow edges is accepted, and each cleanup
//! step reconciles counters on its own.

use coterie_common::{AppError, AppResult, IdGenerator};
use coterie_db::{
    entities::{block, follow::FollowState, user},
    repositories::{BlockRepository, FollowRepository, PairInsert, UserRepository},
};
use sea_orm::Set;

/// Block service for business logic.
#[derive(Clone)]
pub struct BlockService {
    block_repo: BlockRepository,
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BlockService {
    /// Create a new block service.
    #[must_use]
    pub const fn new(
        block_repo: BlockRepository,
        follow_repo: FollowRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            block_repo,
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Block a user.
    ///
    /// Idempotent: blocking an already-blocked user succeeds without side
    /// effects. A genuine insert removes any follow edges between the two
    /// users in both directions.
    pub async fn block(&self, blocker_id: &str, blocked_id: &str) -> AppResult<()> {
        if blocker_id == blocked_id {
            return Err(AppError::SelfOperation);
        }

        let model = block::ActiveModel {
            id: Set(self.id_gen.generate()),
            blocker_id: Set(blocker_id.to_string()),
            blocked_id: Set(blocked_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.block_repo.insert(model).await? {
            PairInsert::Duplicate => return Ok(()),
            PairInsert::Inserted(_) => {}
        }

        self.remove_follow_edge(blocker_id, blocked_id).await?;
        self.remove_follow_edge(blocked_id, blocker_id).await?;

        Ok(())
    }

    /// Unblock a user.
    pub async fn unblock(&self, blocker_id: &str, blocked_id: &str) -> AppResult<()> {
        if blocker_id == blocked_id {
            return Err(AppError::SelfOperation);
        }

        let removed = self.block_repo.delete_by_pair(blocker_id, blocked_id).await?;
        if !removed {
            return Err(AppError::NotFound("Not blocking this user".to_string()));
        }
        Ok(())
    }

    /// Check if a user is blocking another user.
    pub async fn is_blocking(&self, blocker_id: &str, blocked_id: &str) -> AppResult<bool> {
        self.block_repo.is_blocking(blocker_id, blocked_id).await
    }

    /// Check if either user is blocking the other.
    pub async fn is_blocked_between(&self, user_a: &str, user_b: &str) -> AppResult<bool> {
        self.block_repo.is_blocked_between(user_a, user_b).await
    }

    /// Get users that a user is blocking, hydrated (newest first).
    pub async fn get_blocking(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<user::Model>> {
        let edges = self.block_repo.find_blocking(user_id, limit, until_id).await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.blocked_id).collect();
        self.user_repo.find_by_ids(&ids).await
    }

    /// Remove one follow direction and reconcile counters if it was active.
    async fn remove_follow_edge(&self, follower_id: &str, following_id: &str) -> AppResult<()> {
        let removed = self
            .follow_repo
            .delete_by_pair(follower_id, following_id)
            .await?;

        // Counter failures after the edge delete are logged, never re-raised
        if let Some(edge) = removed
            && edge.state == FollowState::Active
        {
            if let Err(e) = self.user_repo.decrement_following_count(follower_id).await {
                tracing::warn!(error = %e, follower_id, "Failed to lower following counter");
            }
            if let Err(e) = self.user_repo.decrement_followers_count(following_id).await {
                tracing::warn!(error = %e, following_id, "Failed to lower followers counter");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coterie_db::entities::follow;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_block(id: &str, blocker_id: &str, blocked_id: &str) -> block::Model {
        block::Model {
            id: id.to_string(),
            blocker_id: blocker_id.to_string(),
            blocked_id: blocked_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_follow(id: &str, follower_id: &str, following_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            state: FollowState::Active,
            created_at: Utc::now().into(),
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn build_service(
        block_db: Arc<DatabaseConnection>,
        follow_db: Arc<DatabaseConnection>,
        user_db: Arc<DatabaseConnection>,
    ) -> BlockService {
        BlockService::new(
            BlockRepository::new(block_db),
            FollowRepository::new(follow_db),
            UserRepository::new(user_db),
        )
    }

    #[tokio::test]
    async fn test_self_block_rejected() {
        let service = build_service(empty_db(), empty_db(), empty_db());
        let result = service.block("user1", "user1").await;
        assert!(matches!(result, Err(AppError::SelfOperation)));
    }

    #[tokio::test]
    async fn test_block_cascade_removes_both_follow_directions() {
        let block_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_block("b1", "user1", "user2")]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // user1 -> user2 active edge, removed
                .append_query_results([[create_test_follow("f1", "user1", "user2")]])
                .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
                // user2 -> user1 active edge, removed
                .append_query_results([[create_test_follow("f2", "user2", "user1")]])
                .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult { last_insert_id: 0, rows_affected: 1 },
                    MockExecResult { last_insert_id: 0, rows_affected: 1 },
                    MockExecResult { last_insert_id: 0, rows_affected: 1 },
                    MockExecResult { last_insert_id: 0, rows_affected: 1 },
                ])
                .into_connection(),
        );

        let service = build_service(block_db, follow_db, user_db);
        service.block("user1", "user2").await.unwrap();
    }

    #[tokio::test]
    async fn test_block_without_follows_touches_no_counters() {
        let block_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_block("b1", "user1", "user2")]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );
        // No exec results queued: any counter update would panic the mock
        let service = build_service(block_db, follow_db, empty_db());
        service.block("user1", "user2").await.unwrap();
    }

    #[tokio::test]
    async fn test_unblock_missing_edge_is_not_found() {
        let block_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<block::Model>::new()])
                .into_connection(),
        );

        let service = build_service(block_db, empty_db(), empty_db());
        let result = service.unblock("user1", "user2").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unblock_removes_edge() {
        let block_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_block("b1", "user1", "user2")]])
                .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
                .into_connection(),
        );

        let service = build_service(block_db, empty_db(), empty_db());
        service.unblock("user1", "user2").await.unwrap();
    }

    #[tokio::test]
    async fn test_is_blocking() {
        let block_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_block("b1", "user1", "user2")]])
                .into_connection(),
        );

        let service = build_service(block_db, empty_db(), empty_db());
        assert!(service.is_blocking("user1", "user2").await.unwrap());
    }
}
