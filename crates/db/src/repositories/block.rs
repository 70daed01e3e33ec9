//! Block repository.

use std::sync::Arc;

use crate::entities::{Block, block};
use crate::repositories::{PairInsert, map_pair_insert};
use coterie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Block repository for database operations.
#[derive(Clone)]
pub struct BlockRepository {
    db: Arc<DatabaseConnection>,
}

impl BlockRepository {
    /// Create a new block repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a block edge by blocker and blocked.
    pub async fn find_by_pair(
        &self,
        blocker_id: &str,
        blocked_id: &str,
    ) -> AppResult<Option<block::Model>> {
        Block::find()
            .filter(block::Column::BlockerId.eq(blocker_id))
            .filter(block::Column::BlockedId.eq(blocked_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is blocking another user.
    pub async fn is_blocking(&self, blocker_id: &str, blocked_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(blocker_id, blocked_id).await?.is_some())
    }

    /// Check if either user is blocking the other.
    pub async fn is_blocked_between(&self, user_a: &str, user_b: &str) -> AppResult<bool> {
        let count = Block::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(block::Column::BlockerId.eq(user_a))
                            .add(block::Column::BlockedId.eq(user_b)),
                    )
                    .add(
                        Condition::all()
                            .add(block::Column::BlockerId.eq(user_b))
                            .add(block::Column::BlockedId.eq(user_a)),
                    ),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count.is_some())
    }

    /// Insert a block edge; a unique-constraint conflict is reported as
    /// [`PairInsert::Duplicate`].
    pub async fn insert(&self, model: block::ActiveModel) -> AppResult<PairInsert<block::Model>> {
        map_pair_insert(model.insert(self.db.as_ref()).await)
    }

    /// Delete a block edge by pair. Returns whether a row was removed.
    pub async fn delete_by_pair(&self, blocker_id: &str, blocked_id: &str) -> AppResult<bool> {
        let edge = self.find_by_pair(blocker_id, blocked_id).await?;
        match edge {
            Some(b) => {
                b.delete(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get users that a user is blocking (newest first, keyset pagination).
    pub async fn find_blocking(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<block::Model>> {
        let mut query = Block::find()
            .filter(block::Column::BlockerId.eq(user_id))
            .order_by_desc(block::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(block::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_block(id: &str, blocker_id: &str, blocked_id: &str) -> block::Model {
        block::Model {
            id: id.to_string(),
            blocker_id: blocker_id.to_string(),
            blocked_id: blocked_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_blocking_true() {
        let edge = create_test_block("b1", "user1", "user2");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        assert!(repo.is_blocking("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_blocking_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<block::Model>::new()])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        assert!(!repo.is_blocking("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_blocked_between_either_direction() {
        let edge = create_test_block("b1", "user2", "user1");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        assert!(repo.is_blocked_between("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<block::Model>::new()])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        assert!(!repo.delete_by_pair("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_present() {
        let edge = create_test_block("b1", "user1", "user2");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        assert!(repo.delete_by_pair("user1", "user2").await.unwrap());
    }
}
