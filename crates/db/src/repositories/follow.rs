//! Follow repository.

use std::sync::Arc;

use crate::entities::{
    Follow,
    follow::{self, FollowState},
};
use crate::repositories::{PairInsert, map_pair_insert};
use coterie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow edge by follower and following.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if an active follow edge exists.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_pair(follower_id, following_id)
            .await?
            .is_some_and(|f| f.state == FollowState::Active))
    }

    /// Insert a follow edge.
    ///
    /// The unique index on (`follower_id`, `following_id`) makes this safe
    /// under concurrent duplicate calls; a conflict is reported as
    /// [`PairInsert::Duplicate`].
    pub async fn insert(&self, model: follow::ActiveModel) -> AppResult<PairInsert<follow::Model>> {
        map_pair_insert(model.insert(self.db.as_ref()).await)
    }

    /// Mark an edge active (follow request accepted).
    pub async fn activate(&self, id: &str) -> AppResult<()> {
        let model = follow::ActiveModel {
            id: Set(id.to_string()),
            state: Set(FollowState::Active),
            ..Default::default()
        };
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a follow edge by pair, returning the deleted row so the caller
    /// can reconcile counters based on its prior state.
    ///
    /// Concurrent deleters of the same edge race on the delete itself: only
    /// the call whose delete removed the row gets it back, so the counter
    /// reconciliation runs once.
    pub async fn delete_by_pair(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        let Some(edge) = self.find_by_pair(follower_id, following_id).await? else {
            return Ok(None);
        };
        let result = Follow::delete_by_id(edge.id.clone())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok((result.rows_affected > 0).then_some(edge))
    }

    /// Get active followers of a user (newest first, keyset pagination).
    pub async fn find_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        let mut query = Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .filter(follow::Column::State.eq(FollowState::Active))
            .order_by_desc(follow::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get users that a user actively follows (newest first, keyset pagination).
    pub async fn find_following(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        let mut query = Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .filter(follow::Column::State.eq(FollowState::Active))
            .order_by_desc(follow::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending follow requests aimed at a user (newest first).
    pub async fn find_pending_received(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        let mut query = Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .filter(follow::Column::State.eq(FollowState::Pending))
            .order_by_desc(follow::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active followers of a user (authoritative count, used by the
    /// external reconciliation sweep).
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .filter(follow::Column::State.eq(FollowState::Active))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users that a user actively follows.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .filter(follow::Column::State.eq(FollowState::Active))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
