//! Post like repository.

use std::sync::Arc;

use crate::entities::{PostLike, post_like};
use crate::repositories::{PairInsert, map_pair_insert};
use coterie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};

/// Post like repository for database operations.
#[derive(Clone)]
pub struct PostLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl PostLikeRepository {
    /// Create a new post like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and post.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<post_like::Model>> {
        PostLike::find()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like; a unique-constraint conflict is reported as
    /// [`PairInsert::Duplicate`] (concurrent double-tap safety).
    pub async fn insert(
        &self,
        model: post_like::ActiveModel,
    ) -> AppResult<PairInsert<post_like::Model>> {
        map_pair_insert(model.insert(self.db.as_ref()).await)
    }

    /// Delete a like by pair. Returns whether a row was removed.
    pub async fn delete_by_pair(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let like = self.find_by_pair(user_id, post_id).await?;
        match like {
            Some(l) => {
                l.delete(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Of the given posts, return the IDs the user has liked (read-side
    /// annotation for feed composition).
    pub async fn find_liked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        let likes = PostLike::find()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(likes.into_iter().map(|l| l.post_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_like(id: &str, user_id: &str, post_id: &str) -> post_like::Model {
        post_like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_delete_by_pair_present() {
        let like = create_test_like("l1", "user1", "post1");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostLikeRepository::new(db);
        assert!(repo.delete_by_pair("user1", "post1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_absent_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_like::Model>::new()])
                .into_connection(),
        );

        let repo = PostLikeRepository::new(db);
        assert!(!repo.delete_by_pair("user1", "post1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_liked_post_ids() {
        let l1 = create_test_like("l1", "user1", "post1");
        let l2 = create_test_like("l2", "user1", "post3");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[l1, l2]])
                .into_connection(),
        );

        let repo = PostLikeRepository::new(db);
        let ids = repo
            .find_liked_post_ids(
                "user1",
                &["post1".to_string(), "post2".to_string(), "post3".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(ids, vec!["post1".to_string(), "post3".to_string()]);
    }

    #[tokio::test]
    async fn test_find_liked_post_ids_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PostLikeRepository::new(db);
        let ids = repo.find_liked_post_ids("user1", &[]).await.unwrap();

        assert!(ids.is_empty());
    }
}
