//! Bookmark repository.

use std::sync::Arc;

use crate::entities::{Bookmark, bookmark};
use crate::repositories::{PairInsert, map_pair_insert};
use coterie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Bookmark repository for database operations.
#[derive(Clone)]
pub struct BookmarkRepository {
    db: Arc<DatabaseConnection>,
}

impl BookmarkRepository {
    /// Create a new bookmark repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a bookmark by user and post.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<bookmark::Model>> {
        Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a bookmark; a unique-constraint conflict is reported as
    /// [`PairInsert::Duplicate`].
    pub async fn insert(
        &self,
        model: bookmark::ActiveModel,
    ) -> AppResult<PairInsert<bookmark::Model>> {
        map_pair_insert(model.insert(self.db.as_ref()).await)
    }

    /// Delete a bookmark by pair. Returns whether a row was removed.
    pub async fn delete_by_pair(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let bookmark = self.find_by_pair(user_id, post_id).await?;
        match bookmark {
            Some(b) => {
                b.delete(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get a user's bookmarks (newest first, offset pagination).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<bookmark::Model>> {
        Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Of the given posts, return the IDs the user has bookmarked.
    pub async fn find_bookmarked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        let bookmarks = Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.is_in(post_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(bookmarks.into_iter().map(|b| b.post_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_bookmark(id: &str, user_id: &str, post_id: &str) -> bookmark::Model {
        bookmark::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_delete_by_pair_present() {
        let bookmark = create_test_bookmark("b1", "user1", "post1");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bookmark]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = BookmarkRepository::new(db);
        assert!(repo.delete_by_pair("user1", "post1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_absent_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<bookmark::Model>::new()])
                .into_connection(),
        );

        let repo = BookmarkRepository::new(db);
        assert!(!repo.delete_by_pair("user1", "post1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let b1 = create_test_bookmark("b1", "user1", "post1");
        let b2 = create_test_bookmark("b2", "user1", "post2");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[b1, b2]])
                .into_connection(),
        );

        let repo = BookmarkRepository::new(db);
        let result = repo.find_by_user("user1", 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
