//! Comment like repository.

use std::sync::Arc;

use crate::entities::{CommentLike, comment_like};
use crate::repositories::{PairInsert, map_pair_insert};
use coterie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};

/// Comment like repository for database operations.
#[derive(Clone)]
pub struct CommentLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentLikeRepository {
    /// Create a new comment like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and comment.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<comment_like::Model>> {
        CommentLike::find()
            .filter(comment_like::Column::UserId.eq(user_id))
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like; a unique-constraint conflict is reported as
    /// [`PairInsert::Duplicate`].
    pub async fn insert(
        &self,
        model: comment_like::ActiveModel,
    ) -> AppResult<PairInsert<comment_like::Model>> {
        map_pair_insert(model.insert(self.db.as_ref()).await)
    }

    /// Delete a like by pair. Returns whether a row was removed.
    pub async fn delete_by_pair(&self, user_id: &str, comment_id: &str) -> AppResult<bool> {
        let like = self.find_by_pair(user_id, comment_id).await?;
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

    /// Of the given comments, return the IDs the user has liked (used for
    /// viewer annotation when listing comment threads).
    pub async fn find_liked_comment_ids(
        &self,
        user_id: &str,
        comment_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        let likes = CommentLike::find()
            .filter(comment_like::Column::UserId.eq(user_id))
            .filter(comment_like::Column::CommentId.is_in(comment_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(likes.into_iter().map(|l| l.comment_id).collect())
    }
}
