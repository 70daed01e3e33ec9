//! Database repositories.
//!
//! One repository per table, each wrapping a shared [`sea_orm::DatabaseConnection`].

#![allow(missing_docs)]

pub mod block;
pub mod bookmark;
pub mod comment;
pub mod comment_like;
pub mod follow;
pub mod notification;
pub mod post;
pub mod post_like;
pub mod user;

pub use block::BlockRepository;
pub use bookmark::BookmarkRepository;
pub use comment::CommentRepository;
pub use comment_like::CommentLikeRepository;
pub use follow::FollowRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use post_like::PostLikeRepository;
pub use user::UserRepository;

use coterie_common::{AppError, AppResult};
use sea_orm::{DbErr, SqlErr};

/// Outcome of inserting a row keyed by a unique pair.
///
/// A unique-constraint conflict is reported as a value rather than an error
/// so services can take the idempotent-success path without a check-then-act
/// race.
#[derive(Debug)]
pub enum PairInsert<T> {
    /// The row was inserted.
    Inserted(T),
    /// A row for this pair already existed.
    Duplicate,
}

impl<T> PairInsert<T> {
    /// Returns `true` when the insert created a new row.
    #[must_use]
    pub const fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Map an insert result, converting unique-constraint violations into
/// [`PairInsert::Duplicate`].
pub(crate) fn map_pair_insert<T>(result: Result<T, DbErr>) -> AppResult<PairInsert<T>> {
    match result {
        Ok(model) => Ok(PairInsert::Inserted(model)),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Ok(PairInsert::Duplicate),
            _ => Err(AppError::Database(err.to_string())),
        },
    }
}
