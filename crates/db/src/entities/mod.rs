//! Database entities.

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

pub use block::Entity as Block;
pub use bookmark::Entity as Bookmark;
pub use comment::Entity as Comment;
pub use comment_like::Entity as CommentLike;
pub use follow::Entity as Follow;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use user::Entity as User;
