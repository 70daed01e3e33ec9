//! Business logic services.

#![allow(missing_docs)]

pub mod block;
pub mod bookmark;
pub mod comment;
pub mod follow;
pub mod like;
pub mod notification;
pub mod share;

pub use block::BlockService;
pub use bookmark::BookmarkService;
pub use comment::{CommentService, CommentThread, CommentView, ContentRules, NewComment};
pub use follow::{FollowService, FollowStatus, RequestAction};
pub use like::LikeService;
pub use notification::{NotificationService, NotificationView};
pub use share::ShareService;
