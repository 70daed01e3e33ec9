//! Comment entity (two-level threads with tombstoning).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Placeholder content for tombstoned comments.
pub const DELETED_PLACEHOLDER: &str = "[Comment deleted]";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub post_id: String,

    /// Author user ID
    pub user_id: String,

    /// Parent comment ID. Only top-level comments may be parents (depth cap 2).
    #[sea_orm(nullable, indexed)]
    pub parent_id: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Number of replies ever attached. Monotonic: not decremented when a
    /// child is removed, since tombstoned children keep their place.
    #[sea_orm(default_value = 0)]
    pub reply_count: i32,

    /// Likes count (denormalized)
    #[sea_orm(default_value = 0)]
    pub like_count: i32,

    /// Tombstone flag. Deleted comments with replies are retained with
    /// redacted content to preserve the thread shape.
    #[sea_orm(default_value = false)]
    pub is_deleted: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
