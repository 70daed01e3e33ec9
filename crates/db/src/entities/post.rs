//! Post entity.
//!
//! Posts are owned by the publishing pipeline; this subsystem touches them
//! for the denormalized engagement counters and for reshares.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub owner_id: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub caption: Option<String>,

    /// Root post this is a reshare of (always flattened to the root)
    #[sea_orm(nullable, indexed)]
    pub shared_post_id: Option<String>,

    /// Likes count (denormalized)
    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    /// Comments count (denormalized; tombstoned comments still count)
    #[sea_orm(default_value = 0)]
    pub comments_count: i32,

    /// Share count (denormalized)
    #[sea_orm(default_value = 0)]
    pub share_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
