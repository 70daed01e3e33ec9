//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Post::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Post::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Post::Caption).text())
                    .col(ColumnDef::new(Post::SharedPostId).string_len(32))
                    .col(ColumnDef::new(Post::LikesCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::CommentsCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::ShareCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_owner")
                            .from(Post::Table, Post::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: owner_id (for listing a user's posts)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_owner_id")
                    .table(Post::Table)
                    .col(Post::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Index: shared_post_id (for reshare lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_shared_post_id")
                    .table(Post::Table)
                    .col(Post::SharedPostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    OwnerId,
    Caption,
    SharedPostId,
    LikesCount,
    CommentsCount,
    ShareCount,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
