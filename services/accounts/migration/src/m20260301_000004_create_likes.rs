use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Likes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Likes::ActorId).uuid().not_null())
                    .col(ColumnDef::new(Likes::TargetId).uuid().not_null())
                    .col(ColumnDef::new(Likes::TargetKind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Likes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Likes::ActorId)
                            .col(Likes::TargetId)
                            .col(Likes::TargetKind),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Likes::Table, Likes::ActorId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Likes::Table)
                    .col(Likes::TargetKind)
                    .col(Likes::TargetId)
                    .name("idx_likes_target")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Likes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Likes {
    Table,
    ActorId,
    TargetId,
    TargetKind,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
