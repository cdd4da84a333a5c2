use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Accounts::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    // Nullable + unique: Postgres admits any number of NULLs.
                    .col(ColumnDef::new(Accounts::Username).string().unique_key())
                    .col(ColumnDef::new(Accounts::PasswordHash).string())
                    .col(ColumnDef::new(Accounts::FullName).string().not_null())
                    .col(ColumnDef::new(Accounts::Avatar).string().not_null())
                    .col(ColumnDef::new(Accounts::CoverImage).string())
                    .col(
                        ColumnDef::new(Accounts::Provider)
                            .string_len(16)
                            .not_null()
                            .default("local"),
                    )
                    .col(ColumnDef::new(Accounts::RefreshToken).text())
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Email,
    Username,
    PasswordHash,
    FullName,
    Avatar,
    CoverImage,
    Provider,
    RefreshToken,
    CreatedAt,
    UpdatedAt,
}
