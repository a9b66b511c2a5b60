//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::FingerprintId).string_len(64).null())
                    .col(
                        ColumnDef::new(User::StrongFingerprintId)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(User::IpAddress).string_len(64).null())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: fingerprint_id (for identity resolution lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_fingerprint_id")
                    .table(User::Table)
                    .col(User::FingerprintId)
                    .to_owned(),
            )
            .await?;

        // Index: ip_address (fallback identity resolution)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_ip_address")
                    .table(User::Table)
                    .col(User::IpAddress)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    FingerprintId,
    StrongFingerprintId,
    IpAddress,
    CreatedAt,
}
