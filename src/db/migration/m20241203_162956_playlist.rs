use sea_orm_migration::{prelude::*, schema::*};

use super::m20220101_000001_create_table::{Song, User};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlist::Table)
                    .if_not_exists()
                    .col(integer(Playlist::UserId))
                    .col(integer(Playlist::SongId))
                    .primary_key(
                        Index::create()
                            .col(Playlist::UserId)
                            .col(Playlist::SongId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Playlist::Table, Playlist::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Playlist::Table, Playlist::SongId)
                            .to(Song::Table, Song::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Playlist::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Playlist {
    Table,
    UserId,
    SongId,
}
