use sea_orm_migration::{prelude::*, schema::*};

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
                    .col(pk_auto(User::Id))
                    .col(string_len_uniq(User::Username, 50))
                    .col(string_len(User::Passhash, 512))
                    .col(string_len_null(User::Name, 50))
                    .col(boolean(User::IsAdmin).default(false))
                    .col(boolean(User::IsCreator).default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(string_len(Genre::Name, 50))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Album::Table)
                    .if_not_exists()
                    .col(pk_auto(Album::Id))
                    .col(string_len(Album::Name, 50))
                    .col(integer(Album::GenreId))
                    .col(string_len(Album::Artist, 50))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Album::Table, Album::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Song::Table)
                    .if_not_exists()
                    .col(pk_auto(Song::Id))
                    .col(string_len(Song::Name, 50))
                    .col(integer(Song::AlbumId))
                    .col(string_len_null(Song::LyricsPath, 255))
                    .col(time(Song::Duration))
                    .col(date(Song::CreatedOn))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Song::Table, Song::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Song::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Album::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genre::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum User {
    Table,
    Id,
    Username,
    Passhash,
    Name,
    IsAdmin,
    IsCreator,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Album {
    Table,
    Id,
    Name,
    GenreId,
    Artist,
}

#[derive(DeriveIden)]
pub(super) enum Song {
    Table,
    Id,
    Name,
    AlbumId,
    LyricsPath,
    Duration,
    CreatedOn,
}
