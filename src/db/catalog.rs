use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ActiveValue as AV, ColumnTrait, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;

use super::{Error, Kind, DB};
use crate::{
    entity::{album, genre, playlist, song},
    query::{Search, Target},
    validate::{self, AlbumDraft, Invalid, SongDraft},
};

/// An album with what the pages show next to it. The song count is derived
/// from `songs` rather than stored.
#[derive(Debug, Clone)]
pub struct AlbumView {
    pub album: album::Model,
    pub genre: Option<genre::Model>,
    pub songs: Vec<song::Model>,
}

impl AlbumView {
    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn genre_name(&self) -> &str {
        self.genre.as_ref().map(|g| g.name.as_str()).unwrap_or("?")
    }
}

#[derive(Debug, Clone)]
pub struct SongView {
    pub song: song::Model,
    pub album: album::Model,
}

impl DB {
    pub async fn all_genres(&self) -> Result<Vec<genre::Model>, DbErr> {
        genre::Entity::find()
            .order_by_asc(genre::Column::Name)
            .all(&self.connection)
            .await
    }

    pub async fn genre(&self, id: i32) -> Result<Option<genre::Model>, DbErr> {
        genre::Entity::find_by_id(id).one(&self.connection).await
    }

    pub async fn create_genre(&self, name: &str) -> Result<genre::Model, Error> {
        let name = validate::name("Genre name", name)?;
        let genre = genre::ActiveModel {
            name: AV::Set(name),
            ..Default::default()
        }
        .insert(&self.connection)
        .await?;

        info!("created genre {} ({})", genre.name, genre.id);
        Ok(genre)
    }

    /// Renames a genre. Albums refer to it by id, so they follow along.
    pub async fn update_genre(&self, id: i32, name: &str) -> Result<genre::Model, Error> {
        let txn = self.connection.begin().await?;
        let genre = genre::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::Genre))?;
        let name = validate::name("Genre name", name)?;

        let mut active: genre::ActiveModel = genre.into();
        active.name = AV::Set(name);
        let genre = active.update(&txn).await?;
        txn.commit().await?;

        info!("updated genre {}", genre.id);
        Ok(genre)
    }

    /// Refuses while any album still belongs to the genre.
    pub async fn delete_genre(&self, id: i32) -> Result<genre::Model, Error> {
        let txn = self.connection.begin().await?;
        let genre = genre::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::Genre))?;

        let albums = genre.find_related(album::Entity).all(&txn).await?;
        if !albums.is_empty() {
            return Err(Error::InUse {
                what: format!("Genre \"{}\"", genre.name),
                dependents: albums.into_iter().map(|a| a.name).collect(),
            });
        }

        genre.clone().delete(&txn).await?;
        txn.commit().await?;

        info!("deleted genre {} ({})", genre.name, genre.id);
        Ok(genre)
    }

    pub async fn all_albums(&self) -> Result<Vec<album::Model>, DbErr> {
        album::Entity::find()
            .order_by_asc(album::Column::Id)
            .all(&self.connection)
            .await
    }

    pub async fn album(&self, id: i32) -> Result<Option<album::Model>, DbErr> {
        album::Entity::find_by_id(id).one(&self.connection).await
    }

    pub async fn album_view(&self, id: i32) -> Result<Option<AlbumView>, DbErr> {
        let Some(album) = self.album(id).await? else {
            return Ok(None);
        };
        Ok(self.album_views(vec![album]).await?.pop())
    }

    /// Attaches genre and songs to each album, keeping the given order.
    pub async fn album_views(&self, albums: Vec<album::Model>) -> Result<Vec<AlbumView>, DbErr> {
        if albums.is_empty() {
            return Ok(vec![]);
        }

        let genre_ids: HashSet<i32> = albums.iter().map(|a| a.genre_id).collect();
        let genres: HashMap<i32, genre::Model> = genre::Entity::find()
            .filter(genre::Column::Id.is_in(genre_ids))
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        let mut songs: HashMap<i32, Vec<song::Model>> = HashMap::new();
        for song in song::Entity::find()
            .filter(song::Column::AlbumId.is_in(albums.iter().map(|a| a.id)))
            .order_by_asc(song::Column::Id)
            .all(&self.connection)
            .await?
        {
            songs.entry(song.album_id).or_default().push(song);
        }

        Ok(albums
            .into_iter()
            .map(|album| AlbumView {
                genre: genres.get(&album.genre_id).cloned(),
                songs: songs.remove(&album.id).unwrap_or_default(),
                album,
            })
            .collect())
    }

    pub async fn create_album(&self, draft: AlbumDraft) -> Result<album::Model, Error> {
        let txn = self.connection.begin().await?;
        if genre::Entity::find_by_id(draft.genre_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(Invalid::Reference("Genre").into());
        }

        let album = album::ActiveModel {
            name: AV::Set(draft.name),
            genre_id: AV::Set(draft.genre_id),
            artist: AV::Set(draft.artist),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!("created album {} ({})", album.name, album.id);
        Ok(album)
    }

    pub async fn update_album(&self, id: i32, draft: AlbumDraft) -> Result<album::Model, Error> {
        let txn = self.connection.begin().await?;
        let album = album::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::Album))?;
        if genre::Entity::find_by_id(draft.genre_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(Invalid::Reference("Genre").into());
        }

        let mut active: album::ActiveModel = album.into();
        active.name = AV::Set(draft.name);
        active.genre_id = AV::Set(draft.genre_id);
        active.artist = AV::Set(draft.artist);
        let album = active.update(&txn).await?;
        txn.commit().await?;

        info!("updated album {}", album.id);
        Ok(album)
    }

    /// Refuses while the album still has songs.
    pub async fn delete_album(&self, id: i32) -> Result<album::Model, Error> {
        let txn = self.connection.begin().await?;
        let album = album::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::Album))?;

        let songs = album.find_related(song::Entity).all(&txn).await?;
        if !songs.is_empty() {
            return Err(Error::InUse {
                what: format!("Album \"{}\"", album.name),
                dependents: songs.into_iter().map(|s| s.name).collect(),
            });
        }

        album.clone().delete(&txn).await?;
        txn.commit().await?;

        info!("deleted album {} ({})", album.name, album.id);
        Ok(album)
    }

    pub async fn all_songs(&self) -> Result<Vec<song::Model>, DbErr> {
        song::Entity::find()
            .order_by_asc(song::Column::Id)
            .all(&self.connection)
            .await
    }

    pub async fn song(&self, id: i32) -> Result<Option<song::Model>, DbErr> {
        song::Entity::find_by_id(id).one(&self.connection).await
    }

    pub async fn song_view(&self, id: i32) -> Result<Option<SongView>, DbErr> {
        let found = song::Entity::find_by_id(id)
            .find_also_related(album::Entity)
            .one(&self.connection)
            .await?;
        Ok(found.and_then(|(song, album)| album.map(|album| SongView { song, album })))
    }

    pub async fn create_song(&self, draft: SongDraft) -> Result<song::Model, Error> {
        let txn = self.connection.begin().await?;
        if album::Entity::find_by_id(draft.album_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(Invalid::Reference("Album").into());
        }

        let song = song::ActiveModel {
            name: AV::Set(draft.name),
            album_id: AV::Set(draft.album_id),
            lyrics_path: AV::Set(draft.lyrics_path),
            duration: AV::Set(draft.duration),
            created_on: AV::Set(draft.created_on),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!("created song {} ({}) in album {}", song.name, song.id, song.album_id);
        Ok(song)
    }

    pub async fn update_song(&self, id: i32, draft: SongDraft) -> Result<song::Model, Error> {
        let txn = self.connection.begin().await?;
        let song = song::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::Song))?;
        if album::Entity::find_by_id(draft.album_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(Invalid::Reference("Album").into());
        }

        let mut active: song::ActiveModel = song.into();
        active.name = AV::Set(draft.name);
        active.album_id = AV::Set(draft.album_id);
        active.lyrics_path = AV::Set(draft.lyrics_path);
        active.duration = AV::Set(draft.duration);
        active.created_on = AV::Set(draft.created_on);
        let song = active.update(&txn).await?;
        txn.commit().await?;

        info!("updated song {}", song.id);
        Ok(song)
    }

    /// Removes the song together with every playlist entry pointing at it.
    pub async fn delete_song(&self, id: i32) -> Result<song::Model, Error> {
        let txn = self.connection.begin().await?;
        let song = song::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::Song))?;

        let dropped = playlist::Entity::delete_many()
            .filter(playlist::Column::SongId.eq(song.id))
            .exec(&txn)
            .await?;
        song.clone().delete(&txn).await?;
        txn.commit().await?;

        info!(
            "deleted song {} ({}), dropped from {} playlist(s)",
            song.name, song.id, dropped.rows_affected
        );
        Ok(song)
    }

    /// Albums matching a search: by album name, or the albums of matching
    /// songs (each album once). Without a usable search, every album.
    pub async fn search_albums(&self, search: &Search) -> Result<Vec<album::Model>, DbErr> {
        match search.target() {
            None => self.all_albums().await,
            Some(Target::Album(term)) => {
                album::Entity::find()
                    .filter(album::Column::Name.contains(term))
                    .order_by_asc(album::Column::Id)
                    .all(&self.connection)
                    .await
            }
            Some(Target::Song(term)) => {
                let hits = song::Entity::find()
                    .filter(song::Column::Name.contains(term))
                    .order_by_asc(song::Column::Id)
                    .find_also_related(album::Entity)
                    .all(&self.connection)
                    .await?;

                let mut seen = HashSet::new();
                Ok(hits
                    .into_iter()
                    .filter_map(|(_, album)| album)
                    .filter(|album| seen.insert(album.id))
                    .collect())
            }
        }
    }
}
