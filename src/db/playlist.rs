use sea_orm::{
    ActiveModelTrait, ActiveValue as AV, ColumnTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::{debug, info};

use super::{Error, Kind, DB};
use crate::entity::{playlist, song, user};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAdd {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone)]
pub struct PlaylistItem {
    pub entry: playlist::Model,
    pub song: song::Model,
}

impl DB {
    /// Puts a song on a user's playlist. Entries are keyed by (user, song), so
    /// adding the same song twice is a no-op and never touches other users.
    pub async fn add_to_playlist(&self, user_id: i32, song_id: i32) -> Result<PlaylistAdd, Error> {
        let txn = self.connection.begin().await?;
        if user::Entity::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(Error::NotFound(Kind::User));
        }
        if song::Entity::find_by_id(song_id).one(&txn).await?.is_none() {
            return Err(Error::NotFound(Kind::Song));
        }

        if playlist::Entity::find_by_id((user_id, song_id))
            .one(&txn)
            .await?
            .is_some()
        {
            debug!("song {song_id} already on playlist of user {user_id}");
            return Ok(PlaylistAdd::AlreadyPresent);
        }

        playlist::ActiveModel {
            user_id: AV::Set(user_id),
            song_id: AV::Set(song_id),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!("song {song_id} added to playlist of user {user_id}");
        Ok(PlaylistAdd::Added)
    }

    pub async fn playlist_for_user(&self, user_id: i32) -> Result<Vec<PlaylistItem>, DbErr> {
        let rows = playlist::Entity::find()
            .filter(playlist::Column::UserId.eq(user_id))
            .order_by_asc(playlist::Column::SongId)
            .find_also_related(song::Entity)
            .all(&self.connection)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, song)| song.map(|song| PlaylistItem { entry, song }))
            .collect())
    }
}
