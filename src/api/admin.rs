//! Catalog management. Every handler here sits behind the admin gate.

use axum::{
    extract::{Path, Query, State},
    Form,
};
use serde::Deserialize;

use super::{
    ctx::{Admin, Reply},
    views, AlbumQuery, AppState, Id, Result, SongForm,
};
use crate::{
    db::{self, Kind},
    validate::AlbumDraft,
};

#[derive(Debug, Deserialize)]
pub(super) struct GenreForm {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AlbumForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    genre_id: String,
    #[serde(default)]
    artist: String,
}

impl AlbumForm {
    fn draft(&self) -> Result<AlbumDraft, crate::validate::Invalid> {
        AlbumDraft::parse(&self.name, &self.genre_id, &self.artist)
    }
}

pub(super) async fn dashboard(State(state): State<AppState>, Admin(ctx): Admin) -> Result<Reply> {
    let users = state.db.all_users().await?;
    let creator_count = state.db.creator_count().await?;
    let genres = state.db.all_genres().await?;
    let albums = state.db.album_views(state.db.all_albums().await?).await?;
    let songs = state.db.all_songs().await?;

    let content = views::dashboard(&users, creator_count, &genres, &albums, &songs);
    Ok(ctx.page("Dashboard", content))
}

pub(super) async fn genres(State(state): State<AppState>, Admin(ctx): Admin) -> Result<Reply> {
    let genres = state.db.all_genres().await?;
    let albums = state.db.album_views(state.db.all_albums().await?).await?;
    Ok(ctx.page("Genres", views::genres(&genres, &albums)))
}

pub(super) async fn add_genre_page(Admin(ctx): Admin) -> Reply {
    ctx.page("Add genre", views::genre_form("/genre/add", None))
}

pub(super) async fn add_genre(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Form(form): Form<GenreForm>,
) -> Result<Reply> {
    match state.db.create_genre(&form.name).await {
        Ok(_) => Ok(ctx.redirect("/admin", "Genre added successfully.")),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/genre/add", e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn edit_genre_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Genre, "/admin"));
    };
    let Some(genre) = state.db.genre(id).await? else {
        return Ok(ctx.missing(Kind::Genre, "/admin"));
    };
    let action = format!("/genre/{id}/edit");
    Ok(ctx.page("Edit genre", views::genre_form(&action, Some(&genre))))
}

pub(super) async fn edit_genre(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
    Form(form): Form<GenreForm>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Genre, "/admin"));
    };
    match state.db.update_genre(id, &form.name).await {
        Ok(_) => Ok(ctx.redirect("/admin", "Genre updated successfully.")),
        Err(e @ db::Error::NotFound(_)) => Ok(ctx.redirect("/admin", e.to_string())),
        Err(e) if e.is_user_facing() => {
            Ok(ctx.redirect(format!("/genre/{id}/edit"), e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn delete_genre_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Genre, "/admin"));
    };
    let Some(genre) = state.db.genre(id).await? else {
        return Ok(ctx.missing(Kind::Genre, "/admin"));
    };
    let action = format!("/genre/{id}/delete");
    Ok(ctx.page(
        "Delete genre",
        views::confirm_delete("genre", &genre.name, &action),
    ))
}

pub(super) async fn delete_genre(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Genre, "/admin"));
    };
    match state.db.delete_genre(id).await {
        Ok(_) => Ok(ctx.redirect("/admin", "Genre deleted successfully.")),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/admin", e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn albums(State(state): State<AppState>, Admin(ctx): Admin) -> Result<Reply> {
    let albums = state.db.album_views(state.db.all_albums().await?).await?;
    Ok(ctx.page("Albums", views::album_table(&albums)))
}

pub(super) async fn add_album_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
) -> Result<Reply> {
    let genres = state.db.all_genres().await?;
    if genres.is_empty() {
        return Ok(ctx.redirect("/genre/add", "Add a genre before adding albums."));
    }
    Ok(ctx.page(
        "Add album",
        views::album_form("/album/add", None, &genres),
    ))
}

pub(super) async fn add_album(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Form(form): Form<AlbumForm>,
) -> Result<Reply> {
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(invalid) => return Ok(ctx.redirect("/album/add", invalid.to_string())),
    };
    match state.db.create_album(draft).await {
        Ok(_) => Ok(ctx.redirect("/admin", "Album added successfully.")),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/album/add", e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn open_album(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    let Some(view) = state.db.album_view(id).await? else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    let title = view.album.name.clone();
    Ok(ctx.page(&title, views::album_details(&view)))
}

pub(super) async fn edit_album_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    let Some(album) = state.db.album(id).await? else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    let genres = state.db.all_genres().await?;
    let action = format!("/album/{id}/edit");
    Ok(ctx.page(
        "Edit album",
        views::album_form(&action, Some(&album), &genres),
    ))
}

pub(super) async fn edit_album(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
    Form(form): Form<AlbumForm>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    let back = format!("/album/{id}/edit");
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(invalid) => return Ok(ctx.redirect(back, invalid.to_string())),
    };
    match state.db.update_album(id, draft).await {
        Ok(_) => Ok(ctx.redirect("/admin", "Album updated successfully.")),
        Err(e @ db::Error::NotFound(_)) => Ok(ctx.redirect("/admin", e.to_string())),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect(back, e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn delete_album_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    let Some(album) = state.db.album(id).await? else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    let action = format!("/album/{id}/delete");
    Ok(ctx.page(
        "Delete album",
        views::confirm_delete("album", &album.name, &action),
    ))
}

pub(super) async fn delete_album(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Album, "/admin"));
    };
    match state.db.delete_album(id).await {
        Ok(_) => Ok(ctx.redirect("/admin", "Album deleted successfully.")),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/admin", e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn add_song_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Query(query): Query<AlbumQuery>,
) -> Result<Reply> {
    let albums = state.db.all_albums().await?;
    if albums.is_empty() {
        return Ok(ctx.redirect("/album/add", "Add an album before adding songs."));
    }
    let content = views::song_form("/song/add-song", None, &albums, query.album_id());
    Ok(ctx.page("Add song", content))
}

pub(super) async fn add_song(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Form(form): Form<SongForm>,
) -> Result<Reply> {
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(invalid) => return Ok(ctx.redirect("/song/add-song", invalid.to_string())),
    };
    match state.db.create_song(draft).await {
        Ok(song) => Ok(ctx.redirect(
            format!("/album/{}/open", song.album_id),
            "Song added successfully.",
        )),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/song/add-song", e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn open_song(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    let Some(view) = state.db.song_view(id).await? else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    let title = view.song.name.clone();
    Ok(ctx.page(&title, views::song_admin_details(&view)))
}

pub(super) async fn edit_song_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    let Some(song) = state.db.song(id).await? else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    let albums = state.db.all_albums().await?;
    let action = format!("/song/{id}/edit-song");
    Ok(ctx.page(
        "Edit song",
        views::song_form(&action, Some(&song), &albums, None),
    ))
}

pub(super) async fn edit_song(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
    Form(form): Form<SongForm>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    let back = format!("/song/{id}/edit-song");
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(invalid) => return Ok(ctx.redirect(back, invalid.to_string())),
    };
    match state.db.update_song(id, draft).await {
        Ok(song) => Ok(ctx.redirect(
            format!("/album/{}/open", song.album_id),
            "Song updated successfully.",
        )),
        Err(e @ db::Error::NotFound(_)) => Ok(ctx.redirect("/admin", e.to_string())),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect(back, e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn delete_song_page(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    let Some(song) = state.db.song(id).await? else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    let action = format!("/song/{id}/delete-song");
    Ok(ctx.page(
        "Delete song",
        views::confirm_delete("song", &song.name, &action),
    ))
}

pub(super) async fn delete_song(
    State(state): State<AppState>,
    Admin(ctx): Admin,
    Path(Id(id)): Path<Id>,
) -> Result<Reply> {
    let Some(id) = id else {
        return Ok(ctx.missing(Kind::Song, "/admin"));
    };
    match state.db.delete_song(id).await {
        Ok(_) => Ok(ctx.redirect("/admin", "Song deleted successfully.")),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/admin", e.to_string())),
        Err(e) => Err(e.into()),
    }
}
