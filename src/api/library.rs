use axum::{
    extract::{Path, Query, State},
    Form,
};

use super::{
    ctx::{Authenticated, Creator, Reply},
    views, AlbumQuery, AppState, Id, Result, SongForm,
};
use crate::{
    db::{self, Kind, PlaylistAdd},
    query::Search,
};

pub(super) async fn index(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Query(search): Query<Search>,
) -> Result<Reply> {
    if ctx.user.is_admin {
        return Ok(ctx.go("/admin"));
    }

    let albums = state.db.search_albums(&search).await?;
    let albums = state.db.album_views(albums).await?;
    Ok(ctx.page("Catalog", views::catalog(&albums, &search)))
}

pub(super) async fn playlist(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> Result<Reply> {
    let items = state.db.playlist_for_user(ctx.user.id).await?;
    Ok(ctx.page("Playlist", views::playlist(&items)))
}

pub(super) async fn add_to_playlist(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(Id(song_id)): Path<Id>,
) -> Result<Reply> {
    let Some(song_id) = song_id else {
        return Ok(ctx.missing(Kind::Song, "/"));
    };
    match state.db.add_to_playlist(ctx.user.id, song_id).await {
        Ok(PlaylistAdd::Added) => Ok(ctx.redirect("/", "Song added to playlist successfully.")),
        Ok(PlaylistAdd::AlreadyPresent) => {
            Ok(ctx.redirect("/", "Song is already in your playlist."))
        }
        Err(e @ db::Error::NotFound(Kind::Song)) => Ok(ctx.redirect("/", e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn song_details(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(Id(song_id)): Path<Id>,
) -> Result<Reply> {
    let Some(song_id) = song_id else {
        return Ok(ctx.missing(Kind::Song, "/"));
    };
    let Some(view) = state.db.song_view(song_id).await? else {
        return Ok(ctx.missing(Kind::Song, "/"));
    };
    let title = view.song.name.clone();
    Ok(ctx.page(&title, views::song_details(&view)))
}

/// Landing page for creators. Visiting it is what makes a user a creator.
pub(super) async fn creator(
    State(state): State<AppState>,
    Authenticated(mut ctx): Authenticated,
) -> Result<Reply> {
    let promoted = state.db.promote_to_creator(ctx.user.id).await?;
    ctx.user.is_creator = true;

    let content = views::creator_landing(&ctx.user, promoted);
    Ok(ctx.page("Creator", content))
}

pub(super) async fn upload_page(
    State(state): State<AppState>,
    Creator(ctx): Creator,
    Query(query): Query<AlbumQuery>,
) -> Result<Reply> {
    let albums = state.db.all_albums().await?;
    let content = views::song_form("/creator/upload", None, &albums, query.album_id());
    Ok(ctx.page("Upload a song", content))
}

pub(super) async fn upload(
    State(state): State<AppState>,
    Creator(ctx): Creator,
    Form(form): Form<SongForm>,
) -> Result<Reply> {
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(invalid) => return Ok(ctx.redirect("/creator/upload", invalid.to_string())),
    };

    match state.db.create_song(draft).await {
        Ok(song) => Ok(ctx.redirect(
            format!("/creator/upload?album_id={}", song.album_id),
            "Song added successfully.",
        )),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/creator/upload", e.to_string())),
        Err(e) => Err(e.into()),
    }
}
