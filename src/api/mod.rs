use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Deserializer};
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{debug, error, info, Span};

use crate::{
    auth::session::SessionKeys,
    db::DB,
    validate::{Invalid, SongDraft},
};

mod account;
mod admin;
pub mod ctx;
mod library;
pub mod views;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DB>,
    pub sessions: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(db: DB, sessions: SessionKeys) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(sessions),
        }
    }
}

/// Anything a handler did not expect. Logged and answered with a 500; the
/// failures users cause are turned into redirects before they get here.
#[derive(Debug)]
pub struct Fail(anyhow::Error);

impl<E> From<E> for Fail
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for Fail {
    fn into_response(self) -> Response {
        error!("{:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

pub type Result<T, E = Fail> = std::result::Result<T, E>;

/// Song form shared by the admin and creator pages.
#[derive(Debug, Deserialize)]
pub(crate) struct SongForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    album_id: String,
    #[serde(default)]
    lyrics_path: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    created_on: String,
}

impl SongForm {
    fn draft(&self) -> Result<SongDraft, Invalid> {
        SongDraft::parse(
            &self.name,
            &self.album_id,
            &self.lyrics_path,
            &self.duration,
            &self.created_on,
        )
    }
}

/// A row id taken from the path. Segments that are not an `i32` parse to
/// `None`, which handlers answer like any other missing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Id(Option<i32>);

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self(raw.parse().ok()))
    }
}

/// `?album_id=` preselecting an album on song forms; junk is ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlbumQuery {
    album_id: Option<String>,
}

impl AlbumQuery {
    fn album_id(&self) -> Option<i32> {
        self.album_id.as_deref().and_then(|id| id.parse().ok())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(account::login_page).post(account::login))
        .route(
            "/register",
            get(account::register_page).post(account::register),
        )
        .route("/logout", get(account::logout))
        .route("/profile", get(account::profile_page).post(account::profile))
        .route("/", get(library::index))
        .route("/playlist", get(library::playlist))
        .route("/playlist/:song_id/add", post(library::add_to_playlist))
        .route("/song/:song_id/lyrics", get(library::song_details))
        .route("/creator", get(library::creator))
        .route(
            "/creator/upload",
            get(library::upload_page).post(library::upload),
        )
        .route("/admin", get(admin::dashboard))
        .route("/genres", get(admin::genres))
        .route("/genre/add", get(admin::add_genre_page).post(admin::add_genre))
        .route(
            "/genre/:id/edit",
            get(admin::edit_genre_page).post(admin::edit_genre),
        )
        .route(
            "/genre/:id/delete",
            get(admin::delete_genre_page).post(admin::delete_genre),
        )
        .route("/albums", get(admin::albums))
        .route("/album/add", get(admin::add_album_page).post(admin::add_album))
        .route("/album/:id/open", get(admin::open_album))
        .route(
            "/album/:id/edit",
            get(admin::edit_album_page).post(admin::edit_album),
        )
        .route(
            "/album/:id/delete",
            get(admin::delete_album_page).post(admin::delete_album),
        )
        .route(
            "/song/add-song",
            get(admin::add_song_page).post(admin::add_song),
        )
        .route("/song/:id/open-song", get(admin::open_song))
        .route(
            "/song/:id/edit-song",
            get(admin::edit_song_page).post(admin::edit_song),
        )
        .route(
            "/song/:id/delete-song",
            get(admin::delete_song_page).post(admin::delete_song),
        )
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .on_request(|req: &Request<Body>, _span: &Span| {
                    debug!("{} {}", req.method(), req.uri());
                })
                .on_response(|response: &Response, latency: Duration, _span: &Span| {
                    debug!("{} in {latency:?}", response.status());
                })
                .on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        error!("{error:?}");
                    },
                ),
        )
}

pub async fn serve(state: AppState, addr: impl AsRef<str>) -> std::io::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr.as_ref()).await?;
    info!("Running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("could not listen for ctrl-c: {e}");
        // without a signal source, run until killed
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use serde::de::{value::StrDeserializer, IntoDeserializer};

    use super::*;

    fn id(raw: &str) -> Id {
        let deserializer: StrDeserializer<'_, serde::de::value::Error> = raw.into_deserializer();
        Id::deserialize(deserializer).unwrap()
    }

    #[test]
    fn path_ids() {
        assert_eq!(id("42"), Id(Some(42)));
        assert_eq!(id("abc"), Id(None));
        assert_eq!(id("99999999999"), Id(None));
        assert_eq!(id(""), Id(None));
    }
}
