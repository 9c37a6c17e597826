//! Shared fixtures: an in-memory database and a router wired to it.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use songbook::{
    api::{router, AppState},
    auth::{credentials::Credentials, session::SessionKeys},
    config::Bootstrap,
    db::DB,
    validate::{AlbumDraft, SongDraft},
};
use tower::util::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin-test-password";

/// Fresh database with migrations applied. Low bcrypt cost keeps tests fast.
pub async fn create_test_db() -> DB {
    DB::connect("sqlite::memory:", Credentials::new(4))
        .await
        .unwrap()
}

pub async fn create_test_app() -> (Router, AppState) {
    let db = create_test_db().await;
    db.bootstrap_admin(&Bootstrap {
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    })
    .await
    .unwrap();

    let state = AppState::new(db, SessionKeys::new(b"test-secret", Duration::hours(1)));
    (router(state.clone()), state)
}

/// A genre, an album in it and `songs` songs on that album.
pub async fn seed_album(db: &DB, genre: &str, album: &str, songs: &[&str]) -> (i32, i32) {
    let genre = db.create_genre(genre).await.unwrap();
    let album = db
        .create_album(AlbumDraft::parse(album, &genre.id.to_string(), "Some Artist").unwrap())
        .await
        .unwrap();
    for song in songs {
        db.create_song(song_draft(song, album.id)).await.unwrap();
    }
    (genre.id, album.id)
}

pub fn song_draft(name: &str, album_id: i32) -> SongDraft {
    SongDraft::parse(name, &album_id.to_string(), "", "00:03:30", "2020-01-01").unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::get(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: &Router, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("no Location header")
        .to_str()
        .unwrap()
}

/// The `name=value` part of the session cookie set by a response.
pub fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("no Set-Cookie header")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let form = format!("username={username}&password={password}");
    let response = post_form(app, "/login", &form, None).await;
    assert_eq!(location(&response), "/");
    session_cookie(&response)
}
