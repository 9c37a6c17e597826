mod common;

use common::{create_test_db, seed_album, song_draft};
use pretty_assertions::assert_eq;
use songbook::{
    db::{Error, Kind},
    query::Search,
    validate::{AlbumDraft, Invalid},
};

#[tokio::test]
async fn test_genre_delete_refused_while_albums_reference_it() {
    let db = create_test_db().await;
    let (genre_id, album_id) = seed_album(&db, "Jazz", "Blue Train", &[]).await;

    let err = db.delete_genre(genre_id).await.unwrap_err();
    assert!(matches!(err, Error::InUse { .. }));
    assert_eq!(
        err.to_string(),
        "Genre \"Jazz\" can not be deleted, it is still used by: Blue Train."
    );
    assert!(db.genre(genre_id).await.unwrap().is_some());

    db.delete_album(album_id).await.unwrap();
    db.delete_genre(genre_id).await.unwrap();
    assert!(db.genre(genre_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_album_delete_refused_while_it_has_songs() {
    let db = create_test_db().await;
    let (_, album_id) = seed_album(&db, "Jazz", "Blue Train", &["Locomotion"]).await;

    let err = db.delete_album(album_id).await.unwrap_err();
    assert!(matches!(err, Error::InUse { .. }));
    assert!(db.album(album_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_song_counts_follow_songs() {
    let db = create_test_db().await;
    let (_, album_id) = seed_album(&db, "Jazz", "Blue Train", &["Locomotion", "Moment's Notice"]).await;

    let view = db.album_view(album_id).await.unwrap().unwrap();
    assert_eq!(view.song_count(), 2);
    assert_eq!(view.genre_name(), "Jazz");

    let first = view.songs[0].id;
    db.delete_song(first).await.unwrap();
    let view = db.album_view(album_id).await.unwrap().unwrap();
    assert_eq!(view.song_count(), 1);
}

#[tokio::test]
async fn test_moving_a_song_moves_the_count() {
    let db = create_test_db().await;
    let (genre_id, from) = seed_album(&db, "Jazz", "Blue Train", &["Locomotion"]).await;
    let to = db
        .create_album(AlbumDraft::parse("Giant Steps", &genre_id.to_string(), "John Coltrane").unwrap())
        .await
        .unwrap()
        .id;

    let song = db.all_songs().await.unwrap().remove(0);
    db.update_song(song.id, song_draft("Locomotion", to)).await.unwrap();

    assert_eq!(db.album_view(from).await.unwrap().unwrap().song_count(), 0);
    assert_eq!(db.album_view(to).await.unwrap().unwrap().song_count(), 1);
}

#[tokio::test]
async fn test_missing_references_are_rejected() {
    let db = create_test_db().await;

    let err = db
        .create_album(AlbumDraft::parse("Blue Train", "99", "John Coltrane").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Invalid(Invalid::Reference("Genre"))));

    let err = db.create_song(song_draft("Locomotion", 99)).await.unwrap_err();
    assert_eq!(err.to_string(), "Album does not exist.");
    assert!(db.all_songs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_genre_updates() {
    let db = create_test_db().await;
    let genre = db.create_genre("Jaz").await.unwrap();

    let renamed = db.update_genre(genre.id, "Jazz").await.unwrap();
    assert_eq!(renamed.name, "Jazz");

    let err = db.update_genre(genre.id, &"x".repeat(51)).await.unwrap_err();
    assert_eq!(err.to_string(), "Genre name can not be greater than 50 characters.");
    assert_eq!(db.genre(genre.id).await.unwrap().unwrap().name, "Jazz");

    let err = db.update_genre(genre.id + 1, "Blues").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(Kind::Genre)));
}

#[tokio::test]
async fn test_search_by_album_and_song() {
    let db = create_test_db().await;
    seed_album(&db, "Jazz", "Blue Train", &["Locomotion", "Lazy Bird"]).await;
    seed_album(&db, "Rock", "Loco Live", &["Intro"]).await;

    let by_album = db.search_albums(&Search::new("album", "blue")).await.unwrap();
    let names: Vec<_> = by_album.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Blue Train"]);

    // two matching songs on one album still list it once
    let by_song = db.search_albums(&Search::new("song", "L")).await.unwrap();
    let names: Vec<_> = by_song.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Blue Train"]);

    let everything = db.search_albums(&Search::default()).await.unwrap();
    assert_eq!(everything.len(), 2);

    let nothing = db.search_albums(&Search::new("album", "Mingus")).await.unwrap();
    assert!(nothing.is_empty());
}
