use maud::{html, Markup, DOCTYPE};

use crate::{
    db::{AlbumView, PlaylistItem, SongView},
    entity::{album, genre, song, user},
    query::Search,
};

const DURATION_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn duration(song: &song::Model) -> String {
    song.duration.format(DURATION_FORMAT).to_string()
}

fn created_on(song: &song::Model) -> String {
    song.created_on.format(DATE_FORMAT).to_string()
}

pub fn layout(title: &str, user: Option<&user::Model>, notices: &[String], content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) " · Songbook" }
            }
            body {
                nav {
                    @match user {
                        Some(user) => {
                            @if user.is_admin {
                                a href="/admin" { "Dashboard" } " | "
                                a href="/genres" { "Genres" } " | "
                                a href="/albums" { "Albums" } " | "
                            } @else {
                                a href="/" { "Catalog" } " | "
                                a href="/playlist" { "Playlist" } " | "
                                a href="/creator" { "Creator" } " | "
                            }
                            a href="/profile" { (user.display_name()) } " | "
                            a href="/logout" { "Logout" }
                        }
                        None => {
                            a href="/login" { "Login" } " | "
                            a href="/register" { "Register" }
                        }
                    }
                }
                @if !notices.is_empty() {
                    ul class="notices" {
                        @for notice in notices {
                            li { (notice) }
                        }
                    }
                }
                h1 { (title) }
                (content)
            }
        }
    }
}

pub fn login_form() -> Markup {
    html! {
        form method="post" action="/login" {
            label { "Username " input type="text" name="username"; }
            label { "Password " input type="password" name="password"; }
            button type="submit" { "Login" }
        }
        p { "No account yet? " a href="/register" { "Register" } }
    }
}

pub fn register_form() -> Markup {
    html! {
        form method="post" action="/register" {
            label { "Username " input type="text" name="username"; }
            label { "Name " input type="text" name="name"; }
            label { "Password " input type="password" name="password"; }
            button type="submit" { "Register" }
        }
    }
}

pub fn profile_form(user: &user::Model) -> Markup {
    html! {
        form method="post" action="/profile" {
            label { "Username " input type="text" name="username" value=(user.username); }
            label { "Name " input type="text" name="name" value=[user.name.as_deref()]; }
            label { "New password " input type="password" name="password"; }
            label { "Current password " input type="password" name="cpassword"; }
            button type="submit" { "Update" }
        }
    }
}

fn song_rows(songs: &[song::Model], playlist_buttons: bool) -> Markup {
    html! {
        table {
            tr { th { "Song" } th { "Duration" } th { "Created" } th {} }
            @for song in songs {
                tr {
                    td { (song.name) }
                    td { (duration(song)) }
                    td { (created_on(song)) }
                    td {
                        a href={ "/song/" (song.id) "/lyrics" } { "Details" }
                        @if playlist_buttons {
                            form method="post" action={ "/playlist/" (song.id) "/add" } {
                                button type="submit" { "Add to playlist" }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn catalog(albums: &[AlbumView], search: &Search) -> Markup {
    let parameter = search.parameter.as_deref().unwrap_or("album");
    html! {
        form method="get" action="/" {
            select name="parameter" {
                option value="album" selected[parameter == "album"] { "Album" }
                option value="song" selected[parameter == "song"] { "Song" }
            }
            input type="search" name="search" value=[search.search.as_deref()];
            button type="submit" { "Search" }
        }
        @if albums.is_empty() {
            p { "Nothing found." }
        }
        @for view in albums {
            section {
                h2 { (view.album.name) }
                p { (view.album.artist) " · " (view.genre_name()) " · " (view.song_count()) " songs" }
                (song_rows(&view.songs, true))
            }
        }
    }
}

pub fn playlist(items: &[PlaylistItem]) -> Markup {
    html! {
        @if items.is_empty() {
            p { "Your playlist is empty." }
        } @else {
            (song_rows(&items.iter().map(|item| item.song.clone()).collect::<Vec<_>>(), false))
        }
    }
}

pub fn song_details(view: &SongView) -> Markup {
    html! {
        dl {
            dt { "Album" } dd { (view.album.name) " by " (view.album.artist) }
            dt { "Duration" } dd { (duration(&view.song)) }
            dt { "Created" } dd { (created_on(&view.song)) }
            dt { "Lyrics" }
            dd {
                @match &view.song.lyrics_path {
                    Some(path) => { code { (path) } }
                    None => { "none" }
                }
            }
        }
    }
}

pub fn creator_landing(user: &user::Model, newly_promoted: bool) -> Markup {
    html! {
        @if newly_promoted {
            p { "Welcome aboard, " (user.display_name()) ", you are now a creator." }
        }
        p { "Creators can add their own songs to existing albums." }
        a href="/creator/upload" { "Upload a song" }
    }
}

pub fn dashboard(
    users: &[user::Model],
    creator_count: u64,
    genres: &[genre::Model],
    albums: &[AlbumView],
    songs: &[song::Model],
) -> Markup {
    html! {
        ul {
            li { (users.len()) " users, " (creator_count) " creators" }
            li { (genres.len()) " genres" }
            li { (albums.len()) " albums" }
            li { (songs.len()) " songs" }
        }
        h2 { "Users" }
        table {
            tr { th { "Username" } th { "Name" } th { "Admin" } th { "Creator" } }
            @for user in users {
                tr {
                    td { (user.username) }
                    td { (user.name.as_deref().unwrap_or("")) }
                    td { @if user.is_admin { "yes" } }
                    td { @if user.is_creator { "yes" } }
                }
            }
        }
        (album_table(albums))
    }
}

pub fn genres(genres: &[genre::Model], albums: &[AlbumView]) -> Markup {
    html! {
        a href="/genre/add" { "Add genre" }
        table {
            tr { th { "Genre" } th { "Albums" } th {} }
            @for genre in genres {
                tr {
                    td { (genre.name) }
                    td { (albums.iter().filter(|view| view.album.genre_id == genre.id).count()) }
                    td {
                        a href={ "/genre/" (genre.id) "/edit" } { "Edit" } " "
                        a href={ "/genre/" (genre.id) "/delete" } { "Delete" }
                    }
                }
            }
        }
    }
}

pub fn genre_form(action: &str, genre: Option<&genre::Model>) -> Markup {
    html! {
        form method="post" action=(action) {
            label { "Name " input type="text" name="name" value=[genre.map(|g| g.name.as_str())]; }
            button type="submit" { "Save" }
        }
    }
}

pub fn confirm_delete(what: &str, name: &str, action: &str) -> Markup {
    html! {
        p { "Delete " (what) " " strong { (name) } "?" }
        form method="post" action=(action) {
            button type="submit" { "Delete" }
        }
    }
}

pub fn album_table(albums: &[AlbumView]) -> Markup {
    html! {
        h2 { "Albums" }
        a href="/album/add" { "Add album" }
        table {
            tr { th { "Album" } th { "Artist" } th { "Genre" } th { "Songs" } th {} }
            @for view in albums {
                tr {
                    td { a href={ "/album/" (view.album.id) "/open" } { (view.album.name) } }
                    td { (view.album.artist) }
                    td { (view.genre_name()) }
                    td { (view.song_count()) }
                    td {
                        a href={ "/album/" (view.album.id) "/edit" } { "Edit" } " "
                        a href={ "/album/" (view.album.id) "/delete" } { "Delete" }
                    }
                }
            }
        }
    }
}

pub fn album_form(action: &str, album: Option<&album::Model>, genres: &[genre::Model]) -> Markup {
    let selected = album.map(|a| a.genre_id);
    html! {
        form method="post" action=(action) {
            label { "Name " input type="text" name="name" value=[album.map(|a| a.name.as_str())]; }
            label {
                "Genre "
                select name="genre_id" {
                    @for genre in genres {
                        option value=(genre.id) selected[selected == Some(genre.id)] { (genre.name) }
                    }
                }
            }
            label { "Artist " input type="text" name="artist" value=[album.map(|a| a.artist.as_str())]; }
            button type="submit" { "Save" }
        }
    }
}

pub fn album_details(view: &AlbumView) -> Markup {
    html! {
        p { (view.album.artist) " · " (view.genre_name()) " · " (view.song_count()) " songs" }
        a href={ "/song/add-song?album_id=" (view.album.id) } { "Add song" }
        table {
            tr { th { "Song" } th { "Duration" } th { "Created" } th {} }
            @for song in &view.songs {
                tr {
                    td { a href={ "/song/" (song.id) "/open-song" } { (song.name) } }
                    td { (duration(song)) }
                    td { (created_on(song)) }
                    td {
                        a href={ "/song/" (song.id) "/edit-song" } { "Edit" } " "
                        a href={ "/song/" (song.id) "/delete-song" } { "Delete" }
                    }
                }
            }
        }
    }
}

pub fn song_form(
    action: &str,
    song: Option<&song::Model>,
    albums: &[album::Model],
    selected_album: Option<i32>,
) -> Markup {
    let selected = song.map(|s| s.album_id).or(selected_album);
    let duration = song.map(duration);
    let created_on = song.map(created_on);
    html! {
        form method="post" action=(action) {
            label { "Name " input type="text" name="name" value=[song.map(|s| s.name.as_str())]; }
            label {
                "Album "
                select name="album_id" {
                    @for album in albums {
                        option value=(album.id) selected[selected == Some(album.id)] { (album.name) " (" (album.artist) ")" }
                    }
                }
            }
            label { "Duration (HH:MM:SS) " input type="text" name="duration" value=[duration]; }
            label { "Created (YYYY-MM-DD) " input type="date" name="created_on" value=[created_on]; }
            label {
                "Lyrics path "
                input type="text" name="lyrics_path" value=[song.and_then(|s| s.lyrics_path.as_deref())];
            }
            button type="submit" { "Save" }
        }
    }
}

pub fn song_admin_details(view: &SongView) -> Markup {
    html! {
        (song_details(view))
        a href={ "/song/" (view.song.id) "/edit-song" } { "Edit" } " "
        a href={ "/song/" (view.song.id) "/delete-song" } { "Delete" } " "
        a href={ "/album/" (view.album.id) "/open" } { "Back to album" }
    }
}
