//! Field rules applied to submitted forms before anything is written.
//!
//! Every failure is an [`Invalid`] whose `Display` text is the notice shown to
//! the user on the form it came from.

use chrono::{NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

/// Upper bound for names (genre, album, artist, song, username).
pub const MAX_NAME_LEN: usize = 50;

/// Upper bound for the stored lyrics path.
pub const MAX_PATH_LEN: usize = 255;

/// bcrypt ignores everything past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

const DURATION_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Invalid {
    #[error("{0} can not be empty.")]
    Empty(&'static str),
    #[error("{0} can not be greater than {max} characters.", max = MAX_NAME_LEN)]
    TooLong(&'static str),
    #[error("Lyrics path can not be greater than {max} characters.", max = MAX_PATH_LEN)]
    PathTooLong,
    #[error("{0} can not be longer than {max} bytes.", max = MAX_PASSWORD_BYTES)]
    PasswordTooLong(&'static str),
    #[error("Invalid song duration format, expected HH:MM:SS.")]
    Duration,
    #[error("Invalid date of creation format, expected YYYY-MM-DD.")]
    Date,
    #[error("{0} does not exist.")]
    Reference(&'static str),
}

/// Non-empty and at most [`MAX_NAME_LEN`] characters.
pub fn name(field: &'static str, value: &str) -> Result<String, Invalid> {
    let value = required(field, value)?;
    // counted in characters, not bytes
    if value.chars().count() > MAX_NAME_LEN {
        return Err(Invalid::TooLong(field));
    }
    Ok(value.to_string())
}

pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, Invalid> {
    if value.is_empty() {
        return Err(Invalid::Empty(field));
    }
    Ok(value)
}

/// Non-empty and short enough for bcrypt to see all of it.
pub fn password<'a>(field: &'static str, value: &'a str) -> Result<&'a str, Invalid> {
    let value = required(field, value)?;
    if value.len() > MAX_PASSWORD_BYTES {
        return Err(Invalid::PasswordTooLong(field));
    }
    Ok(value)
}

/// Optional path; an empty submission means "no path".
pub fn lyrics_path(value: &str) -> Result<Option<String>, Invalid> {
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > MAX_PATH_LEN {
        return Err(Invalid::PathTooLong);
    }
    Ok(Some(value.to_string()))
}

/// `HH:MM:SS` on a 24 hour clock.
pub fn duration(value: &str) -> Result<NaiveTime, Invalid> {
    let time = NaiveTime::parse_from_str(value, DURATION_FORMAT).map_err(|_| Invalid::Duration)?;
    // chrono reads second 60 as a leap second
    if time.nanosecond() >= 1_000_000_000 {
        return Err(Invalid::Duration);
    }
    Ok(time)
}

pub fn creation_date(value: &str) -> Result<NaiveDate, Invalid> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| Invalid::Date)
}

/// An id picked from a form; unparsable input counts as a missing reference.
pub fn reference(field: &'static str, value: &str) -> Result<i32, Invalid> {
    let value = required(field, value)?;
    value.trim().parse().map_err(|_| Invalid::Reference(field))
}

/// A validated album form. The genre is only known to be a well-formed id;
/// whether it exists is checked when the album is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumDraft {
    pub name: String,
    pub genre_id: i32,
    pub artist: String,
}

impl AlbumDraft {
    pub fn parse(name: &str, genre_id: &str, artist: &str) -> Result<Self, Invalid> {
        Ok(Self {
            name: self::name("Album name", name)?,
            genre_id: reference("Genre", genre_id)?,
            artist: self::name("Artist name", artist)?,
        })
    }
}

/// A validated song form; the album is checked on write like
/// [`AlbumDraft::genre_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDraft {
    pub name: String,
    pub album_id: i32,
    pub lyrics_path: Option<String>,
    pub duration: NaiveTime,
    pub created_on: NaiveDate,
}

impl SongDraft {
    pub fn parse(
        name: &str,
        album_id: &str,
        lyrics_path: &str,
        duration: &str,
        created_on: &str,
    ) -> Result<Self, Invalid> {
        Ok(Self {
            name: self::name("Song name", name)?,
            album_id: reference("Album", album_id)?,
            lyrics_path: self::lyrics_path(lyrics_path)?,
            duration: self::duration(duration)?,
            created_on: creation_date(created_on)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_boundaries() {
        let fifty = "a".repeat(50);
        assert_eq!(name("Genre name", &fifty), Ok(fifty.clone()));

        let err = name("Genre name", &"a".repeat(51)).unwrap_err();
        assert_eq!(err, Invalid::TooLong("Genre name"));
        assert_eq!(
            err.to_string(),
            "Genre name can not be greater than 50 characters."
        );

        let err = name("Genre name", "").unwrap_err();
        assert_eq!(err, Invalid::Empty("Genre name"));
        assert_eq!(err.to_string(), "Genre name can not be empty.");
    }

    #[test]
    fn name_counts_characters() {
        let fifty = "é".repeat(50);
        assert!(fifty.len() > 50);
        assert!(name("Album name", &fifty).is_ok());
    }

    #[test]
    fn messages_name_the_field() {
        assert_eq!(
            name("Artist name", "").unwrap_err().to_string(),
            "Artist name can not be empty."
        );
        assert_eq!(
            name("Album name", &"x".repeat(51)).unwrap_err().to_string(),
            "Album name can not be greater than 50 characters."
        );
    }

    #[test]
    fn durations() {
        assert_eq!(
            duration("12:30:00"),
            Ok(NaiveTime::from_hms_opt(12, 30, 0).unwrap())
        );
        assert_eq!(
            duration("23:59:59"),
            Ok(NaiveTime::from_hms_opt(23, 59, 59).unwrap())
        );
        assert_eq!(duration("25:00:00"), Err(Invalid::Duration));
        assert_eq!(duration("12:60:00"), Err(Invalid::Duration));
        assert_eq!(duration("12:30:60"), Err(Invalid::Duration));
        assert_eq!(duration("bad"), Err(Invalid::Duration));
        assert_eq!(duration(""), Err(Invalid::Duration));
    }

    #[test]
    fn dates() {
        assert_eq!(
            creation_date("2023-07-14"),
            Ok(NaiveDate::from_ymd_opt(2023, 7, 14).unwrap())
        );
        assert_eq!(creation_date("2023-02-30"), Err(Invalid::Date));
        assert_eq!(creation_date("14/07/2023"), Err(Invalid::Date));
    }

    #[test]
    fn references() {
        assert_eq!(reference("Album", "7"), Ok(7));
        assert_eq!(reference("Album", ""), Err(Invalid::Empty("Album")));
        assert_eq!(reference("Album", "seven"), Err(Invalid::Reference("Album")));
    }

    #[test]
    fn album_drafts() {
        let draft = AlbumDraft::parse("Blue Train", "3", "John Coltrane").unwrap();
        assert_eq!(
            draft,
            AlbumDraft {
                name: "Blue Train".into(),
                genre_id: 3,
                artist: "John Coltrane".into(),
            }
        );
        assert_eq!(
            AlbumDraft::parse("Blue Train", "3", ""),
            Err(Invalid::Empty("Artist name"))
        );
        assert_eq!(
            AlbumDraft::parse("Blue Train", "", "John Coltrane"),
            Err(Invalid::Empty("Genre"))
        );
    }

    #[test]
    fn song_drafts() {
        let draft = SongDraft::parse("Locomotion", "1", "", "00:07:14", "1957-09-15").unwrap();
        assert_eq!(draft.album_id, 1);
        assert_eq!(draft.lyrics_path, None);
        assert_eq!(draft.duration, NaiveTime::from_hms_opt(0, 7, 14).unwrap());

        assert_eq!(
            SongDraft::parse("Locomotion", "1", "", "7:14", "1957-09-15"),
            Err(Invalid::Duration)
        );
        assert_eq!(
            SongDraft::parse("Locomotion", "1", "", "00:07:14", "15.09.1957"),
            Err(Invalid::Date)
        );
        assert_eq!(
            SongDraft::parse("", "1", "", "00:07:14", "1957-09-15"),
            Err(Invalid::Empty("Song name"))
        );
    }

    #[test]
    fn passwords() {
        let longest = "p".repeat(72);
        assert_eq!(password("Password", &longest), Ok(longest.as_str()));
        assert_eq!(password("Password", ""), Err(Invalid::Empty("Password")));

        let err = password("Password", &"p".repeat(73)).unwrap_err();
        assert_eq!(err, Invalid::PasswordTooLong("Password"));
        assert_eq!(err.to_string(), "Password can not be longer than 72 bytes.");
        // bytes, not characters
        assert!(password("Password", &"é".repeat(37)).is_err());
    }

    #[test]
    fn lyrics_paths() {
        assert_eq!(lyrics_path(""), Ok(None));
        assert_eq!(
            lyrics_path("lyrics/song.txt"),
            Ok(Some("lyrics/song.txt".to_string()))
        );
        assert_eq!(lyrics_path(&"p".repeat(256)), Err(Invalid::PathTooLong));
    }
}
