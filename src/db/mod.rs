use std::fmt;

use camino::Utf8Path;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait};
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    auth::{self, credentials::Credentials, session::Session},
    entity::user,
    validate::Invalid,
};

pub mod catalog;
mod migration;
pub mod playlist;
pub mod users;

pub use catalog::{AlbumView, SongView};
pub use playlist::{PlaylistAdd, PlaylistItem};
pub use users::{LoginError, ProfileUpdate};

/// What a missing row was supposed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    User,
    Genre,
    Album,
    Song,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::User => "User",
            Kind::Genre => "Genre",
            Kind::Album => "Album",
            Kind::Song => "Song",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Db")]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    Auth(#[from] auth::Error),
    #[error(transparent)]
    Invalid(#[from] Invalid),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("{0} does not exist.")]
    NotFound(Kind),
    #[error("{what} can not be deleted, it is still used by: {}.", dependents.join(", "))]
    InUse {
        what: String,
        dependents: Vec<String>,
    },
    #[error("User with this username already exists. Please choose some other username.")]
    DuplicateUsername,
    #[error("Incorrect password.")]
    IncorrectPassword,
}

impl Error {
    /// Failures the user caused and can fix; everything else is a server fault.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Error::DbErr(_) | Error::Auth(_))
    }
}

#[derive(Debug)]
pub struct DB {
    connection: DatabaseConnection,
    credentials: Credentials,
}

impl DB {
    /// Opens (creating if needed) `songbook.sqlite` below `data_path`.
    pub async fn open(data_path: impl AsRef<Utf8Path>, credentials: Credentials) -> Result<Self, Error> {
        let path = data_path.as_ref();
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| DbErr::Custom(format!("creating {path}: {e}")))?;

        let db_url = format!("sqlite://{path}/songbook.sqlite?mode=rwc");
        Self::connect(&db_url, credentials).await
    }

    pub async fn connect(db_url: &str, credentials: Credentials) -> Result<Self, Error> {
        debug!("database URL: {db_url}");
        let mut opts = ConnectOptions::new(db_url);
        opts.sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);
        if db_url.contains(":memory:") {
            // every pooled connection would otherwise get its own empty database
            opts.max_connections(1).min_connections(1);
        }

        let connection = Database::connect(opts).await?;
        migration::Migrator::up(&connection, None).await?;
        info!("database ready");

        Ok(Self {
            connection,
            credentials,
        })
    }

    /// Resolves the caller behind a session; `None` for anonymous sessions and
    /// for sessions whose user has since disappeared.
    pub async fn current_user(&self, session: &Session) -> Result<Option<user::Model>, DbErr> {
        let Some(id) = session.user_id() else {
            return Ok(None);
        };
        user::Entity::find_by_id(id).one(&self.connection).await
    }
}
