use std::{fs::File, io::Read, path::Path};

use camino::Utf8PathBuf;
use chrono::Duration;
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Deserialize, Default, Debug)]
pub struct Config {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub bootstrap: Bootstrap,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct System {
    /// Directory that will contain `songbook.sqlite`
    pub data_path: Utf8PathBuf,
    pub bind_addr: String,
}

impl Default for System {
    fn default() -> Self {
        Self {
            data_path: "data".into(),
            bind_addr: "localhost:5000".into(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Auth {
    pub session_secret: Option<String>,
    pub session_hours: u64,
    pub bcrypt_cost: u32,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            session_secret: None,
            session_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Deserialize, Default, Clone, Debug)]
pub struct Bootstrap {
    /// Password for the `admin` account created on first start.
    pub admin_password: Option<String>,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("auth.session_hours must be between 1 and {max}, got {0}", max = MAX_SESSION_HOURS)]
    SessionHours(u64),
}

const DEFAULT_CFG: &str = "songbook.toml";
const GENERATED_SECRET_LEN: usize = 48;
/// Ten years.
const MAX_SESSION_HOURS: u64 = 24 * 365 * 10;

impl Config {
    /// Reads the given file. Without a path, `songbook.toml` is used if it
    /// exists and built-in defaults otherwise.
    pub fn new(path: Option<String>) -> Result<Self, Error> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CFG).exists() => {
                info!("no config file path provided, using default ({DEFAULT_CFG})");
                DEFAULT_CFG.to_string()
            }
            None => {
                info!("no config file found, using built-in defaults");
                return Ok(Self::default());
            }
        };

        let mut fh = File::open(path)?;
        let mut data = String::new();
        fh.read_to_string(&mut data)?;

        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(data)?;
        config.session_ttl()?;
        Ok(config)
    }

    /// How long a session token stays valid.
    pub fn session_ttl(&self) -> Result<Duration, Error> {
        let hours = self.auth.session_hours;
        if !(1..=MAX_SESSION_HOURS).contains(&hours) {
            return Err(Error::SessionHours(hours));
        }
        i64::try_from(hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or(Error::SessionHours(hours))
    }

    /// The configured secret, or a random one that only lives as long as the
    /// process (all sessions end on restart).
    pub fn session_secret(&self) -> String {
        match self.auth.session_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                warn!("auth.session_secret not set, sessions will not survive a restart");
                rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(GENERATED_SECRET_LEN)
                    .map(char::from)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.system.bind_addr, "localhost:5000");
        assert_eq!(config.auth.session_hours, 24);
        assert_eq!(config.auth.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.bootstrap.admin_password.is_none());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::parse(
            r#"
            [system]
            data_path = "/var/lib/songbook"

            [auth]
            session_secret = "hunter2"

            [bootstrap]
            admin_password = "correct horse"
            "#,
        )
        .unwrap();
        assert_eq!(config.system.data_path, "/var/lib/songbook");
        assert_eq!(config.system.bind_addr, "localhost:5000");
        assert_eq!(config.session_secret(), "hunter2");
        assert_eq!(
            config.bootstrap.admin_password.as_deref(),
            Some("correct horse")
        );
    }

    #[test]
    fn missing_secret_is_generated() {
        let config = Config::default();
        let first = config.session_secret();
        assert_eq!(first.len(), GENERATED_SECRET_LEN);
        assert_ne!(first, config.session_secret());
    }

    #[test]
    fn session_hours_are_bounded() {
        let config = Config::parse("[auth]\nsession_hours = 12").unwrap();
        assert_eq!(config.session_ttl().unwrap(), Duration::hours(12));

        for hours in ["0", "9223372036854775807"] {
            let err = Config::parse(&format!("[auth]\nsession_hours = {hours}")).unwrap_err();
            assert!(matches!(err, Error::SessionHours(_)), "{hours}: {err}");
        }
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(matches!(
            Config::new(Some("/nonexistent/songbook.toml".into())),
            Err(Error::Io(_))
        ));
    }
}
