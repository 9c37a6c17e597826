//! Signed, cookie-borne session state: who is logged in plus the one-shot
//! notices waiting to be shown on the next rendered page.

use std::{fmt, sync::Arc};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Error;

pub const COOKIE: &str = "songbook_session";

/// Pending notices kept per session; older ones are dropped first.
pub const MAX_NOTICES: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<i32>,
    #[serde(default)]
    notices: Vec<String>,
    iat: i64,
    exp: i64,
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Anything that does not verify (forged, expired, garbage) opens as an
    /// empty session.
    pub fn open(self: &Arc<Self>, token: Option<&str>) -> Session {
        let claims = token.and_then(|token| {
            decode::<Claims>(token, &self.decoding, &Validation::default())
                .map(|data| data.claims)
                .map_err(|e| debug!("discarding session token: {e}"))
                .ok()
        });

        let (user_id, notices) = claims
            .map(|claims| (claims.sub, claims.notices))
            .unwrap_or_default();

        Session {
            keys: Arc::clone(self),
            user_id,
            notices,
        }
    }

    fn seal(&self, session: &Session) -> Result<String, Error> {
        let now = Utc::now();
        let expires = now.checked_add_signed(self.ttl).ok_or(Error::Expiry)?;
        let claims = Claims {
            sub: session.user_id,
            notices: session.notices.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    keys: Arc<SessionKeys>,
    user_id: Option<i32>,
    notices: Vec<String>,
}

impl Session {
    pub fn user_id(&self) -> Option<i32> {
        self.user_id
    }

    pub fn log_in(&mut self, user_id: i32) {
        self.user_id = Some(user_id);
    }

    /// Forgets the user; pending notices survive.
    pub fn log_out(&mut self) {
        self.user_id = None;
    }

    /// Queues a notice for the next rendered page. Repeating the newest
    /// pending notice is a no-op, and at most [`MAX_NOTICES`] are kept.
    pub fn flash(&mut self, notice: impl Into<String>) {
        let notice = notice.into();
        if self.notices.last() == Some(&notice) {
            return;
        }
        if self.notices.len() == MAX_NOTICES {
            self.notices.remove(0);
        }
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// The signed token to hand back to the client.
    pub fn token(&self) -> Result<String, Error> {
        self.keys.seal(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str) -> Arc<SessionKeys> {
        Arc::new(SessionKeys::new(secret.as_bytes(), Duration::hours(1)))
    }

    #[test]
    fn round_trips_user_and_notices() {
        let keys = keys("secret");
        let mut session = keys.open(None);
        assert_eq!(session.user_id(), None);

        session.log_in(42);
        session.flash("Genre added successfully.");
        let token = session.token().unwrap();

        let mut reopened = keys.open(Some(&token));
        assert_eq!(reopened.user_id(), Some(42));
        assert_eq!(reopened.take_notices(), vec!["Genre added successfully."]);
        assert!(reopened.take_notices().is_empty());
    }

    #[test]
    fn foreign_or_garbage_tokens_open_empty() {
        let mut session = keys("secret").open(None);
        session.log_in(1);
        let token = session.token().unwrap();

        assert_eq!(keys("other secret").open(Some(&token)).user_id(), None);
        assert_eq!(keys("secret").open(Some("garbage")).user_id(), None);
    }

    #[test]
    fn expired_tokens_open_empty() {
        let keys = keys("secret");
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: Some(1),
            notices: vec![],
            iat: past.timestamp(),
            exp: (past + Duration::minutes(5)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert_eq!(keys.open(Some(&token)).user_id(), None);
    }

    #[test]
    fn log_out_keeps_notices() {
        let mut session = keys("secret").open(None);
        session.log_in(3);
        session.flash("bye");
        session.log_out();
        assert_eq!(session.user_id(), None);
        assert_eq!(session.take_notices(), vec!["bye"]);
    }

    #[test]
    fn repeated_notices_are_kept_once() {
        let mut session = keys("secret").open(None);
        for _ in 0..40 {
            session.flash("You are not authorised to view this page.");
        }
        assert_eq!(
            session.take_notices(),
            vec!["You are not authorised to view this page."]
        );
    }

    #[test]
    fn pending_notices_are_capped() {
        let keys = keys("secret");
        let mut session = keys.open(None);
        for n in 0..40 {
            session.flash(format!("notice {n}"));
        }
        let token = session.token().unwrap();

        let notices = keys.open(Some(&token)).take_notices();
        assert_eq!(notices.len(), MAX_NOTICES);
        assert_eq!(notices.first().map(String::as_str), Some("notice 35"));
        assert_eq!(notices.last().map(String::as_str), Some("notice 39"));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let keys = Arc::new(SessionKeys::new(b"secret", Duration::MAX));
        assert!(matches!(keys.open(None).token(), Err(Error::Expiry)));
    }
}
