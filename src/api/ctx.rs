//! Request-scoped context: the session, the resolved user, and the replies
//! that carry the session back to the client.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use maud::Markup;
use tracing::debug;

use super::{views, AppState, Fail};
use crate::{
    auth::{
        gate::{self, Denied},
        session::{self, Session},
    },
    db::{self, Kind},
    entity::user,
};

fn open_session(parts: &Parts, state: &AppState) -> Session {
    let jar = CookieJar::from_headers(&parts.headers);
    state
        .sessions
        .open(jar.get(session::COOKIE).map(|cookie| cookie.value()))
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Fail;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(open_session(parts, state))
    }
}

/// Everything a handler behind a gate gets to work with.
#[derive(Debug)]
pub struct Ctx {
    pub session: Session,
    pub user: user::Model,
}

impl Ctx {
    pub fn redirect(mut self, to: impl Into<String>, notice: impl Into<String>) -> Reply {
        self.session.flash(notice);
        Reply::redirect(self.session, to)
    }

    /// Redirect saying the requested row does not exist.
    pub fn missing(self, kind: Kind, to: impl Into<String>) -> Reply {
        self.redirect(to, db::Error::NotFound(kind).to_string())
    }

    /// Redirect without a notice.
    pub fn go(self, to: impl Into<String>) -> Reply {
        Reply::redirect(self.session, to)
    }

    pub fn page(self, title: &str, content: Markup) -> Reply {
        Reply::page(self.session, Some(&self.user), title, content)
    }
}

async fn gated(
    parts: &Parts,
    state: &AppState,
    check: fn(Option<user::Model>) -> Result<user::Model, Denied>,
) -> Result<Ctx, Response> {
    let mut session = open_session(parts, state);
    let user = state
        .db
        .current_user(&session)
        .await
        .map_err(|e| Fail::from(e).into_response())?;

    match check(user) {
        Ok(user) => Ok(Ctx { session, user }),
        Err(denied) => {
            debug!("{} {}: {denied:?}", parts.method, parts.uri);
            if denied == Denied::Anonymous {
                session.log_out();
            }
            session.flash(denied.notice());
            Err(Reply::redirect(session, denied.redirect_to()).into_response())
        }
    }
}

/// Any logged-in user.
pub struct Authenticated(pub Ctx);

/// Logged-in administrators.
pub struct Admin(pub Ctx);

/// Logged-in creators (and administrators).
pub struct Creator(pub Ctx);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        gated(parts, state, gate::require_authenticated).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        gated(parts, state, gate::require_admin).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Creator {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        gated(parts, state, gate::require_creator).await.map(Self)
    }
}

enum Body {
    Page(Markup),
    Redirect(String),
}

/// A rendered page or a redirect, sent together with the re-sealed session
/// cookie.
pub struct Reply {
    session: Session,
    body: Body,
}

impl Reply {
    pub fn redirect(session: Session, to: impl Into<String>) -> Self {
        Self {
            session,
            body: Body::Redirect(to.into()),
        }
    }

    /// Renders `content` inside the site layout; pending notices are shown
    /// here and dropped from the session.
    pub fn page(
        mut session: Session,
        user: Option<&user::Model>,
        title: &str,
        content: Markup,
    ) -> Self {
        let notices = session.take_notices();
        let body = views::layout(title, user, &notices, content);
        Self {
            session,
            body: Body::Page(body),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let token = match self.session.token() {
            Ok(token) => token,
            Err(e) => return Fail::from(e).into_response(),
        };
        let cookie = Cookie::build((session::COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        let jar = CookieJar::new().add(cookie);

        match self.body {
            Body::Page(markup) => (jar, Html(markup.into_string())).into_response(),
            Body::Redirect(to) => (jar, Redirect::to(&to)).into_response(),
        }
    }
}
