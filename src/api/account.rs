use axum::{extract::State, Form};
use serde::Deserialize;
use tracing::info;

use super::{
    ctx::{Authenticated, Reply},
    views, AppState, Result,
};
use crate::{auth::session::Session, db::ProfileUpdate};

#[derive(Debug, Deserialize)]
pub(super) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProfileForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    cpassword: String,
}

pub(super) async fn login_page(session: Session) -> Reply {
    Reply::page(session, None, "Login", views::login_form())
}

pub(super) async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Reply> {
    match state.db.authenticate(&form.username, &form.password).await {
        Ok(user) => {
            info!("user {} logged in", user.id);
            session.log_in(user.id);
            Ok(Reply::redirect(session, "/"))
        }
        Err(e) if e.is_user_facing() => {
            session.log_out();
            session.flash(e.to_string());
            Ok(Reply::redirect(session, "/login"))
        }
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn register_page(session: Session) -> Reply {
    Reply::page(session, None, "Register", views::register_form())
}

pub(super) async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Reply> {
    match state
        .db
        .register(&form.username, &form.password, &form.name)
        .await
    {
        Ok(_) => {
            session.flash("User successfully registered.");
            Ok(Reply::redirect(session, "/login"))
        }
        Err(e) if e.is_user_facing() => {
            session.flash(e.to_string());
            Ok(Reply::redirect(session, "/register"))
        }
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn logout(mut session: Session) -> Reply {
    session.log_out();
    Reply::redirect(session, "/login")
}

pub(super) async fn profile_page(Authenticated(ctx): Authenticated) -> Reply {
    let content = views::profile_form(&ctx.user);
    ctx.page("Profile", content)
}

pub(super) async fn profile(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Form(form): Form<ProfileForm>,
) -> Result<Reply> {
    let update = ProfileUpdate {
        username: form.username,
        name: form.name,
        password: form.password,
        current_password: form.cpassword,
    };
    match state.db.update_profile(ctx.user.id, &update).await {
        Ok(_) => Ok(ctx.redirect("/profile", "Profile updated successfully.")),
        Err(e) if e.is_user_facing() => Ok(ctx.redirect("/profile", e.to_string())),
        Err(e) => Err(e.into()),
    }
}
