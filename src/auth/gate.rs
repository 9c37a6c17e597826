//! Capability checks run before a handler. They are plain functions of the
//! resolved user so the HTTP layer only decides where to send a refusal.

use crate::entity::user;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    /// No valid session.
    Anonymous,
    NotAdmin,
    NotCreator,
}

impl Denied {
    pub fn notice(&self) -> &'static str {
        match self {
            Denied::Anonymous => "You need to login first.",
            Denied::NotAdmin => "You are not authorised to view this page.",
            Denied::NotCreator => "You need to become a creator first.",
        }
    }

    /// Where the refused caller is sent.
    pub fn redirect_to(&self) -> &'static str {
        match self {
            Denied::Anonymous => "/login",
            Denied::NotAdmin => "/",
            Denied::NotCreator => "/creator",
        }
    }
}

pub fn require_authenticated(user: Option<user::Model>) -> Result<user::Model, Denied> {
    user.ok_or(Denied::Anonymous)
}

pub fn require_admin(user: Option<user::Model>) -> Result<user::Model, Denied> {
    let user = require_authenticated(user)?;
    if !user.is_admin {
        return Err(Denied::NotAdmin);
    }
    Ok(user)
}

/// Creators, and administrators who may do anything a creator can.
pub fn require_creator(user: Option<user::Model>) -> Result<user::Model, Denied> {
    let user = require_authenticated(user)?;
    if !(user.is_creator || user.is_admin) {
        return Err(Denied::NotCreator);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool, is_creator: bool) -> Option<user::Model> {
        Some(user::Model {
            id: 1,
            username: "alice".into(),
            passhash: String::new(),
            name: None,
            is_admin,
            is_creator,
        })
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        for gate in [require_authenticated, require_admin, require_creator] {
            let denied = gate(None).unwrap_err();
            assert_eq!(denied, Denied::Anonymous);
            assert_eq!(denied.redirect_to(), "/login");
        }
    }

    #[test]
    fn admin_gate_checks_the_flag() {
        assert!(require_admin(user(true, false)).is_ok());

        let denied = require_admin(user(false, true)).unwrap_err();
        assert_eq!(denied, Denied::NotAdmin);
        assert_eq!(denied.redirect_to(), "/");
        assert_eq!(denied.notice(), "You are not authorised to view this page.");
    }

    #[test]
    fn creator_gate_admits_admins() {
        assert!(require_creator(user(false, true)).is_ok());
        assert!(require_creator(user(true, false)).is_ok());
        assert_eq!(
            require_creator(user(false, false)).unwrap_err(),
            Denied::NotCreator
        );
    }

    #[test]
    fn plain_users_pass_authentication() {
        assert!(require_authenticated(user(false, false)).is_ok());
    }
}
