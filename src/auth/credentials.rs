use sea_orm::ActiveValue as AV;
use tracing::warn;

use super::Error;
use crate::{entity::user, validate::MAX_PASSWORD_BYTES};

/// One-way salted password hashes.
///
/// There is no strength policy: any non-empty password is accepted.
#[derive(Debug, Clone, Copy)]
pub struct Credentials {
    cost: u32,
}

impl Credentials {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, Error> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    pub fn set_password(&self, user: &mut user::ActiveModel, plaintext: &str) -> Result<(), Error> {
        user.passhash = AV::Set(self.hash(plaintext)?);
        Ok(())
    }

    /// `false` for any mismatch. A stored hash bcrypt cannot read is logged
    /// and treated as a mismatch too.
    pub fn verify_password(&self, user: &user::Model, plaintext: &str) -> bool {
        // bcrypt would compare only a prefix of a longer input
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(plaintext, &user.passhash) {
            Ok(ok) => ok,
            Err(e) => {
                warn!("unreadable password hash for user {}: {e}", user.id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(passhash: String) -> user::Model {
        user::Model {
            id: 1,
            username: "alice".into(),
            passhash,
            name: None,
            is_admin: false,
            is_creator: false,
        }
    }

    #[test]
    fn verifies_only_the_right_password() {
        let credentials = Credentials::new(4);
        let user = user_with(credentials.hash("s3cret").unwrap());

        assert!(credentials.verify_password(&user, "s3cret"));
        assert!(!credentials.verify_password(&user, "S3cret"));
        assert!(!credentials.verify_password(&user, ""));
    }

    #[test]
    fn hashes_are_salted() {
        let credentials = Credentials::new(4);
        let first = credentials.hash("s3cret").unwrap();
        let second = credentials.hash("s3cret").unwrap();
        assert_ne!(first, second);
        assert!(!first.contains("s3cret"));
    }

    #[test]
    fn overlong_attempts_never_verify() {
        let credentials = Credentials::new(4);
        let stored = format!("{}A", "p".repeat(71));
        let user = user_with(credentials.hash(&stored).unwrap());

        assert!(credentials.verify_password(&user, &stored));
        assert!(!credentials.verify_password(&user, &format!("{stored}B")));
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        let credentials = Credentials::new(4);
        let user = user_with("not-a-bcrypt-hash".into());
        assert!(!credentials.verify_password(&user, "anything"));
    }

    #[test]
    fn set_password_stores_a_hash() {
        let credentials = Credentials::new(4);
        let mut active = user::ActiveModel::default();
        credentials.set_password(&mut active, "hunter2").unwrap();

        let AV::Set(hash) = active.passhash else {
            panic!("password hash not set");
        };
        assert!(credentials.verify_password(&user_with(hash), "hunter2"));
    }
}
