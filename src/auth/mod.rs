//! Who is calling, and what they may do.

use thiserror::Error;

pub mod credentials;
pub mod gate;
pub mod session;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Bcrypt")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Session token")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Session expiry out of range")]
    Expiry,
}
