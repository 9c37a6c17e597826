pub mod album;
pub mod genre;
pub mod playlist;
pub mod song;
pub mod user;
