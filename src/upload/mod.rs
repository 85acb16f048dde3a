//! YouTube authentication and resumable upload.

pub mod auth;
pub mod youtube;

pub use auth::{Authenticator, ClientSecrets, StoredToken, TokenState};
pub use youtube::YouTubeUploader;
