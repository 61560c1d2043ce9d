//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;
mod upload;

pub use auth::{AuthError, Role, TokenClaims, TokenService};
pub use repository::{BaseRepository, PostQuery, PostRepository, SortMode, UserRepository};
pub use upload::{UploadAuthParams, UploadError, UploadSigner};
