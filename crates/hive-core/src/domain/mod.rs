//! Domain entities and business rules.

pub mod nectar;
pub mod post;
pub mod slug;
pub mod user;

pub use post::Post;
pub use user::{User, UserLevel};
