//! Signed-upload integration for the external image host.

mod imagekit;

pub use imagekit::{ImageKitSigner, UploadConfig};
