//! Signed-upload port for the external image host.

use serde::{Deserialize, Serialize};

/// Short-lived authentication parameters a client presents to the image host
/// when uploading directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAuthParams {
    pub token: String,
    /// Unix timestamp after which the parameters are rejected.
    pub expire: i64,
    /// Hex-encoded signature over token and expiry.
    pub signature: String,
}

/// Produces upload authentication parameters.
pub trait UploadSigner: Send + Sync {
    fn authentication_parameters(&self) -> Result<UploadAuthParams, UploadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Signing failed: {0}")]
    Signing(String),
}
