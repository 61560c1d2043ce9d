//! ImageKit-compatible upload-auth signer.
//!
//! Clients upload images to the host directly; the API hands out short-lived
//! authentication parameters signed with the account's private key. The
//! signature scheme is the host's documented HMAC-SHA1 over `token + expire`.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use uuid::Uuid;

use hive_core::ports::{UploadAuthParams, UploadError, UploadSigner};

type HmacSha1 = Hmac<Sha1>;

/// Image host credentials and token lifetime. Constructed once at startup
/// and injected into the signer.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub url_endpoint: String,
    pub public_key: String,
    pub private_key: String,
    pub token_ttl_secs: i64,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self {
            url_endpoint: std::env::var("IMAGEKIT_URL_ENDPOINT").unwrap_or_default(),
            public_key: std::env::var("IMAGEKIT_PUBLIC_KEY").unwrap_or_default(),
            private_key: std::env::var("IMAGEKIT_PRIVATE_KEY").unwrap_or_default(),
            token_ttl_secs: std::env::var("IMAGEKIT_TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
        }
    }
}

/// Signs upload authentication parameters with the private key.
pub struct ImageKitSigner {
    config: UploadConfig,
}

impl ImageKitSigner {
    pub fn new(config: UploadConfig) -> Self {
        if config.private_key.is_empty() {
            tracing::warn!("Image upload private key is empty; signed uploads will be rejected");
        }
        Self { config }
    }

    fn sign(&self, token: &str, expire: i64) -> Result<String, UploadError> {
        let mut mac = HmacSha1::new_from_slice(self.config.private_key.as_bytes())
            .map_err(|e| UploadError::Signing(e.to_string()))?;
        mac.update(format!("{token}{expire}").as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl UploadSigner for ImageKitSigner {
    fn authentication_parameters(&self) -> Result<UploadAuthParams, UploadError> {
        let token = Uuid::new_v4().to_string();
        let expire = Utc::now().timestamp() + self.config.token_ttl_secs;
        let signature = self.sign(&token, expire)?;

        Ok(UploadAuthParams {
            token,
            expire,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(private_key: &str) -> ImageKitSigner {
        ImageKitSigner::new(UploadConfig {
            url_endpoint: "https://ik.example.com/hive".to_string(),
            public_key: "public_test".to_string(),
            private_key: private_key.to_string(),
            token_ttl_secs: 600,
        })
    }

    #[test]
    fn signature_is_hex_sha1_length() {
        let sig = signer("private_test").sign("token-a", 1_700_000_000).unwrap();
        assert_eq!(sig.len(), 40);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_deterministic_per_key() {
        let a = signer("private_test").sign("token-a", 1_700_000_000).unwrap();
        let b = signer("private_test").sign("token-a", 1_700_000_000).unwrap();
        let c = signer("other-key").sign("token-a", 1_700_000_000).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn parameters_expire_in_the_future() {
        let params = signer("private_test").authentication_parameters().unwrap();
        assert!(params.expire > Utc::now().timestamp());
        assert!(!params.token.is_empty());
    }
}
