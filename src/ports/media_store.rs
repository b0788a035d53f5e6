//! Media Store Port - Interface for the provider's media upload facility.
//!
//! Audio and image payloads are uploaded once per ingestion call to obtain
//! an opaque remote reference usable in a generation request. The upload is
//! a precondition of generation and is never retried by the gateway.

use async_trait::async_trait;

use super::model_provider::MediaRef;

/// Port for uploading binary media to the model provider.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a payload and return the remote handle for it.
    async fn upload(&self, data: &[u8], mime_type: &str) -> Result<MediaRef, MediaError>;
}

/// Media upload errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MediaError {
    /// Provider rejected the payload (size, type, malformed request).
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// Network error during upload.
    #[error("network error: {0}")]
    Network(String),
}

impl MediaError {
    /// Creates a rejected error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }
}
