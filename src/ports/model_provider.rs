//! Model Provider Port - Interface for remote LLM tier integrations.
//!
//! This port abstracts a single model capability tier. The gateway composes
//! two of them (fast and capable) to implement retry and fallback; nothing
//! above the port knows which vendor is behind it.
//!
//! # Design
//!
//! - One operation: prompt plus optional media in, raw text out
//! - Structured JSON output is a request-level hint, not a separate call
//! - Error taxonomy separates transient rate limiting from provider failures

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for a single remote model tier.
///
/// Implementations connect to an external LLM service and translate between
/// the provider-specific API and the crate's request/error types.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Run one generation attempt and return the raw reply text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, ModelError>;

    /// Get provider information (name, model) for logs.
    fn model_info(&self) -> ModelInfo;
}

/// One generation request.
///
/// `instruction` carries the modality prompt; `input` the user's text (text
/// path only); `media` the uploaded audio/image handle (audio/image paths).
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Instruction prompt guiding extraction.
    pub instruction: String,
    /// User-supplied text, when the input is textual.
    pub input: Option<String>,
    /// Remote handle for uploaded media, when the input is audio or an image.
    pub media: Option<MediaRef>,
    /// Request JSON-formatted output from the model.
    pub structured_json: bool,
}

impl GenerationRequest {
    /// Creates a request with the given instruction prompt.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            input: None,
            media: None,
            structured_json: false,
        }
    }

    /// Attaches the user's text input.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Attaches an uploaded media handle.
    pub fn with_media(mut self, media: MediaRef) -> Self {
        self.media = Some(media);
        self
    }

    /// Requests JSON-formatted output.
    pub fn structured(mut self) -> Self {
        self.structured_json = true;
        self
    }
}

/// Opaque remote reference to uploaded media, usable in a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Provider-side URI of the uploaded payload.
    pub uri: String,
    /// MIME type recorded at upload time.
    pub mime_type: String,
}

impl MediaRef {
    /// Creates a new media reference.
    pub fn new(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Provider identification for logging.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Provider name (e.g., "gemini").
    pub name: String,
    /// Model identifier (e.g., "gemini-flash-latest").
    pub model: String,
}

impl ModelInfo {
    /// Creates new model info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Model provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Quota exhausted for the current billing window.
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl ModelError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a quota exhausted error.
    pub fn quota_exhausted(message: impl Into<String>) -> Self {
        Self::QuotaExhausted(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns true if this error is a transient rate-limit or quota signal.
    ///
    /// Rate-limit failures are tier-local: the same tier is retried after a
    /// backoff. Every other error escalates to the fallback tier at once.
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            ModelError::RateLimited { .. } | ModelError::QuotaExhausted(_)
        )
    }

    /// Classifies an opaque provider message into a typed error.
    ///
    /// Used when only an error string is available (transport failures,
    /// SDK-style wrapped errors) rather than an HTTP status.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_ascii_lowercase();

        if message.contains("429") || lowered.contains("quota") {
            Self::QuotaExhausted(message)
        } else if message.contains("500")
            || message.contains("503")
            || lowered.contains("internal")
            || lowered.contains("unavailable")
            || lowered.contains("overloaded")
        {
            Self::Unavailable { message }
        } else {
            Self::Network(message)
        }
    }
}
