//! Model provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Model provider configuration
///
/// Covers both capability tiers: the fast tier handles every first attempt,
/// the capable tier is the fallback once the fast tier is exhausted.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Fast-tier model name (first attempt, retried on rate limits)
    #[serde(default = "default_fast_model")]
    pub fast_model: String,

    /// Capable-tier model name (fallback)
    #[serde(default = "default_capable_model")]
    pub capable_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Total fast-tier attempts per ingestion call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff between rate-limited attempts on the text/audio paths, seconds
    #[serde(default = "default_ingestion_backoff")]
    pub ingestion_backoff_secs: u64,

    /// Backoff between rate-limited attempts on the vision path, seconds
    #[serde(default = "default_vision_backoff")]
    pub vision_backoff_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff for the text/audio ingestion paths
    pub fn ingestion_backoff(&self) -> Duration {
        Duration::from_secs(self.ingestion_backoff_secs)
    }

    /// Backoff for the vision path
    pub fn vision_backoff(&self) -> Duration {
        Duration::from_secs(self.vision_backoff_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate model configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("GEMINI_API_KEY"));
        }

        if self.fast_model.is_empty() || self.capable_model.is_empty() {
            return Err(ValidationError::EmptyModelName);
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidRetryBudget);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            fast_model: default_fast_model(),
            capable_model: default_capable_model(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            ingestion_backoff_secs: default_ingestion_backoff(),
            vision_backoff_secs: default_vision_backoff(),
        }
    }
}

fn default_fast_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_capable_model() -> String {
    "gemini-pro-latest".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_ingestion_backoff() -> u64 {
    5
}

fn default_vision_backoff() -> u64 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.fast_model, "gemini-flash-latest");
        assert_eq!(config.capable_model, "gemini-pro-latest");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.ingestion_backoff_secs, 5);
        assert_eq!(config.vision_backoff_secs, 2);
    }

    #[test]
    fn test_backoff_durations() {
        let config = AiConfig::default();
        assert_eq!(config.ingestion_backoff(), Duration::from_secs(5));
        assert_eq!(config.vision_backoff(), Duration::from_secs(2));
    }

    #[test]
    fn test_validation_missing_key() {
        let config = AiConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_key() {
        let config = AiConfig {
            gemini_api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = AiConfig {
            gemini_api_key: Some("AIza-test".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_attempts() {
        let config = AiConfig {
            gemini_api_key: Some("AIza-test".to_string()),
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRetryBudget)
        ));
    }
}
