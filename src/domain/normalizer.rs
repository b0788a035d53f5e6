//! Response normalization - raw model text into the typed action schema.
//!
//! Models wrap JSON in markdown fences despite instructions not to, so a
//! single leading/trailing fence (with or without a language tag) is
//! tolerated. Validation is all-or-nothing: one invalid action rejects the
//! whole reply.

use thiserror::Error;

use super::action::BrainDumpResult;

/// Reasons a model reply fails normalization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("summary is empty")]
    EmptySummary,

    #[error("action {index}: content is empty")]
    EmptyContent { index: usize },

    #[error("action {index}: confidence {value} is outside [0.0, 1.0]")]
    ConfidenceOutOfRange { index: usize, value: f64 },
}

/// The model replied but its content could not be validated into the schema.
///
/// Carries the offending raw text alongside the typed reason so callers can
/// log the full reply for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("malformed model output: {reason}")]
pub struct MalformedModelOutput {
    /// The reply as received, before fence stripping.
    pub raw: String,
    /// What made it invalid.
    #[source]
    pub reason: NormalizeError,
}

impl MalformedModelOutput {
    fn new(raw: &str, reason: NormalizeError) -> Self {
        Self {
            raw: raw.to_string(),
            reason,
        }
    }
}

/// Parses a raw model reply into a validated [`BrainDumpResult`].
pub fn parse(raw: &str) -> Result<BrainDumpResult, MalformedModelOutput> {
    let cleaned = strip_code_fence(raw);

    let result: BrainDumpResult = serde_json::from_str(cleaned)
        .map_err(|e| MalformedModelOutput::new(raw, NormalizeError::Json(e.to_string())))?;

    validate(&result).map_err(|reason| MalformedModelOutput::new(raw, reason))?;

    Ok(result)
}

/// Strips one surrounding fenced code block, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag: everything up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

fn validate(result: &BrainDumpResult) -> Result<(), NormalizeError> {
    if result.summary.trim().is_empty() {
        return Err(NormalizeError::EmptySummary);
    }

    for (index, action) in result.actions.iter().enumerate() {
        if action.content.trim().is_empty() {
            return Err(NormalizeError::EmptyContent { index });
        }
        if !action.confidence.is_finite() || !(0.0..=1.0).contains(&action.confidence) {
            return Err(NormalizeError::ConfidenceOutOfRange {
                index,
                value: action.confidence,
            });
        }
    }

    Ok(())
}
