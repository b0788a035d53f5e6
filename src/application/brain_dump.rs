//! BrainDumpService - orchestrator facade over the ingestion and Q&A paths.
//!
//! Composes prompt building, tiered generation, and response normalization
//! per entry point. All collaborators are injected at construction; the
//! service holds no mutable state and can be shared across tasks.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::adapters::model::{ModelUnavailable, RetryPolicy, TieredGateway};
use crate::config::AiConfig;
use crate::domain::action::BrainDumpResult;
use crate::domain::context::{self, RecentAction};
use crate::domain::normalizer::{self, MalformedModelOutput};
use crate::domain::prompt::{self, FALLBACK_REPLY, NOT_FOUND_REPLY};
use crate::ports::{GenerationRequest, MediaError, MediaStore, ModelError, ModelProvider};

/// Errors surfaced by the ingestion entry points.
///
/// Both kinds propagate to the caller unchanged; ingestion never degrades
/// to an empty result.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Both model tiers are exhausted; nothing was extracted for this call.
    #[error(transparent)]
    ModelUnavailable(#[from] ModelUnavailable),

    /// The model replied but the reply failed normalization.
    #[error(transparent)]
    MalformedOutput(#[from] MalformedModelOutput),
}

/// Orchestrator over the fast/capable gateway, the media store, and the
/// pure domain pieces.
pub struct BrainDumpService<F: ModelProvider, C: ModelProvider, M: MediaStore> {
    gateway: TieredGateway<F, C>,
    media: M,
    max_attempts: u32,
    ingestion_backoff: Duration,
    vision_backoff: Duration,
}

impl<F, C, M> BrainDumpService<F, C, M>
where
    F: ModelProvider,
    C: ModelProvider,
    M: MediaStore,
{
    /// Creates a service with the default retry budget and backoffs.
    pub fn new(gateway: TieredGateway<F, C>, media: M) -> Self {
        Self {
            gateway,
            media,
            max_attempts: 3,
            ingestion_backoff: Duration::from_secs(5),
            vision_backoff: Duration::from_secs(2),
        }
    }

    /// Creates a service with timings taken from configuration.
    pub fn with_config(gateway: TieredGateway<F, C>, media: M, config: &AiConfig) -> Self {
        Self {
            gateway,
            media,
            max_attempts: config.max_attempts,
            ingestion_backoff: config.ingestion_backoff(),
            vision_backoff: config.vision_backoff(),
        }
    }

    fn ingestion_policy(&self) -> RetryPolicy {
        RetryPolicy::ingestion(self.max_attempts, self.ingestion_backoff)
    }

    fn vision_policy(&self) -> RetryPolicy {
        RetryPolicy::ingestion(self.max_attempts, self.vision_backoff)
    }

    /// Extracts structured actions from free text.
    pub async fn process_text(&self, text: &str) -> Result<BrainDumpResult, ProcessError> {
        let request = GenerationRequest::new(prompt::ingestion_prompt(Utc::now()))
            .with_input(text)
            .structured();

        let raw = self.gateway.generate(request, self.ingestion_policy()).await?;
        Ok(normalizer::parse(&raw)?)
    }

    /// Extracts structured actions from an audio recording.
    ///
    /// The upload is a precondition of generation: it is not retried, and
    /// its failure surfaces as the model being unavailable.
    pub async fn process_audio(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<BrainDumpResult, ProcessError> {
        let media = self
            .media
            .upload(audio, mime_type)
            .await
            .map_err(media_unavailable)?;
        debug!(uri = %media.uri, "audio payload uploaded");

        let request = GenerationRequest::new(prompt::ingestion_prompt(Utc::now()))
            .with_media(media)
            .structured();

        let raw = self.gateway.generate(request, self.ingestion_policy()).await?;
        Ok(normalizer::parse(&raw)?)
    }

    /// Extracts structured actions from an image.
    pub async fn process_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<BrainDumpResult, ProcessError> {
        let media = self
            .media
            .upload(image, mime_type)
            .await
            .map_err(media_unavailable)?;
        debug!(uri = %media.uri, "image payload uploaded");

        let request = GenerationRequest::new(prompt::vision_prompt(Utc::now()))
            .with_media(media)
            .structured();

        let raw = self.gateway.generate(request, self.vision_policy()).await?;
        Ok(normalizer::parse(&raw)?)
    }

    /// Answers a free-text question from recently stored actions.
    ///
    /// Single fast-tier attempt, no fallback. Never fails: internal errors
    /// degrade to the fixed apology string.
    pub async fn answer_question(&self, recent: &[RecentAction], question: &str) -> String {
        if recent.is_empty() {
            return NOT_FOUND_REPLY.to_string();
        }

        let request =
            GenerationRequest::new(prompt::answer_prompt(&context::flatten(recent), question));

        match self
            .gateway
            .generate(request, RetryPolicy::single_attempt())
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(error = %err, "question answering failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

/// The upload facility is part of the remote model capability; its failure
/// is surfaced as the model being unavailable.
fn media_unavailable(err: MediaError) -> ProcessError {
    ProcessError::ModelUnavailable(ModelUnavailable {
        attempts: 0,
        source: ModelError::unavailable(format!("media upload failed: {}", err)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::model::{MockMediaStore, MockModelProvider};
    use crate::domain::action::ActionType;
    use chrono::TimeZone;

    const REPLY: &str = r#"{
        "summary": "One task",
        "actions": [{"type": "TODO", "content": "Clean the garage", "confidence": 0.9}]
    }"#;

    fn service(
        fast: MockModelProvider,
        capable: MockModelProvider,
        media: MockMediaStore,
    ) -> BrainDumpService<MockModelProvider, MockModelProvider, MockMediaStore> {
        BrainDumpService::new(TieredGateway::new(fast, capable), media)
    }

    #[tokio::test]
    async fn process_text_parses_structured_reply() {
        let fast = MockModelProvider::new().with_reply(REPLY);
        let svc = service(fast.clone(), MockModelProvider::new(), MockMediaStore::new());

        let result = svc.process_text("garajı temizlemem lazım").await.unwrap();

        assert_eq!(result.summary, "One task");
        assert_eq!(result.actions[0].action_type, ActionType::Todo);

        // The user's text rides along as model input, with JSON output requested.
        let call = &fast.get_calls()[0];
        assert_eq!(call.input.as_deref(), Some("garajı temizlemem lazım"));
        assert!(call.structured_json);
        assert!(call.media.is_none());
    }

    #[tokio::test]
    async fn process_text_surfaces_malformed_output_with_raw() {
        let fast = MockModelProvider::new().with_reply("Sorry, I cannot help with that.");
        let svc = service(fast, MockModelProvider::new(), MockMediaStore::new());

        let err = svc.process_text("hi").await.unwrap_err();

        match err {
            ProcessError::MalformedOutput(malformed) => {
                assert!(malformed.raw.contains("Sorry"));
            }
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn process_text_surfaces_model_unavailable() {
        let fast = MockModelProvider::new()
            .with_error(ModelError::rate_limited(5))
            .with_error(ModelError::rate_limited(5))
            .with_error(ModelError::rate_limited(5));
        let capable = MockModelProvider::new().with_error(ModelError::unavailable("down"));
        let svc = service(fast, capable, MockMediaStore::new());

        let err = svc.process_text("hi").await.unwrap_err();
        assert!(matches!(err, ProcessError::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn process_audio_uploads_then_generates_with_media() {
        let fast = MockModelProvider::new().with_reply(REPLY);
        let media = MockMediaStore::new();
        let svc = service(fast.clone(), MockModelProvider::new(), media.clone());

        svc.process_audio(b"fake-audio", "audio/m4a").await.unwrap();

        assert_eq!(media.upload_count(), 1);
        assert_eq!(media.get_uploads()[0], (10, "audio/m4a".to_string()));

        let call = &fast.get_calls()[0];
        assert!(call.media.as_ref().unwrap().uri.starts_with("mock://"));
        assert!(call.input.is_none());
    }

    #[tokio::test]
    async fn process_image_uses_the_vision_prompt() {
        let fast = MockModelProvider::new().with_reply(REPLY);
        let svc = service(fast.clone(), MockModelProvider::new(), MockMediaStore::new());

        svc.process_image(b"fake-image", "image/png").await.unwrap();

        let call = &fast.get_calls()[0];
        assert!(call.instruction.contains("visual cortex"));
        assert!(call.media.is_some());
    }

    #[tokio::test]
    async fn media_failure_surfaces_as_model_unavailable() {
        let fast = MockModelProvider::new().with_reply(REPLY);
        let media = MockMediaStore::failing(MediaError::rejected("too large"));
        let svc = service(fast.clone(), MockModelProvider::new(), media);

        let err = svc.process_audio(b"fake", "audio/m4a").await.unwrap_err();

        match err {
            ProcessError::ModelUnavailable(unavailable) => {
                assert_eq!(unavailable.attempts, 0);
                assert!(unavailable.source.to_string().contains("media upload failed"));
            }
            other => panic!("expected ModelUnavailable, got {other:?}"),
        }
        // Generation never starts when the precondition fails.
        assert_eq!(fast.call_count(), 0);
    }

    #[tokio::test]
    async fn answer_question_trims_the_reply() {
        let fast = MockModelProvider::new().with_reply("  Yarın kahve içeceksin.  \n");
        let svc = service(fast, MockModelProvider::new(), MockMediaStore::new());

        let recent = vec![RecentAction::new(
            Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap(),
            ActionType::CalendarEvent,
            None,
            "Kahve - yarın 15:00",
        )];

        let answer = svc.answer_question(&recent, "Yarın ne yapıyorum?").await;
        assert_eq!(answer, "Yarın kahve içeceksin.");
    }

    #[tokio::test]
    async fn answer_question_with_empty_context_short_circuits() {
        let fast = MockModelProvider::new();
        let svc = service(fast.clone(), MockModelProvider::new(), MockMediaStore::new());

        let answer = svc.answer_question(&[], "Herhangi bir sorum").await;

        assert_eq!(answer, NOT_FOUND_REPLY);
        assert_eq!(fast.call_count(), 0);
    }

    #[tokio::test]
    async fn answer_question_degrades_to_apology_on_failure() {
        let fast = MockModelProvider::new().with_error(ModelError::unavailable("down"));
        let capable = MockModelProvider::new().with_reply("never used");
        let svc = service(fast, capable.clone(), MockMediaStore::new());

        let recent = vec![RecentAction::new(
            Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap(),
            ActionType::Note,
            None,
            "Film fikri",
        )];

        let answer = svc.answer_question(&recent, "Ne not almıştım?").await;

        assert_eq!(answer, FALLBACK_REPLY);
        // Q&A never falls back to the capable tier.
        assert_eq!(capable.call_count(), 0);
    }
}
