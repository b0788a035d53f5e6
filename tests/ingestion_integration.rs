//! End-to-end flows over the orchestrator with mock tiers.
//!
//! Covers the caller-facing contract: ingestion returns a typed result or
//! one of the two hard failures, question answering always returns text.

use braindump::adapters::model::{MockMediaStore, MockModelProvider, TieredGateway};
use braindump::application::{BrainDumpService, ProcessError};
use braindump::domain::action::ActionType;
use braindump::domain::context::RecentAction;
use braindump::domain::prompt::{FALLBACK_REPLY, NOT_FOUND_REPLY};
use braindump::ports::ModelError;
use chrono::{TimeZone, Utc};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn service(
    fast: MockModelProvider,
    capable: MockModelProvider,
) -> BrainDumpService<MockModelProvider, MockModelProvider, MockMediaStore> {
    BrainDumpService::new(TieredGateway::new(fast, capable), MockMediaStore::new())
}

/// Reply the model would produce for "Tomorrow at 3pm I'll have coffee with
/// Mehmet, and I need to buy cat food on the way home" (current time
/// 2024-05-21).
const COFFEE_AND_CAT_FOOD: &str = r#"{
    "summary": "Kahve buluşması ve alışveriş",
    "actions": [
        {
            "type": "CALENDAR_EVENT",
            "content": "Mehmet ile kahve",
            "category": "Personal",
            "datetime_iso": "2024-05-22T15:00:00",
            "priority": "MEDIUM",
            "confidence": 0.93
        },
        {
            "type": "SHOPPING_ITEM",
            "content": "Kedi maması al",
            "category": "Shopping",
            "confidence": 0.88
        }
    ]
}"#;

#[tokio::test]
async fn text_ingestion_extracts_event_and_shopping_item() {
    let fast = MockModelProvider::new().with_reply(COFFEE_AND_CAT_FOOD);
    let svc = service(fast, MockModelProvider::new());

    let result = svc
        .process_text("Yarın 15:00'te Mehmet ile kahve içeceğim, dönüşte kedi maması almam lazım")
        .await
        .unwrap();

    assert!(!result.summary.is_empty());
    assert_eq!(result.actions.len(), 2);

    let event = &result.actions[0];
    assert_eq!(event.action_type, ActionType::CalendarEvent);
    assert!(event.content.contains("Mehmet"));
    assert!(event.content.to_lowercase().contains("kahve"));
    assert_eq!(
        event.scheduled_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 22, 15, 0, 0).unwrap())
    );

    let item = &result.actions[1];
    assert_eq!(item.action_type, ActionType::ShoppingItem);
    assert!(item.content.to_lowercase().contains("mama"));
    assert!(item.scheduled_at.is_none());
}

#[tokio::test]
async fn fenced_reply_parses_the_same_as_plain() {
    let plain = MockModelProvider::new().with_reply(COFFEE_AND_CAT_FOOD);
    let fenced =
        MockModelProvider::new().with_reply(format!("```json\n{COFFEE_AND_CAT_FOOD}\n```"));

    let from_plain = service(plain, MockModelProvider::new())
        .process_text("input")
        .await
        .unwrap();
    let from_fenced = service(fenced, MockModelProvider::new())
        .process_text("input")
        .await
        .unwrap();

    assert_eq!(from_plain, from_fenced);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_fast_tier_recovers_without_fallback() {
    init_tracing();
    let fast = MockModelProvider::new()
        .with_error(ModelError::rate_limited(5))
        .with_error(ModelError::rate_limited(5))
        .with_reply(COFFEE_AND_CAT_FOOD);
    let capable = MockModelProvider::new();
    let svc = service(fast.clone(), capable.clone());

    let result = svc.process_text("input").await.unwrap();

    assert_eq!(result.actions.len(), 2);
    assert_eq!(fast.call_count(), 3);
    assert_eq!(capable.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn provider_failure_falls_back_to_capable_tier() {
    let fast = MockModelProvider::new().with_error(ModelError::unavailable("500 Internal"));
    let capable = MockModelProvider::new().with_reply(COFFEE_AND_CAT_FOOD);
    let svc = service(fast.clone(), capable.clone());

    let result = svc.process_text("input").await.unwrap();

    assert_eq!(result.actions.len(), 2);
    assert_eq!(fast.call_count(), 1);
    assert_eq!(capable.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_tiers_fail_hard_within_the_attempt_budget() {
    init_tracing();
    let fast = MockModelProvider::new()
        .with_error(ModelError::rate_limited(5))
        .with_error(ModelError::rate_limited(5))
        .with_error(ModelError::rate_limited(5))
        .with_error(ModelError::rate_limited(5));
    let capable = MockModelProvider::new().with_error(ModelError::unavailable("down"));
    let svc = service(fast.clone(), capable.clone());

    let err = svc.process_text("input").await.unwrap_err();

    assert!(matches!(err, ProcessError::ModelUnavailable(_)));
    assert_eq!(fast.call_count(), 3);
    assert_eq!(capable.call_count(), 1);
}

#[tokio::test]
async fn malformed_reply_keeps_the_raw_text_for_diagnostics() {
    let fast = MockModelProvider::new()
        .with_reply(r#"{"summary": "s", "actions": [{"type": "TODO", "content": "x", "confidence": 1.7}]}"#);
    let svc = service(fast, MockModelProvider::new());

    let err = svc.process_text("input").await.unwrap_err();

    match err {
        ProcessError::MalformedOutput(malformed) => {
            assert!(malformed.raw.contains("1.7"));
        }
        other => panic!("expected MalformedOutput, got {other:?}"),
    }
}

#[tokio::test]
async fn audio_ingestion_attaches_the_uploaded_handle() {
    let fast = MockModelProvider::new().with_reply(COFFEE_AND_CAT_FOOD);
    let media = MockMediaStore::new();
    let svc = BrainDumpService::new(
        TieredGateway::new(fast.clone(), MockModelProvider::new()),
        media.clone(),
    );

    svc.process_audio(b"pretend-m4a-bytes", "audio/m4a")
        .await
        .unwrap();

    assert_eq!(media.upload_count(), 1);
    let call = &fast.get_calls()[0];
    assert_eq!(call.media.as_ref().unwrap().mime_type, "audio/m4a");
    assert!(call.structured_json);
}

#[tokio::test]
async fn question_with_empty_context_returns_the_not_found_sentence() {
    let fast = MockModelProvider::new();
    let svc = service(fast.clone(), MockModelProvider::new());

    for question in ["Yarın ne yapıyorum?", "What did I note yesterday?", ""] {
        let answer = svc.answer_question(&[], question).await;
        assert_eq!(answer, NOT_FOUND_REPLY);
    }

    assert_eq!(fast.call_count(), 0);
}

#[tokio::test]
async fn question_answering_never_errors() {
    let fast = MockModelProvider::new().with_error(ModelError::AuthenticationFailed);
    let svc = service(fast, MockModelProvider::new());

    let recent = vec![RecentAction::new(
        Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap(),
        ActionType::Note,
        Some("Personal".to_string()),
        "Annem hasta",
    )];

    let answer = svc.answer_question(&recent, "Annemle ilgili ne not aldım?").await;
    assert_eq!(answer, FALLBACK_REPLY);
}

#[tokio::test]
async fn question_context_reaches_the_model_flattened() {
    let fast = MockModelProvider::new().with_reply("Annenin hasta olduğunu not almışsın.");
    let svc = service(fast.clone(), MockModelProvider::new());

    let recent = vec![
        RecentAction::new(
            Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap(),
            ActionType::Note,
            Some("Personal".to_string()),
            "Annem hasta",
        ),
        RecentAction::new(
            Utc.with_ymd_and_hms(2024, 5, 19, 18, 30, 0).unwrap(),
            ActionType::ShoppingItem,
            None,
            "Kedi maması",
        ),
    ];

    svc.answer_question(&recent, "Annemle ilgili ne not aldım?")
        .await;

    let call = &fast.get_calls()[0];
    assert!(call
        .instruction
        .contains("- [2024-05-20 09:00] NOTE (Personal): Annem hasta"));
    assert!(call
        .instruction
        .contains("- [2024-05-19 18:30] SHOPPING_ITEM (General): Kedi maması"));
    // Q&A replies are free text; no JSON formatting is requested.
    assert!(!call.structured_json);
}
