//! Prompt builders - pure functions, no I/O.
//!
//! Each modality gets its own instruction prompt. The current time is
//! injected so relative date expressions ("tomorrow", "next tuesday")
//! resolve consistently within one call.

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed sentence the model must emit when the answer is not in context.
pub const NOT_FOUND_REPLY: &str = "Kayıtlarımda buna dair bir bilgi bulamadım.";

/// Fixed apology returned to the caller when question answering fails.
pub const FALLBACK_REPLY: &str = "Üzgünüm, şu an cevap veremiyorum.";

/// Instruction prompt for the text and audio ingestion paths.
pub fn ingestion_prompt(now: DateTime<Utc>) -> String {
    format!(
        r#"You are the intelligence behind "BrainDump".
Your goal is to extract structured actions from a user's stream-of-consciousness speech (or text).

User Context:
- Current Date/Time: {now}
- Language: Turkish (mostly), but handle mixed English if needed.

Instructions:
1. Analyze the input accurately.
2. Break down compound sentences into separate distinct actions.
3. Classify each action into one of these categories:
    - CALENDAR_EVENT: Events with a specific time/place (e.g., meetings, sports, social).
    - SHOPPING_ITEM: Things to buy.
    - TODO: Tasks without a specific hard deadline (e.g., "clean the garage").
    - NOTE: General thoughts, feelings, or ideas (e.g., "Annem hasta", "Film fikri").
    - ALARM: Specific requests to wake up or time-critical alerts (e.g., "Wake me up at 9").
    - REMINDER: Time-specific tasks (e.g., "Take medicine at 1").

4. Extract precise dates and times relative to the current time provided above.
   - If user says "tomorrow", calculate the date.
   - If user says "next tuesday", calculate the date.

5. Return ONLY a JSON object matching this schema.

Schema:
{schema}"#,
        now = now.to_rfc3339_opts(SecondsFormat::Secs, true),
        schema = RESULT_SCHEMA,
    )
}

/// Instruction prompt for the image ingestion path.
pub fn vision_prompt(now: DateTime<Utc>) -> String {
    format!(
        r#"You are the visual cortex of "BrainDump".
Your goal is to analyze images and extract actionable items for the user.

User Context:
- Current Date/Time: {now}
- Language: Turkish (output in Turkish content unless text is strictly English).

Instructions:
1. Analyze the IMAGE content deeply.
2. Extract relevant actions based on what you see:
   - EVENT INVITATION (Wedding, Party, Meeting) -> Create CALENDAR_EVENT.
   - RECEIPT / POWER BILL / INVOICE -> Create TODO (Pay bill) or NOTE (Expense record).
   - EMPTY FRIDGE / PANTRY -> Create SHOPPING_ITEMs for missing essentials.
   - HANDWRITTEN NOTE -> Transcribe to NOTE or TODO.
   - SCREENSHOT OF CHAT -> Extract tasks/events mentioned.

3. If there is a date explicitly visible in the image (like on an invitation), use that for 'datetime_iso'.
4. Return ONLY a JSON object matching the BrainDump schema.

Schema:
{schema}"#,
        now = now.to_rfc3339_opts(SecondsFormat::Secs, true),
        schema = RESULT_SCHEMA,
    )
}

/// Prompt for the question-answering path.
///
/// `context` is the flattened recent-action block (see [`super::context`]).
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are a helpful personal assistant called "BrainDump".
You have access to the user's recent logs and actions.

USER'S DATA (CONTEXT):
{context}

USER'S QUESTION:
"{question}"

INSTRUCTIONS:
1. Answer the question based ONLY on the provided context.
2. If the answer is not in the context, say "{not_found}"
3. Be concise and friendly.
4. Reply in Turkish (unless the user asks in English)."#,
        context = context,
        question = question,
        not_found = NOT_FOUND_REPLY,
    )
}

/// JSON schema block shared by the ingestion and vision prompts.
const RESULT_SCHEMA: &str = r#"{
  "summary": "Short summary of the input",
  "actions": [
    {
      "type": "CALENDAR_EVENT" | "SHOPPING_ITEM" | "TODO" | "NOTE" | "ALARM" | "REMINDER",
      "content": "The action description",
      "category": "Optional category (e.g., Health, Work, Personal)",
      "datetime_iso": "ISO 8601 date string or null",
      "priority": "HIGH" | "MEDIUM" | "LOW" | null,
      "confidence": 0.0 to 1.0
    }
  ]
}"#;
