//! The action model - typed output of one ingestion call.
//!
//! Wire format is shared with the mobile client: enum values are
//! SCREAMING_SNAKE_CASE and the scheduled timestamp travels under the
//! `datetime_iso` key.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of actionable item extracted from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Event with a specific time/place (meetings, sports, social).
    CalendarEvent,
    /// Something to buy.
    ShoppingItem,
    /// Task without a hard deadline.
    Todo,
    /// General thought, feeling, or idea.
    Note,
    /// Wake-up or time-critical alert.
    Alarm,
    /// Time-specific task.
    Reminder,
}

impl ActionType {
    /// Wire name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CalendarEvent => "CALENDAR_EVENT",
            ActionType::ShoppingItem => "SHOPPING_ITEM",
            ActionType::Todo => "TODO",
            ActionType::Note => "NOTE",
            ActionType::Alarm => "ALARM",
            ActionType::Reminder => "REMINDER",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model-assigned priority of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One extracted actionable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Classification into the closed six-member enumeration.
    #[serde(rename = "type")]
    pub action_type: ActionType,

    /// The action description. Must be non-empty.
    pub content: String,

    /// Optional free-text label (e.g., Health, Work, Personal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Resolved timestamp, when one was extracted.
    #[serde(
        rename = "datetime_iso",
        default,
        deserialize_with = "deserialize_scheduled_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Optional priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Model's self-reported certainty, in [0.0, 1.0].
    pub confidence: f64,
}

/// Output of one ingestion call.
///
/// Constructed once by the normalizer, then immutable; the caller persists
/// the actions one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainDumpResult {
    /// Short description of the whole input.
    pub summary: String,
    /// Extracted actions, in input order. May be empty.
    pub actions: Vec<Action>,
}

/// Parses a model-emitted timestamp.
///
/// Models echo both RFC 3339 ("2024-05-21T15:00:00+03:00", "...Z") and naive
/// ISO-8601 ("2024-05-21T15:00:00"); naive values are taken as UTC.
pub fn parse_model_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(format!("unrecognized datetime: {value}"))
}

fn deserialize_scheduled_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_model_datetime(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
