//! Prompt context projection for question answering.
//!
//! Previously stored actions are reduced to one line each before being
//! injected into the answer prompt. This is a read-only view built fresh
//! per call; ownership of the stored records stays with the caller.

use chrono::{DateTime, Utc};

use super::action::ActionType;

/// One previously stored action, as the Q&A path sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentAction {
    /// When the action was stored.
    pub created_at: DateTime<Utc>,
    /// Its classification.
    pub action_type: ActionType,
    /// Optional category label.
    pub category: Option<String>,
    /// The action text.
    pub content: String,
}

impl RecentAction {
    /// Creates a new context entry.
    pub fn new(
        created_at: DateTime<Utc>,
        action_type: ActionType,
        category: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            created_at,
            action_type,
            category,
            content: content.into(),
        }
    }

    /// Single-line rendering injected into the answer prompt.
    fn to_context_line(&self) -> String {
        format!(
            "- [{}] {} ({}): {}",
            self.created_at.format("%Y-%m-%d %H:%M"),
            self.action_type,
            self.category.as_deref().unwrap_or("General"),
            self.content
        )
    }
}

/// Flattens recent actions (most-recent-first) into the prompt context block.
pub fn flatten(actions: &[RecentAction]) -> String {
    actions
        .iter()
        .map(RecentAction::to_context_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(category: Option<&str>) -> RecentAction {
        RecentAction::new(
            Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap(),
            ActionType::Reminder,
            category.map(String::from),
            "Take medicine at 1pm",
        )
    }

    #[test]
    fn context_line_includes_timestamp_type_and_category() {
        let line = flatten(&[sample(Some("Health"))]);
        assert_eq!(
            line,
            "- [2024-05-20 09:30] REMINDER (Health): Take medicine at 1pm"
        );
    }

    #[test]
    fn missing_category_renders_as_general() {
        let line = flatten(&[sample(None)]);
        assert!(line.contains("(General)"));
    }

    #[test]
    fn flatten_joins_with_newlines_preserving_order() {
        let first = sample(Some("Health"));
        let mut second = sample(None);
        second.content = "Buy cat food".to_string();
        second.action_type = ActionType::ShoppingItem;

        let block = flatten(&[first, second]);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Take medicine"));
        assert!(lines[1].contains("SHOPPING_ITEM"));
    }

    #[test]
    fn flatten_of_empty_slice_is_empty() {
        assert_eq!(flatten(&[]), "");
    }
}
