use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One turn of a document's chat session. Append-only; ordering within a
/// (document, owner) session is by `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Human, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Human,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Assistant => "Assistant",
        }
    }
}

/// Formats turns as alternating `Human:` / `Assistant:` lines for prompts.
pub fn format_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.text))
        .collect::<Vec<_>>()
        .join("\n")
}
