use async_trait::async_trait;
use chatlan_core::ChatMessage;
use thiserror::Error;
use tracing::warn;

/// Messages fed to the suggester, counted from the end of the log.
pub const CONTEXT_WINDOW: usize = 10;
pub const EMPTY_FALLBACK: &str = "New Mesh Group";
pub const FAILURE_FALLBACK: &str = "Mesh Connect";

#[derive(Debug, Error)]
#[error("name suggestion failed: {0}")]
pub struct SuggestionError(pub String);

/// Text generation backend that proposes a group name.
#[async_trait]
pub trait NameSuggester: Send + Sync {
    async fn suggest(&self, prompt: &str) -> Result<String, SuggestionError>;
}

/// `name: text` lines for the last [`CONTEXT_WINDOW`] messages.
pub fn chat_context(messages: &[ChatMessage]) -> String {
    let start = messages.len().saturating_sub(CONTEXT_WINDOW);
    messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.sender_name, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn suggestion_prompt(messages: &[ChatMessage]) -> String {
    format!(
        "Suggest a short, creative, and catchy group name based on this chat context. \
         Return only the name, no extra text.\n\nContext:\n{}",
        chat_context(messages)
    )
}

/// Asks `suggester` for a group name. Never fails: an empty answer or a
/// backend error yields a fixed fallback.
pub async fn suggest_group_name(suggester: &dyn NameSuggester, messages: &[ChatMessage]) -> String {
    match suggester.suggest(&suggestion_prompt(messages)).await {
        Ok(raw) => {
            let name = clean_suggestion(&raw);
            if name.is_empty() {
                EMPTY_FALLBACK.to_owned()
            } else {
                name.to_owned()
            }
        }
        Err(e) => {
            warn!("{}", e);
            FAILURE_FALLBACK.to_owned()
        }
    }
}

fn clean_suggestion(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed)
}
