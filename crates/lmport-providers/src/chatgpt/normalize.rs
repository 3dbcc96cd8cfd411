use lmport_types::{ExportDefaults, KvConfig, LmConversation, LmMessage};
use serde_json::Value;

use crate::chatgpt::schema::{ChatGptConversation, NodeArena};
use crate::coerce::{first_non_empty, first_truthy};
use crate::content::extract_text;
use crate::normalizer::{Normalizer, StepIds, assistant_message, user_message};

/// One visible message, after extraction and before grouping
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TranscriptItem {
    pub timestamp_ms: i64,
    pub role: String,
    pub text: String,
}

/// Consecutive items folded into one output message
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Turn {
    User(String),
    Assistant(Vec<String>),
}

/// Normalize a ChatGPT node-mapping conversation
pub(crate) fn normalize_mapping_conversation(raw: &Value, normalizer: &Normalizer) -> LmConversation {
    let conversation = ChatGptConversation::from_value(raw);
    let defaults = normalizer.defaults();

    let title = first_non_empty([&conversation.title, &conversation.name]).unwrap_or_default();
    let created_at = normalizer.millis(first_truthy(conversation.created_at_candidates()));

    let arena = NodeArena::from_mapping(&conversation.mapping);
    let system_prompt = select_system_prompt(&arena, normalizer);
    let items = collect_visible_items(&arena, normalizer);
    let turns = group_turns(items);

    let mut step_ids = StepIds::new(created_at);
    let messages = render_turns(turns, &mut step_ids, defaults);

    let mut lm = LmConversation::empty(title, created_at, defaults);
    lm.system_prompt = system_prompt
        .clone()
        .or_else(|| conversation.system_prompt.clone().filter(|s| !s.is_empty()))
        .unwrap_or_default();
    lm.per_chat_prediction_config =
        KvConfig::prediction(defaults, system_prompt.as_deref().unwrap_or_default());
    lm.messages = messages;
    lm.refresh_token_count();
    conversation.passthrough.apply_to(&mut lm);

    tracing::debug!(
        title = %lm.name,
        nodes = arena.len(),
        messages = lm.messages.len(),
        system_prompt_len = lm.system_prompt.chars().count(),
        "normalized mapping conversation"
    );
    lm
}

/// Earliest visible, non-empty `system` message.
///
/// Edited or regenerated system prompts leave several candidates in the
/// mapping; the earliest one is taken as authoritative. Ties keep arena order.
fn select_system_prompt(arena: &NodeArena, normalizer: &Normalizer) -> Option<String> {
    arena
        .iter()
        .filter(|node| node.message.raw_role() == Some("system") && !node.message.is_hidden())
        .filter_map(|node| {
            let text = extract_text(&node.message.content);
            if text.trim().is_empty() {
                return None;
            }
            Some((normalizer.message_millis(&node.message.create_time), text))
        })
        .min_by_key(|(timestamp, _)| *timestamp)
        .map(|(_, text)| text)
}

/// Visible, non-empty messages sorted by (timestamp, role).
///
/// This is where the branching tree becomes one linear transcript: parent
/// links are ignored and alternate branches interleave purely by time.
fn collect_visible_items(arena: &NodeArena, normalizer: &Normalizer) -> Vec<TranscriptItem> {
    let mut items: Vec<TranscriptItem> = arena
        .iter()
        .filter(|node| {
            let hidden = node.message.is_hidden();
            if hidden {
                tracing::trace!(node = %node.id, "skipping hidden message");
            }
            !hidden
        })
        .filter_map(|node| {
            let text = extract_text(&node.message.content);
            if text.trim().is_empty() {
                return None;
            }
            Some(TranscriptItem {
                timestamp_ms: normalizer.message_millis(&node.message.create_time),
                role: node.message.role(),
                text,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        a.timestamp_ms
            .cmp(&b.timestamp_ms)
            .then_with(|| a.role.cmp(&b.role))
    });
    items
}

/// Fold the sorted transcript into turns.
///
/// Each user item is its own turn; a run of assistant items becomes one
/// turn. Other roles (system, tool, ...) are dropped, though they still end
/// an assistant run.
pub(crate) fn group_turns(items: Vec<TranscriptItem>) -> Vec<Turn> {
    let mut turns = Vec::new();
    let mut items = items.into_iter().peekable();

    while let Some(item) = items.next() {
        match item.role.as_str() {
            "user" => turns.push(Turn::User(item.text)),
            "assistant" => {
                let mut texts = vec![item.text];
                while let Some(next) = items.next_if(|next| next.role == "assistant") {
                    texts.push(next.text);
                }
                turns.push(Turn::Assistant(texts));
            }
            _ => {}
        }
    }

    turns
}

fn render_turns(turns: Vec<Turn>, step_ids: &mut StepIds, defaults: &ExportDefaults) -> Vec<LmMessage> {
    turns
        .into_iter()
        .map(|turn| match turn {
            Turn::User(text) => user_message(&text),
            Turn::Assistant(texts) => assistant_message(&texts, step_ids, defaults),
        })
        .collect()
}
