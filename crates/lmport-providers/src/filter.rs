//! Conversation selection by id or keyword.

use serde_json::Value;

use crate::coerce::source_title;
use crate::content::extract_text;
use crate::lmstudio::first_block_text;

/// Select conversations from a batch.
///
/// A non-empty `id` wins outright: only conversations whose `id` equals it
/// are kept and keywords are ignored. Otherwise, with keywords present, a
/// conversation is kept when any keyword appears (case-insensitively) in its
/// title or its extracted text. With neither, everything is kept.
pub fn filter_conversations(
    conversations: Vec<Value>,
    id: Option<&str>,
    keywords: &[String],
) -> Vec<Value> {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        return conversations
            .into_iter()
            .filter(|c| c.get("id").and_then(Value::as_str) == Some(id))
            .collect();
    }

    if keywords.is_empty() {
        return conversations;
    }

    let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    conversations
        .into_iter()
        .filter(|c| matches_keywords(c, &needles))
        .collect()
}

fn matches_keywords(conversation: &Value, needles: &[String]) -> bool {
    let title = source_title(conversation).to_lowercase();
    if needles.iter().any(|needle| title.contains(needle.as_str())) {
        return true;
    }

    let text = searchable_text(conversation).to_lowercase();
    needles.iter().any(|needle| text.contains(needle.as_str()))
}

/// All message text of a conversation, for keyword search.
///
/// Mapping conversations contribute every node's extracted content;
/// transcript conversations contribute the text blocks of version 0.
pub fn searchable_text(conversation: &Value) -> String {
    let mut pieces: Vec<String> = Vec::new();

    if let Some(mapping) = conversation.get("mapping").and_then(Value::as_object) {
        pieces.extend(
            mapping
                .values()
                .filter_map(|node| node.get("message"))
                .map(|message| extract_text(message.get("content").unwrap_or(&Value::Null))),
        );
    } else if let Some(messages) = conversation.get("messages").and_then(Value::as_array) {
        for version in messages.iter().filter_map(|m| m.pointer("/versions/0")) {
            if let Some(content) = version.get("content") {
                pieces.push(first_block_text(content));
            }
            let steps = version.get("steps").and_then(Value::as_array);
            for step in steps.into_iter().flatten() {
                pieces.push(first_block_text(step.get("content").unwrap_or(&Value::Null)));
            }
        }
    }

    pieces.retain(|piece| !piece.is_empty());
    pieces.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch() -> Vec<Value> {
        vec![
            json!({
                "id": "c1",
                "title": "Rust borrow checker",
                "mapping": {
                    "n1": {"message": {"author": {"role": "user"}, "content": {"parts": ["lifetimes?"]}}}
                }
            }),
            json!({
                "id": "c2",
                "title": "Dinner ideas",
                "mapping": {
                    "n1": {"message": {"author": {"role": "user"}, "content": {"parts": ["Pasta with PESTO"]}}}
                }
            }),
            json!({
                "id": "c3",
                "name": "Old export",
                "messages": [
                    {"versions": [{"type": "singleStep", "role": "user", "content": [{"type": "text", "text": "tell me about Tokio"}]}]}
                ]
            }),
        ]
    }

    fn ids(conversations: &[Value]) -> Vec<&str> {
        conversations
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        assert_eq!(filter_conversations(batch(), None, &[]).len(), 3);
        assert_eq!(filter_conversations(batch(), Some(""), &[]).len(), 3);
    }

    #[test]
    fn test_id_is_exact_and_exclusive() {
        let kept = filter_conversations(batch(), Some("c2"), &["rust".to_string()]);
        assert_eq!(ids(&kept), vec!["c2"]);

        assert!(filter_conversations(batch(), Some("c"), &[]).is_empty());
    }

    #[test]
    fn test_keyword_matches_title_case_insensitively() {
        let kept = filter_conversations(batch(), None, &["BORROW".to_string()]);
        assert_eq!(ids(&kept), vec!["c1"]);
    }

    #[test]
    fn test_keyword_matches_content() {
        let kept = filter_conversations(batch(), None, &["pesto".to_string()]);
        assert_eq!(ids(&kept), vec!["c2"]);

        let kept = filter_conversations(batch(), None, &["tokio".to_string()]);
        assert_eq!(ids(&kept), vec!["c3"]);
    }

    #[test]
    fn test_any_keyword_is_enough() {
        let kept = filter_conversations(
            batch(),
            None,
            &["nothing-here".to_string(), "dinner".to_string()],
        );
        assert_eq!(ids(&kept), vec!["c2"]);
    }

    #[test]
    fn test_searchable_text_ignores_step_metadata() {
        let conv = json!({
            "messages": [{"versions": [{
                "type": "multiStep",
                "role": "assistant",
                "senderInfo": {"senderName": "secret-model"},
                "steps": [{"type": "contentBlock", "stepIdentifier": "1-0", "content": [{"type": "text", "text": "visible"}]}]
            }]}]
        });
        assert_eq!(searchable_text(&conv), "visible");
    }
}
