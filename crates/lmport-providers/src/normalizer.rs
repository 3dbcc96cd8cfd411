use lmport_types::{
    Clock, ExportDefaults, LmConversation, LmMessage, SenderInfo, Step, StepGenInfo,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::coerce::{first_truthy, lenient, source_title, to_millis};
use crate::sanitize::sanitize_text;
use crate::{chatgpt, lmstudio};

/// Which of the supported input shapes a conversation object has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    /// ChatGPT export: `mapping` object of message nodes
    Mapping,
    /// Previously exported LM Studio file: `messages` array
    Transcript,
    /// Neither; normalizes to an empty conversation
    Unknown,
}

impl SourceShape {
    pub fn detect(raw: &Value) -> Self {
        if raw.get("mapping").is_some_and(Value::is_object) {
            SourceShape::Mapping
        } else if raw.get("messages").is_some_and(Value::is_array) {
            SourceShape::Transcript
        } else {
            SourceShape::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceShape::Mapping => "mapping",
            SourceShape::Transcript => "messages",
            SourceShape::Unknown => "none",
        }
    }
}

/// Converts one source conversation into an LM Studio conversation.
///
/// Holds no mutable state: step counters live inside each `normalize` call,
/// so a single `Normalizer` can be shared across threads.
#[derive(Clone, Copy)]
pub struct Normalizer<'a> {
    defaults: &'a ExportDefaults,
    clock: &'a dyn Clock,
}

impl<'a> Normalizer<'a> {
    pub fn new(defaults: &'a ExportDefaults, clock: &'a dyn Clock) -> Self {
        Self { defaults, clock }
    }

    pub fn defaults(&self) -> &ExportDefaults {
        self.defaults
    }

    /// Normalize any supported shape. Never fails; malformed input degrades
    /// to an empty conversation.
    pub fn normalize(&self, raw: &Value) -> LmConversation {
        match SourceShape::detect(raw) {
            SourceShape::Mapping => chatgpt::normalize_mapping_conversation(raw, self),
            SourceShape::Transcript => lmstudio::normalize_transcript_conversation(raw, self),
            SourceShape::Unknown => self.empty_conversation(raw),
        }
    }

    /// Timestamp to milliseconds, falling back to the injected clock
    pub(crate) fn millis(&self, value: &Value) -> i64 {
        to_millis(value, self.clock)
    }

    /// Per-message timestamp: falsy values mean epoch, not "now"
    pub(crate) fn message_millis(&self, value: &Value) -> i64 {
        self.millis(first_truthy([value, &Value::from(0)]))
    }

    fn empty_conversation(&self, raw: &Value) -> LmConversation {
        let created_at = self.millis(first_truthy(
            ["create_time", "createdAt"].map(|key| raw.get(key).unwrap_or(&Value::Null)),
        ));
        tracing::warn!(
            title = %source_title(raw),
            "conversation has neither mapping nor messages, writing an empty conversation"
        );
        LmConversation::empty(source_title(raw), created_at, self.defaults)
    }
}

/// Step identifiers `<createdAt>-<n>`, counted across the whole conversation
#[derive(Debug)]
pub(crate) struct StepIds {
    created_at: i64,
    next: usize,
}

impl StepIds {
    pub fn new(created_at: i64) -> Self {
        Self { created_at, next: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.created_at, self.next);
        self.next += 1;
        id
    }
}

/// Single-step user message from raw text
pub(crate) fn user_message(text: &str) -> LmMessage {
    LmMessage::user(sanitize_text(text))
}

/// Multi-step assistant message, one freshly identified step per text
pub(crate) fn assistant_message<S: AsRef<str>>(
    texts: &[S],
    step_ids: &mut StepIds,
    defaults: &ExportDefaults,
) -> LmMessage {
    let steps = texts
        .iter()
        .map(|text| {
            Step::text(
                step_ids.next_id(),
                sanitize_text(text.as_ref()),
                StepGenInfo::stub(defaults),
            )
        })
        .collect();
    LmMessage::assistant(SenderInfo::named(defaults.model.clone()), steps)
}

/// Arrays and maps copied verbatim from the source conversation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PassthroughFields {
    #[serde(default, deserialize_with = "lenient")]
    pub notes: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub plugins: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub plugin_configs: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub disabled_plugin_tools: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub loose_files: Vec<Value>,
}

impl PassthroughFields {
    pub fn apply_to(self, conversation: &mut LmConversation) {
        conversation.notes = self.notes;
        conversation.plugins = self.plugins;
        conversation.plugin_configs = self.plugin_configs;
        conversation.disabled_plugin_tools = self.disabled_plugin_tools;
        conversation.loose_files = self.loose_files;
    }
}
