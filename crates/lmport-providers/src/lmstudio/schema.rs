use serde::Deserialize;
use serde_json::{Map, Value};

use crate::coerce::lenient;
use crate::normalizer::PassthroughFields;

/// A conversation previously written by LM Studio (or by lmport)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptConversation {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default, rename = "create_time")]
    pub create_time: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub system_prompt: Option<String>,
    #[serde(default, rename = "system_prompt", deserialize_with = "lenient")]
    pub system_prompt_snake: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub messages: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub pinned: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub preset: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub use_per_chat_prediction_config: Option<bool>,
    #[serde(default)]
    pub per_chat_prediction_config: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub client_input: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub client_input_files: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub user_files_size_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_used_model: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub passthrough: PassthroughFields,
}

impl TranscriptConversation {
    pub fn from_value(raw: &Value) -> Self {
        Self::deserialize(raw).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TranscriptMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub versions: Vec<Value>,
}

/// Version 0 of a message; later versions are never read
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptVersion {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub steps: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender_info: Option<Map<String, Value>>,
}

impl TranscriptVersion {
    pub fn is_user_single_step(&self) -> bool {
        self.kind.as_deref() == Some("singleStep")
            && self
                .role
                .as_deref()
                .is_some_and(|role| role.eq_ignore_ascii_case("user"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptStep {
    #[serde(default)]
    pub content: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub step_identifier: Option<String>,
    #[serde(default)]
    pub gen_info: Value,
}
