use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::ExportDefaults;

// ==========================================
// 1. Conversation (one exported file)
// ==========================================

/// LM Studio conversation document.
///
/// Field order matches what LM Studio itself writes, so exported files diff
/// cleanly against files saved by the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LmConversation {
    pub name: String,
    pub pinned: bool,
    /// Creation time in milliseconds; also the output file stem
    pub created_at: i64,
    pub preset: String,
    /// Rough estimate: total characters of all text blocks / 4
    pub token_count: u64,
    pub system_prompt: String,
    pub messages: Vec<LmMessage>,
    pub use_per_chat_prediction_config: bool,
    pub per_chat_prediction_config: KvConfig,
    pub client_input: String,
    pub client_input_files: Vec<Value>,
    pub user_files_size_bytes: u64,
    pub last_used_model: LastUsedModel,
    pub notes: Vec<Value>,
    pub plugins: Vec<Value>,
    pub plugin_configs: Map<String, Value>,
    pub disabled_plugin_tools: Vec<Value>,
    pub loose_files: Vec<Value>,
}

impl LmConversation {
    /// Conversation with no messages and every auxiliary field defaulted
    pub fn empty(name: impl Into<String>, created_at: i64, defaults: &ExportDefaults) -> Self {
        Self {
            name: name.into(),
            pinned: false,
            created_at,
            preset: String::new(),
            token_count: 0,
            system_prompt: String::new(),
            messages: Vec::new(),
            use_per_chat_prediction_config: true,
            per_chat_prediction_config: KvConfig::prediction(defaults, ""),
            client_input: String::new(),
            client_input_files: Vec::new(),
            user_files_size_bytes: 0,
            last_used_model: LastUsedModel::stub(defaults),
            notes: Vec::new(),
            plugins: Vec::new(),
            plugin_configs: Map::new(),
            disabled_plugin_tools: Vec::new(),
            loose_files: Vec::new(),
        }
    }

    /// Recompute `token_count` from the current messages
    pub fn refresh_token_count(&mut self) {
        self.token_count = estimate_token_count(&self.messages);
    }
}

/// Approximate token count: characters across every text block, divided by 4.
///
/// Only version 0 of each message is counted, since that is the only version
/// lmport ever emits.
pub fn estimate_token_count(messages: &[LmMessage]) -> u64 {
    let chars: usize = messages
        .iter()
        .filter_map(LmMessage::primary)
        .flat_map(MessageVersion::texts)
        .map(|text| text.chars().count())
        .sum();
    (chars / 4) as u64
}

// ==========================================
// 2. Messages and versions
// ==========================================

/// One chat message; only `versions[currently_selected]` is meaningful
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LmMessage {
    pub versions: Vec<MessageVersion>,
    pub currently_selected: usize,
}

impl LmMessage {
    /// User turn with a single text block
    pub fn user(text: impl Into<String>) -> Self {
        Self::single_version(MessageVersion::SingleStep(SingleStep {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }))
    }

    /// Assistant turn made of one or more steps
    pub fn assistant(sender_info: SenderInfo, steps: Vec<Step>) -> Self {
        Self::single_version(MessageVersion::MultiStep(MultiStep {
            role: Role::Assistant,
            sender_info,
            steps,
        }))
    }

    fn single_version(version: MessageVersion) -> Self {
        Self {
            versions: vec![version],
            currently_selected: 0,
        }
    }

    /// The authoritative version (index 0)
    pub fn primary(&self) -> Option<&MessageVersion> {
        self.versions.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageVersion {
    SingleStep(SingleStep),
    MultiStep(MultiStep),
}

impl MessageVersion {
    pub fn role(&self) -> Role {
        match self {
            MessageVersion::SingleStep(v) => v.role,
            MessageVersion::MultiStep(v) => v.role,
        }
    }

    /// Every text block in this version, in order
    pub fn texts(&self) -> Vec<&str> {
        match self {
            MessageVersion::SingleStep(v) => v.content.iter().map(ContentBlock::as_text).collect(),
            MessageVersion::MultiStep(v) => v
                .steps
                .iter()
                .flat_map(|step| step.content().iter().map(ContentBlock::as_text))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleStep {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStep {
    pub role: Role,
    pub sender_info: SenderInfo,
    pub steps: Vec<Step>,
}

/// Who produced an assistant turn. Unknown keys are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderInfo {
    pub sender_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SenderInfo {
    pub fn named(sender_name: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            extra: Map::new(),
        }
    }
}

// ==========================================
// 3. Steps and content blocks
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    ContentBlock(ContentBlockStep),
}

impl Step {
    /// Text step with both inclusion flags set
    pub fn text(step_identifier: impl Into<String>, text: impl Into<String>, gen_info: StepGenInfo) -> Self {
        Step::ContentBlock(ContentBlockStep {
            step_identifier: step_identifier.into(),
            content: vec![ContentBlock::text(text)],
            default_should_include_in_context: true,
            should_include_in_context: true,
            gen_info,
        })
    }

    pub fn step_identifier(&self) -> &str {
        match self {
            Step::ContentBlock(step) => &step.step_identifier,
        }
    }

    pub fn content(&self) -> &[ContentBlock] {
        match self {
            Step::ContentBlock(step) => &step.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlockStep {
    pub step_identifier: String,
    pub content: Vec<ContentBlock>,
    pub default_should_include_in_context: bool,
    pub should_include_in_context: bool,
    pub gen_info: StepGenInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text(TextBlock),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock {
            text: text.into(),
            from_draft_model: false,
            is_structural: false,
        })
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text(block) => &block.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    pub from_draft_model: bool,
    pub is_structural: bool,
}

// ==========================================
// 4. Generation info
// ==========================================

/// Generation info attached to a step.
///
/// Freshly built steps get a zeroed `GenInfo` stub; steps re-read from an
/// existing export keep whatever object they already had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepGenInfo {
    Generated(GenInfo),
    Carried(Value),
}

impl StepGenInfo {
    pub fn stub(defaults: &ExportDefaults) -> Self {
        StepGenInfo::Generated(GenInfo::stub(defaults))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenInfo {
    pub indexed_model_identifier: String,
    pub identifier: String,
    pub load_model_config: KvConfig,
    pub prediction_config: KvConfig,
    pub stats: GenerationStats,
}

impl GenInfo {
    /// Placeholder LM Studio expects to exist; lmport cannot know real stats
    pub fn stub(defaults: &ExportDefaults) -> Self {
        Self {
            indexed_model_identifier: defaults.model.clone(),
            identifier: defaults.model.clone(),
            load_model_config: KvConfig::default(),
            prediction_config: KvConfig::default(),
            stats: GenerationStats::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub stop_reason: String,
    pub tokens_per_second: f64,
    pub num_gpu_layers: i64,
    pub time_to_first_token_sec: f64,
    pub total_time_sec: f64,
    pub prompt_tokens_count: u64,
    pub predicted_tokens_count: u64,
    pub total_tokens_count: u64,
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self {
            stop_reason: "eosFound".to_string(),
            tokens_per_second: 0.0,
            num_gpu_layers: -1,
            time_to_first_token_sec: 0.0,
            total_time_sec: 0.0,
            prompt_tokens_count: 0,
            predicted_tokens_count: 0,
            total_tokens_count: 0,
        }
    }
}

// ==========================================
// 5. Config stubs
// ==========================================

/// LM Studio key/value config (`{"fields": [{"key": .., "value": ..}]}`).
/// Unknown keys are carried through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KvConfig {
    pub fields: Vec<KvField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvField {
    pub key: String,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KvField {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            extra: Map::new(),
        }
    }
}

pub const TEMPERATURE_KEY: &str = "llm.prediction.temperature";
pub const SYSTEM_PROMPT_KEY: &str = "llm.prediction.systemPrompt";

impl KvConfig {
    /// Per-chat prediction config: temperature plus a system prompt echo
    pub fn prediction(defaults: &ExportDefaults, system_prompt: &str) -> Self {
        Self {
            fields: vec![
                KvField::new(TEMPERATURE_KEY, json!(defaults.temperature)),
                KvField::new(SYSTEM_PROMPT_KEY, Value::String(system_prompt.to_string())),
            ],
            extra: Map::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }
}

/// Model LM Studio will offer to reload. Unknown keys are carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUsedModel {
    pub identifier: String,
    pub indexed_model_identifier: String,
    pub instance_load_time_config: Value,
    pub instance_operation_time_config: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LastUsedModel {
    pub fn stub(defaults: &ExportDefaults) -> Self {
        Self {
            identifier: defaults.model.clone(),
            indexed_model_identifier: defaults.model.clone(),
            instance_load_time_config: empty_fields(),
            instance_operation_time_config: empty_fields(),
            extra: Map::new(),
        }
    }
}

/// `{"fields": []}`
pub fn empty_fields() -> Value {
    json!({ "fields": [] })
}
