use lmport_types::{
    ExportDefaults, KvConfig, KvField, LastUsedModel, LmConversation, LmMessage, SenderInfo, Step,
    StepGenInfo, empty_fields,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::coerce::{first_non_empty, first_truthy, is_truthy};
use crate::lmstudio::schema::{
    TranscriptConversation, TranscriptMessage, TranscriptStep, TranscriptVersion,
};
use crate::normalizer::{Normalizer, StepIds, user_message};
use crate::sanitize::sanitize_text;

/// Rebuild an LM Studio-shaped conversation.
///
/// Only version 0 of each message survives. Text is re-sanitized, missing
/// step identifiers and generation info are synthesized, and the auxiliary
/// fields are copied over with light repair.
pub(crate) fn normalize_transcript_conversation(raw: &Value, normalizer: &Normalizer) -> LmConversation {
    let conversation = TranscriptConversation::from_value(raw);
    let defaults = normalizer.defaults();

    let title = first_non_empty([&conversation.name, &conversation.title]).unwrap_or_default();
    let created_at =
        normalizer.millis(first_truthy([&conversation.created_at, &conversation.create_time]));
    let system_prompt = sanitize_text(
        first_non_empty([&conversation.system_prompt, &conversation.system_prompt_snake])
            .unwrap_or_default(),
    );

    let mut step_ids = StepIds::new(created_at);
    let messages: Vec<LmMessage> = conversation
        .messages
        .iter()
        .filter_map(|message| rebuild_message(message, &mut step_ids, defaults))
        .collect();

    let mut lm = LmConversation::empty(title, created_at, defaults);
    lm.pinned = conversation.pinned.unwrap_or(false);
    lm.preset = conversation.preset.clone().unwrap_or_default();
    lm.use_per_chat_prediction_config = conversation.use_per_chat_prediction_config.unwrap_or(true);
    lm.per_chat_prediction_config =
        repair_prediction_config(&conversation.per_chat_prediction_config, defaults, &system_prompt);
    lm.client_input = conversation.client_input.clone().unwrap_or_default();
    lm.client_input_files = conversation.client_input_files.clone();
    lm.user_files_size_bytes = conversation.user_files_size_bytes.unwrap_or(0);
    lm.last_used_model = repair_last_used_model(conversation.last_used_model.clone(), defaults);
    lm.system_prompt = system_prompt;
    lm.messages = messages;
    lm.refresh_token_count();

    let input_messages = conversation.messages.len();
    conversation.passthrough.apply_to(&mut lm);

    tracing::debug!(
        title = %lm.name,
        in_messages = input_messages,
        out_messages = lm.messages.len(),
        "re-normalized transcript conversation"
    );
    lm
}

fn rebuild_message(
    message: &Value,
    step_ids: &mut StepIds,
    defaults: &ExportDefaults,
) -> Option<LmMessage> {
    let message = TranscriptMessage::deserialize(message).ok()?;
    let version = message.versions.first()?;
    if !version.is_object() {
        return None;
    }
    let version = TranscriptVersion::deserialize(version).ok()?;

    if version.is_user_single_step() {
        return Some(user_message(&first_block_text(&version.content)));
    }

    let steps = version
        .steps
        .iter()
        .map(|step| rebuild_step(step, step_ids, defaults))
        .collect();
    Some(LmMessage::assistant(
        repair_sender_info(version.sender_info, defaults),
        steps,
    ))
}

fn rebuild_step(step: &Value, step_ids: &mut StepIds, defaults: &ExportDefaults) -> Step {
    let step = TranscriptStep::deserialize(step).unwrap_or_default();

    let step_identifier = step
        .step_identifier
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| step_ids.next_id());
    let gen_info = if step.gen_info.is_object() && is_truthy(&step.gen_info) {
        StepGenInfo::Carried(step.gen_info)
    } else {
        StepGenInfo::stub(defaults)
    };

    Step::text(
        step_identifier,
        sanitize_text(&first_block_text(&step.content)),
        gen_info,
    )
}

/// Text of the first content block.
///
/// Accepts the current `[{"type": "text", "text": ...}]` shape and the older
/// bare-string `["..."]` shape.
pub fn first_block_text(content: &Value) -> String {
    match content.as_array().and_then(|blocks| blocks.first()) {
        Some(Value::Object(block)) => block
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}

fn repair_sender_info(sender_info: Option<Map<String, Value>>, defaults: &ExportDefaults) -> SenderInfo {
    let mut extra = sender_info.unwrap_or_default();
    let sender_name = match extra.shift_remove("senderName") {
        Some(Value::String(name)) if !name.is_empty() => name,
        _ => defaults.model.clone(),
    };
    SenderInfo { sender_name, extra }
}

/// Carry a config that already has fields; otherwise rebuild the default one.
fn repair_prediction_config(raw: &Value, defaults: &ExportDefaults, system_prompt: &str) -> KvConfig {
    let mut extra = raw.as_object().cloned().unwrap_or_default();
    let raw_fields = match extra.shift_remove("fields") {
        Some(Value::Array(fields)) if !fields.is_empty() => fields,
        _ => return KvConfig::prediction(defaults, system_prompt),
    };

    let fields = raw_fields
        .into_iter()
        .filter_map(|field| match KvField::deserialize(&field) {
            Ok(field) => Some(field),
            Err(err) => {
                tracing::warn!(%field, error = %err, "dropping malformed prediction config field");
                None
            }
        })
        .collect();

    KvConfig { fields, extra }
}

fn repair_last_used_model(raw: Option<Map<String, Value>>, defaults: &ExportDefaults) -> LastUsedModel {
    let mut extra = raw.unwrap_or_default();
    let mut identifier_or_default = |key: &str| match extra.shift_remove(key) {
        Some(Value::String(id)) if !id.is_empty() => id,
        _ => defaults.model.clone(),
    };
    let identifier = identifier_or_default("identifier");
    let indexed_model_identifier = identifier_or_default("indexedModelIdentifier");

    let instance_load_time_config = extra
        .shift_remove("instanceLoadTimeConfig")
        .unwrap_or_else(empty_fields);
    let instance_operation_time_config = extra
        .shift_remove("instanceOperationTimeConfig")
        .unwrap_or_else(empty_fields);

    LastUsedModel {
        identifier,
        indexed_model_identifier,
        instance_load_time_config,
        instance_operation_time_config,
        extra,
    }
}
