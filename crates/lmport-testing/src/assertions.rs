//! Assertions over exported LM Studio conversation JSON.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;

/// Top-level keys of an exported conversation, in file order.
pub const LM_STUDIO_FIELD_ORDER: [&str; 18] = [
    "name",
    "pinned",
    "createdAt",
    "preset",
    "tokenCount",
    "systemPrompt",
    "messages",
    "usePerChatPredictionConfig",
    "perChatPredictionConfig",
    "clientInput",
    "clientInputFiles",
    "userFilesSizeBytes",
    "lastUsedModel",
    "notes",
    "plugins",
    "pluginConfigs",
    "disabledPluginTools",
    "looseFiles",
];

fn messages(conversation: &Value) -> Result<&Vec<Value>> {
    conversation["messages"]
        .as_array()
        .context("Expected 'messages' array in conversation")
}

/// Assert the role of each message's selected version.
pub fn assert_message_roles(conversation: &Value, expected: &[&str]) -> Result<()> {
    let roles: Vec<&str> = messages(conversation)?
        .iter()
        .map(|m| m["versions"][0]["role"].as_str().unwrap_or("<missing>"))
        .collect();

    if roles != expected {
        anyhow::bail!("Expected roles {:?}, got {:?}", expected, roles);
    }
    Ok(())
}

/// Assert the step count of every assistant message, in order.
pub fn assert_assistant_step_counts(conversation: &Value, expected: &[usize]) -> Result<()> {
    let counts: Vec<usize> = messages(conversation)?
        .iter()
        .filter(|m| m["versions"][0]["role"] == "assistant")
        .map(|m| m["versions"][0]["steps"].as_array().map_or(0, Vec::len))
        .collect();

    if counts != expected {
        anyhow::bail!("Expected assistant step counts {:?}, got {:?}", expected, counts);
    }
    Ok(())
}

/// Assert that every step identifier is a non-empty string and none repeats.
pub fn assert_unique_step_ids(conversation: &Value) -> Result<()> {
    let mut seen = HashSet::new();

    for (i, message) in messages(conversation)?.iter().enumerate() {
        let steps = message["versions"][0]["steps"].as_array();
        for step in steps.into_iter().flatten() {
            let id = step["stepIdentifier"]
                .as_str()
                .filter(|id| !id.is_empty())
                .with_context(|| format!("Message {} has a step without stepIdentifier", i))?;
            if !seen.insert(id.to_string()) {
                anyhow::bail!("Duplicate stepIdentifier {}", id);
            }
        }
    }
    Ok(())
}

/// Assert that the pretty-printed file lists the top-level keys in the
/// order LM Studio writes them.
pub fn assert_field_order(raw: &str) -> Result<()> {
    let mut last = 0;
    for key in LM_STUDIO_FIELD_ORDER {
        let needle = format!("\n  \"{}\":", key);
        let pos = raw
            .find(&needle)
            .with_context(|| format!("Top-level key {} not found", key))?;
        if pos < last {
            anyhow::bail!("Top-level key {} is out of order", key);
        }
        last = pos;
    }
    Ok(())
}
