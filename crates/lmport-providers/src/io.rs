use serde_json::Value;
use std::path::Path;

use crate::filter::filter_conversations;
use crate::{Error, Result};

/// Top-level shape of an input document
#[derive(Debug, Clone, PartialEq)]
pub enum InputDocument {
    /// Array of conversations (a `conversations.json` export)
    Batch(Vec<Value>),
    /// One bare conversation object
    Single(Value),
}

impl InputDocument {
    /// Apply id/keyword selection. A single conversation is always kept.
    pub fn select(self, id: Option<&str>, keywords: &[String]) -> Vec<Value> {
        match self {
            InputDocument::Batch(conversations) => filter_conversations(conversations, id, keywords),
            InputDocument::Single(conversation) => vec![conversation],
        }
    }
}

/// Read and classify an input file
pub fn read_input(path: &Path) -> Result<InputDocument> {
    let text = std::fs::read_to_string(path)?;
    parse_input(&text)
}

/// Classify an input document. Anything but an array or an object is rejected.
pub fn parse_input(text: &str) -> Result<InputDocument> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(conversations) => Ok(InputDocument::Batch(conversations)),
        conversation @ Value::Object(_) => Ok(InputDocument::Single(conversation)),
        other => Err(Error::Parse(format!(
            "input must be a JSON array or a single conversation object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
