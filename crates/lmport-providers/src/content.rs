//! Content Extractor: flattens a message `content` value into plain text.
//!
//! ChatGPT exports are inconsistent about the content shape. Observed forms:
//! a bare string, `{"parts": [...]}`, `{"text": "..."}`, a bare list, and
//! arbitrary nestings of those. Each visited value is classified once into a
//! `ContentShape` and handled by exactly one arm.

use serde_json::{Map, Value};

/// Stop collecting once this many characters have been gathered
pub const MAX_EXTRACTED_CHARS: usize = 2_000_000;

const PART_SEPARATOR: &str = "\n\n";

/// Borrowed classification of one content value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentShape<'a> {
    /// `null`, numbers, booleans
    Empty,
    /// Bare string
    Text(&'a str),
    /// Object with an ordered `parts` array
    Parts(&'a [Value]),
    /// Object with a string `text` field (and no `parts` array)
    TextField(&'a str),
    /// Any other object; every value is visited
    Bag(&'a Map<String, Value>),
    /// Bare array
    List(&'a [Value]),
}

impl<'a> ContentShape<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => ContentShape::Text(s),
            Value::Array(items) => ContentShape::List(items),
            Value::Object(map) => {
                if let Some(Value::Array(parts)) = map.get("parts") {
                    ContentShape::Parts(parts)
                } else if let Some(Value::String(text)) = map.get("text") {
                    ContentShape::TextField(text)
                } else {
                    ContentShape::Bag(map)
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => ContentShape::Empty,
        }
    }
}

/// Extract text with the default size cap
pub fn extract_text(content: &Value) -> String {
    extract_text_capped(content, MAX_EXTRACTED_CHARS)
}

/// Extract text, joining non-empty pieces with a blank line.
///
/// Uses an explicit work-list, so nesting depth never touches the call
/// stack. Once more than `max_chars` characters are collected the walk stops
/// and whatever was gathered so far is returned.
pub fn extract_text_capped(content: &Value, max_chars: usize) -> String {
    let mut pending: Vec<&Value> = vec![content];
    let mut pieces: Vec<&str> = Vec::new();
    let mut collected = 0usize;

    while let Some(value) = pending.pop() {
        match ContentShape::classify(value) {
            ContentShape::Empty => {}
            ContentShape::Text(text) | ContentShape::TextField(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    collected += text.chars().count();
                    pieces.push(text);
                }
            }
            // Pushed in reverse so they pop in document order
            ContentShape::Parts(items) | ContentShape::List(items) => {
                pending.extend(items.iter().rev());
            }
            ContentShape::Bag(map) => {
                pending.extend(map.values().rev());
            }
        }

        if collected > max_chars {
            break;
        }
    }

    pieces.join(PART_SEPARATOR)
}
