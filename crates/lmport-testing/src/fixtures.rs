//! Builders for source conversation JSON.
//!
//! Produce the two input shapes the CLI accepts: ChatGPT node-mapping
//! conversations and previously exported LM Studio transcripts.

use serde_json::{Map, Value, json};

/// Builds a ChatGPT `conversations.json` entry.
///
/// Nodes are numbered `node-0`, `node-1`, ... in insertion order and chained
/// through `parent`, the way a linear ChatGPT thread looks.
#[derive(Debug, Clone)]
pub struct MappingConversationBuilder {
    fields: Map<String, Value>,
    mapping: Map<String, Value>,
    last_node: Option<String>,
}

impl MappingConversationBuilder {
    pub fn new(title: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!(title));
        fields.insert("create_time".to_string(), json!(1_700_000_000.0));
        Self {
            fields,
            mapping: Map::new(),
            last_node: None,
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.field("id", json!(id))
    }

    pub fn create_time(self, create_time: impl Into<Value>) -> Self {
        self.field("create_time", create_time.into())
    }

    /// Conversation-level `system_prompt`, used when no system node qualifies.
    pub fn system_prompt(self, prompt: &str) -> Self {
        self.field("system_prompt", json!(prompt))
    }

    /// Set any top-level field.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn user(self, text: &str, create_time: impl Into<Value>) -> Self {
        self.message("user", json!({"content_type": "text", "parts": [text]}), create_time)
    }

    pub fn assistant(self, text: &str, create_time: impl Into<Value>) -> Self {
        self.message("assistant", json!({"content_type": "text", "parts": [text]}), create_time)
    }

    pub fn system(self, text: &str, create_time: impl Into<Value>) -> Self {
        self.message("system", json!({"content_type": "text", "parts": [text]}), create_time)
    }

    /// A message flagged `is_visually_hidden_from_conversation`.
    pub fn hidden(self, role: &str, text: &str, create_time: impl Into<Value>) -> Self {
        let message = json!({
            "author": {"role": role},
            "content": {"content_type": "text", "parts": [text]},
            "create_time": create_time.into(),
            "metadata": {"is_visually_hidden_from_conversation": true}
        });
        self.node(Some(message))
    }

    /// A message with arbitrary `content`.
    pub fn message(self, role: &str, content: Value, create_time: impl Into<Value>) -> Self {
        let message = json!({
            "author": {"role": role},
            "content": content,
            "create_time": create_time.into(),
            "metadata": {}
        });
        self.node(Some(message))
    }

    /// A node with no message, like the root of every real export.
    pub fn empty_node(self) -> Self {
        self.node(None)
    }

    fn node(mut self, message: Option<Value>) -> Self {
        let id = format!("node-{}", self.mapping.len());
        let parent = self.last_node.replace(id.clone());
        self.mapping.insert(
            id.clone(),
            json!({
                "id": id,
                "message": message,
                "parent": parent,
                "children": []
            }),
        );
        self
    }

    pub fn build(self) -> Value {
        let mut fields = self.fields;
        fields.insert("mapping".to_string(), Value::Object(self.mapping));
        Value::Object(fields)
    }
}

/// Builds an LM Studio conversation as a previous export would have left it.
#[derive(Debug, Clone)]
pub struct TranscriptConversationBuilder {
    fields: Map<String, Value>,
    messages: Vec<Value>,
}

impl TranscriptConversationBuilder {
    pub fn new(name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("createdAt".to_string(), json!(1_700_000_000_000_i64));
        Self {
            fields,
            messages: Vec::new(),
        }
    }

    pub fn created_at(self, created_at: impl Into<Value>) -> Self {
        self.field("createdAt", created_at.into())
    }

    pub fn system_prompt(self, prompt: &str) -> Self {
        self.field("systemPrompt", json!(prompt))
    }

    /// Set any top-level field.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn user(mut self, text: &str) -> Self {
        self.messages.push(json!({
            "versions": [{
                "type": "singleStep",
                "role": "user",
                "content": [{"type": "text", "text": text}]
            }],
            "currentlySelected": 0
        }));
        self
    }

    /// Assistant message whose steps carry no identifier or genInfo.
    pub fn assistant(self, texts: &[&str]) -> Self {
        let steps = texts
            .iter()
            .map(|text| {
                json!({
                    "type": "contentBlock",
                    "content": [{"type": "text", "text": text}]
                })
            })
            .collect();
        self.assistant_steps(steps)
    }

    /// Assistant message with caller-supplied raw steps.
    pub fn assistant_steps(mut self, steps: Vec<Value>) -> Self {
        self.messages.push(json!({
            "versions": [{
                "type": "multiStep",
                "role": "assistant",
                "senderInfo": {"senderName": "earlier-model"},
                "steps": steps
            }],
            "currentlySelected": 0
        }));
        self
    }

    /// Append a raw message value.
    pub fn raw_message(mut self, message: Value) -> Self {
        self.messages.push(message);
        self
    }

    pub fn build(self) -> Value {
        let mut fields = self.fields;
        fields.insert("messages".to_string(), Value::Array(self.messages));
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_nodes_are_chained() {
        let conv = MappingConversationBuilder::new("t")
            .empty_node()
            .user("hi", 1.0)
            .build();

        assert_eq!(conv["mapping"]["node-0"]["message"], Value::Null);
        assert_eq!(conv["mapping"]["node-1"]["parent"], json!("node-0"));
        assert_eq!(conv["mapping"]["node-1"]["message"]["author"]["role"], "user");
    }

    #[test]
    fn test_transcript_shape() {
        let conv = TranscriptConversationBuilder::new("n")
            .user("q")
            .assistant(&["a", "b"])
            .build();

        let messages = conv["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["versions"][0]["steps"].as_array().unwrap().len(), 2);
    }
}
