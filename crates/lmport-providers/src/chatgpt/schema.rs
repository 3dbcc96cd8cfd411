use serde::Deserialize;
use serde_json::{Map, Value};

use crate::coerce::{is_truthy, lenient};
use crate::normalizer::PassthroughFields;

/// One entry of a ChatGPT export array
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatGptConversation {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default)]
    pub create_time: Value,
    #[serde(default, rename = "CreatedAt")]
    pub created_at_pascal: Value,
    #[serde(default, rename = "createdAt")]
    pub created_at_camel: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub system_prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub mapping: Map<String, Value>,
    #[serde(flatten)]
    pub passthrough: PassthroughFields,
}

impl ChatGptConversation {
    pub fn from_value(raw: &Value) -> Self {
        Self::deserialize(raw).unwrap_or_default()
    }

    /// Creation time candidates, in priority order
    pub fn created_at_candidates(&self) -> [&Value; 3] {
        [&self.create_time, &self.created_at_pascal, &self.created_at_camel]
    }
}

/// A mapping node; structural nodes (e.g. the root) carry no message
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MappingNode {
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<NodeMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NodeMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<Author>,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub create_time: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<MessageMetadata>,
}

impl NodeMessage {
    /// Raw author role, if it is a string
    pub fn raw_role(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.role.as_str())
    }

    /// Lowercased role; absent or non-string roles count as `user`
    pub fn role(&self) -> String {
        self.raw_role()
            .map(str::to_lowercase)
            .unwrap_or_else(|| "user".to_string())
    }

    pub fn is_hidden(&self) -> bool {
        self.metadata
            .as_ref()
            .is_some_and(|m| is_truthy(&m.is_visually_hidden_from_conversation))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Author {
    #[serde(default)]
    pub role: Value,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageMetadata {
    #[serde(default)]
    pub is_visually_hidden_from_conversation: Value,
}

/// Message-bearing nodes of one conversation, stored by index.
///
/// Parent/child links are never followed: the tree is flattened into a plain
/// list and ordering comes from timestamps alone, which also means a
/// malformed mapping with cycles cannot trap the walk.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<ArenaNode>,
}

#[derive(Debug)]
pub(crate) struct ArenaNode {
    pub id: String,
    pub message: NodeMessage,
}

impl NodeArena {
    pub fn from_mapping(mapping: &Map<String, Value>) -> Self {
        let nodes = mapping
            .iter()
            .filter_map(|(id, node)| {
                let node = MappingNode::deserialize(node).ok()?;
                Some(ArenaNode {
                    id: id.clone(),
                    message: node.message?,
                })
            })
            .collect();
        Self { nodes }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArenaNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arena_skips_nodes_without_message() {
        let mapping = json!({
            "root": { "id": "root", "message": null, "children": ["a"] },
            "a": { "id": "a", "message": { "author": { "role": "user" }, "content": "hi" } },
            "junk": "not-a-node",
            "b": { "message": "not-an-object" }
        });
        let arena = NodeArena::from_mapping(mapping.as_object().unwrap());
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.iter().next().unwrap().id, "a");
    }

    #[test]
    fn test_role_defaults_and_lowercases() {
        let msg: NodeMessage = serde_json::from_value(json!({ "author": { "role": "Assistant" } })).unwrap();
        assert_eq!(msg.role(), "assistant");

        let msg: NodeMessage = serde_json::from_value(json!({ "author": { "role": 7 } })).unwrap();
        assert_eq!(msg.role(), "user");
        assert_eq!(msg.raw_role(), None);

        let msg: NodeMessage = serde_json::from_value(json!({ "author": "tool" })).unwrap();
        assert_eq!(msg.role(), "user");
    }

    #[test]
    fn test_hidden_flag_uses_truthiness() {
        let hidden: NodeMessage = serde_json::from_value(json!({
            "metadata": { "is_visually_hidden_from_conversation": true }
        }))
        .unwrap();
        assert!(hidden.is_hidden());

        let visible: NodeMessage = serde_json::from_value(json!({
            "metadata": { "is_visually_hidden_from_conversation": false }
        }))
        .unwrap();
        assert!(!visible.is_hidden());

        let no_meta: NodeMessage = serde_json::from_value(json!({})).unwrap();
        assert!(!no_meta.is_hidden());
    }

    #[test]
    fn test_conversation_tolerates_wrong_types() {
        let conv = ChatGptConversation::from_value(&json!({
            "title": 12,
            "name": "fallback",
            "mapping": "oops",
            "notes": {"not": "a list"}
        }));
        assert_eq!(conv.title, None);
        assert_eq!(conv.name.as_deref(), Some("fallback"));
        assert!(conv.mapping.is_empty());
        assert!(conv.passthrough.notes.is_empty());
    }
}
