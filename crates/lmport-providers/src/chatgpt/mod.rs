//! ChatGPT `conversations.json` (node-mapping) adapter.

pub(crate) mod normalize;
pub(crate) mod schema;

pub(crate) use normalize::normalize_mapping_conversation;
