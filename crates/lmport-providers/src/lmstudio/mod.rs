//! Re-normalization of files that are already in LM Studio shape.

pub(crate) mod normalize;
pub(crate) mod schema;

pub(crate) use normalize::normalize_transcript_conversation;
pub use normalize::first_block_text;
