// Error types
pub mod error;

// Leaf utilities
pub mod coerce;
pub mod content;
pub mod sanitize;

// Source adapters
pub mod chatgpt;
pub mod lmstudio;

// Shape dispatch
pub mod normalizer;

// Input loading and selection
pub mod filter;
pub mod io;

pub use coerce::{first_truthy, is_truthy, source_title, to_millis};
pub use content::{ContentShape, MAX_EXTRACTED_CHARS, extract_text, extract_text_capped};
pub use error::{Error, Result};
pub use filter::{filter_conversations, searchable_text};
pub use io::{InputDocument, parse_input, read_input};
pub use normalizer::{Normalizer, SourceShape};
pub use sanitize::sanitize_text;
