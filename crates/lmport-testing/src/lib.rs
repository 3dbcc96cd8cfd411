//! Testing infrastructure for lmport integration tests.
//!
//! - `TestWorld`: isolated temp directory, input files and CLI execution
//! - `fixtures`: builders for ChatGPT and LM Studio conversation JSON
//! - `assertions`: checks over exported conversation files
//!
//! Everything here speaks `serde_json::Value` so the library crates can
//! use it as a dev-dependency without a cycle.

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use fixtures::{MappingConversationBuilder, TranscriptConversationBuilder};
pub use world::{CliResult, TestWorld};
