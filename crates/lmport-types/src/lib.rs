//! Target-side types for lmport.
//!
//! Everything in here describes the LM Studio conversation document that
//! lmport writes, plus the per-run knobs (`ExportDefaults`, `Clock`) that the
//! normalizer needs. No I/O happens in this crate.

pub mod clock;
pub mod conversation;
pub mod defaults;
pub mod error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use conversation::*;
pub use defaults::{DEFAULT_MODEL_NAME, DEFAULT_TEMPERATURE, ExportDefaults};
pub use error::{Error, Result};
