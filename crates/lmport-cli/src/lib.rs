// NOTE: lmport pipeline
//
// read input -> select (id / keywords) -> normalize -> route -> write
//
// Normalization never fails: a malformed conversation degrades to an empty
// one and the batch continues. Only input loading and output writing can
// abort a run.

mod args;
mod commands;
pub mod config;
mod logging;
pub mod routing;
pub mod types;
pub mod writer;

pub use args::Cli;
pub use commands::run;
