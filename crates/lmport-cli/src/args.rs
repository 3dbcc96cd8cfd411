use crate::types::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lmport")]
#[command(about = "Convert ChatGPT conversation exports into LM Studio conversations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// conversations.json (array of conversations) or a single conversation file
    pub input: PathBuf,

    /// Only export the conversation with this id
    #[arg(long)]
    pub id: Option<String>,

    /// Only export conversations whose title or text contains any of these
    #[arg(long, num_args = 1..)]
    pub keywords: Vec<String>,

    /// Delete the output directory before writing
    #[arg(long)]
    pub clean: bool,

    /// Output directory [default: lm_conversations_lmstudio]
    #[arg(long)]
    pub outdir: Option<String>,

    /// Model identifier stamped into generated messages
    #[arg(long)]
    pub model: Option<String>,

    /// Temperature stored in the per-chat prediction config
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Config file (default: $LMPORT_CONFIG, then ~/.config/lmport/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Log every conversation and written file
    #[arg(long)]
    pub verbose: bool,

    #[arg(long, default_value = "warn")]
    pub log_level: LogLevel,
}
