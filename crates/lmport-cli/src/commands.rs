use crate::args::Cli;
use crate::config::{Config, Settings};
use crate::{logging, routing, writer};
use anyhow::{Context, Result};
use lmport_providers::{Normalizer, SourceShape, read_input, source_title};
use lmport_types::SystemClock;
use serde_json::Value;
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level, cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, &config)?;

    let conversations = load_conversations(&cli.input, cli.id.as_deref(), &cli.keywords)?;
    writer::prepare_outdir(&settings.outdir, cli.clean)?;

    let clock = SystemClock;
    let normalizer = Normalizer::new(&settings.defaults, &clock);
    let written = export_all(&normalizer, &conversations, &settings.outdir)?;

    tracing::info!(count = written, outdir = %settings.outdir.display(), "export finished");
    println!(
        "Exported {} conversation(s) to {}",
        written,
        settings.outdir.display()
    );
    Ok(())
}

fn load_conversations(input: &Path, id: Option<&str>, keywords: &[String]) -> Result<Vec<Value>> {
    if !input.exists() {
        anyhow::bail!("input file not found: {}", input.display());
    }

    let document = read_input(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let conversations = document.select(id, keywords);
    tracing::debug!(count = conversations.len(), "selected conversations");
    Ok(conversations)
}

fn export_all(normalizer: &Normalizer, conversations: &[Value], outdir: &Path) -> Result<usize> {
    let total = conversations.len();

    for (idx, raw) in conversations.iter().enumerate() {
        let raw_title = source_title(raw);
        tracing::debug!(
            index = idx + 1,
            total,
            title = %raw_title,
            shape = SourceShape::detect(raw).as_str(),
            "processing conversation"
        );

        let mut conversation = normalizer.normalize(raw);
        let route = routing::route(&raw_title);
        if let Some(name) = route.name {
            conversation.name = name;
        }

        let path = writer::output_path(outdir, &route.folder, conversation.created_at);
        writer::write_conversation(&path, &conversation)?;

        tracing::debug!(
            path = %path.strip_prefix(outdir).unwrap_or(&path).display(),
            name = %conversation.name,
            messages = conversation.messages.len(),
            "wrote conversation"
        );
    }

    Ok(total)
}
