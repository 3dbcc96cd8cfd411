use anyhow::{Context, Result};
use lmport_types::LmConversation;
use std::path::{Path, PathBuf};

/// `<outdir>/<folder>/<createdAt>.conversation.json`
pub fn output_path(outdir: &Path, folder: &str, created_at: i64) -> PathBuf {
    outdir
        .join(folder)
        .join(format!("{}.conversation.json", created_at))
}

/// Create the output directory, removing it first when `clean` is set.
pub fn prepare_outdir(outdir: &Path, clean: bool) -> Result<()> {
    if clean && outdir.exists() {
        std::fs::remove_dir_all(outdir)
            .with_context(|| format!("Failed to clean output directory {}", outdir.display()))?;
        tracing::debug!(outdir = %outdir.display(), "removed previous output");
    }

    std::fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create output directory {}", outdir.display()))
}

/// Write one conversation as pretty-printed JSON, creating parent folders.
///
/// An existing file at `path` is overwritten; returns whether that happened.
pub fn write_conversation(path: &Path, conversation: &LmConversation) -> Result<bool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create folder {}", parent.display()))?;
    }

    let existed = path.exists();
    if existed {
        tracing::warn!(
            path = %path.display(),
            "output file already exists (same createdAt), overwriting"
        );
    }

    let content = serde_json::to_string_pretty(conversation)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(existed)
}
