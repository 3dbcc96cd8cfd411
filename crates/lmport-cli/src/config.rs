use crate::args::Cli;
use anyhow::{Context, Result};
use lmport_types::ExportDefaults;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Output directory used when neither the flag nor the config sets one
pub const DEFAULT_OUTDIR: &str = "lm_conversations_lmstudio";

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "LMPORT_CONFIG";

/// Resolve the config file path based on priority:
/// 1. Explicit `--config` path (with tilde expansion)
/// 2. LMPORT_CONFIG environment variable (with tilde expansion)
/// 3. `<config dir>/lmport/config.toml`
pub fn resolve_config_path(explicit_path: Option<&str>) -> Option<PathBuf> {
    resolve_config_path_with(explicit_path, std::env::var(CONFIG_ENV).ok())
}

fn resolve_config_path_with(explicit_path: Option<&str>, env_path: Option<String>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(expand_tilde(path));
    }

    if let Some(env_path) = env_path.filter(|p| !p.is_empty()) {
        return Some(expand_tilde(&env_path));
    }

    dirs::config_dir().map(|dir| dir.join("lmport").join("config.toml"))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
}

/// `[export]` table; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub outdir: Option<String>,
}

impl Config {
    /// Load from `path`; a missing file yields the default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load the config `--config` / `LMPORT_CONFIG` / the default path points at.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        match resolve_config_path(explicit_path) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Effective values for one run: CLI flag, then config, then built-in default.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub defaults: ExportDefaults,
    pub outdir: PathBuf,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let builtin = ExportDefaults::default();
        let export = &config.export;

        let model = cli
            .model
            .clone()
            .or_else(|| export.model.clone())
            .unwrap_or(builtin.model);
        let temperature = cli
            .temperature
            .or(export.temperature)
            .unwrap_or(builtin.temperature);
        let defaults = ExportDefaults::new(model, temperature);
        defaults.validate()?;

        let outdir = cli
            .outdir
            .as_deref()
            .or(export.outdir.as_deref())
            .unwrap_or(DEFAULT_OUTDIR);

        Ok(Self {
            defaults,
            outdir: expand_tilde(outdir),
        })
    }
}
