//! TestWorld pattern for lmport integration tests.
//!
//! Each world owns a temp directory holding the input files, the output
//! directory and an isolated config path, so no test ever reads the
//! developer's real `~/.config/lmport/config.toml`.

use anyhow::{Context, Result};
use assert_cmd::Command;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Declarative test environment.
///
/// # Example
/// ```no_run
/// use lmport_testing::{MappingConversationBuilder, TestWorld};
///
/// let world = TestWorld::new();
/// let input = world
///     .write_input("conversations.json", &serde_json::json!([
///         MappingConversationBuilder::new("Hello").user("hi", 1.0).build()
///     ]))
///     .unwrap();
///
/// let result = world.run(&[input.to_str().unwrap()]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    outdir: PathBuf,
    config_path: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let outdir = temp_dir.path().join("out");
        let config_path = temp_dir.path().join("config.toml");

        Self {
            temp_dir,
            outdir,
            config_path,
            env_vars: HashMap::new(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Output directory passed to every run via `--outdir`.
    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Config file the CLI sees through `LMPORT_CONFIG`. Absent unless
    /// `with_config` wrote it.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write the isolated config file.
    pub fn with_config(self, contents: &str) -> Self {
        std::fs::write(&self.config_path, contents).expect("Failed to write config");
        self
    }

    /// Write `value` as pretty JSON into the temp dir and return its path.
    pub fn write_input(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        let text = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write input {}", path.display()))?;
        Ok(path)
    }

    /// Write raw text (possibly invalid JSON) into the temp dir.
    pub fn write_raw_input(&self, name: &str, text: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, text)?;
        Ok(path)
    }

    /// Configure a CLI command with this environment's settings.
    ///
    /// Adds `--outdir`, points `LMPORT_CONFIG` at the isolated config path
    /// and clears `RUST_LOG` so log levels come from the arguments only.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--outdir").arg(&self.outdir);
        cmd.current_dir(self.temp_dir.path());
        cmd.env("LMPORT_CONFIG", &self.config_path);
        cmd.env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run the `lmport` binary with `args` in this environment.
    ///
    /// # Note
    /// Uses `Command::cargo_bin()`, so it only works from tests of the crate
    /// that builds the binary.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("lmport")
            .map_err(|e| anyhow::anyhow!("Failed to find lmport binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Every file under the output directory, relative to it, sorted.
    pub fn output_files(&self) -> Vec<PathBuf> {
        if !self.outdir.exists() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.outdir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.outdir)
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect();
        files.sort();
        files
    }

    /// Raw text of an output file.
    pub fn read_output_text(&self, relative: impl AsRef<Path>) -> Result<String> {
        let path = self.outdir.join(relative);
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read output {}", path.display()))
    }

    /// Parsed JSON of an output file.
    pub fn read_output(&self, relative: impl AsRef<Path>) -> Result<Value> {
        let text = self.read_output_text(relative)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
