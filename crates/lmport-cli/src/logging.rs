use crate::types::LogLevel;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Level actually used: `--verbose` raises anything quieter than debug.
pub(crate) fn effective_level(level: LogLevel, verbose: bool) -> LogLevel {
    if verbose { level.max(LogLevel::Debug) } else { level }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
pub(crate) fn init(level: LogLevel, verbose: bool) {
    let level = effective_level(level, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // A subscriber may already exist when `run` is called more than once in-process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_raises_to_debug() {
        assert_eq!(effective_level(LogLevel::Warn, true), LogLevel::Debug);
        assert_eq!(effective_level(LogLevel::Error, true), LogLevel::Debug);
    }

    #[test]
    fn test_verbose_keeps_trace() {
        assert_eq!(effective_level(LogLevel::Trace, true), LogLevel::Trace);
    }

    #[test]
    fn test_without_verbose_level_is_unchanged() {
        assert_eq!(effective_level(LogLevel::Warn, false), LogLevel::Warn);
    }
}
