//! A minimal `log` backend writing to stderr.

use std::str::FromStr;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable overriding the log level, e.g. `debug`.
pub const LOG_ENV: &str = "MATRIX_TICKER_LOG";

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Install the stderr logger.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Work out the log level from `-v`/`-q` counts, with the environment
/// variable taking precedence when it holds a valid level.
pub fn level(verbose: u8, quiet: bool, env: Option<&str>) -> LevelFilter {
    if let Some(level) = env.and_then(|value| LevelFilter::from_str(value.trim()).ok()) {
        return level;
    }

    if quiet {
        return LevelFilter::Error;
    }

    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
