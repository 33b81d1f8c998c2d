//! Board settings and their defaults.

use std::{collections::HashMap, fs, io, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::board::Layout;
use crate::quote::DEFAULT_TTL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("line {0}: expected `SYMBOL NAME`")]
    Malformed(usize),
}

/// Everything the board loop needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Ticker symbols, in display order
    pub symbols: Vec<String>,
    /// Display names overriding whatever the quote source reports
    pub names: HashMap<String, String>,
    /// Number of chained 8x8 panels
    pub panels: usize,
    /// LED intensity, 0 to 15
    pub brightness: u8,
    /// Delay between scroll steps
    pub frame_delay: Duration,
    /// Pause after the strip has scrolled past
    pub cycle_pause: Duration,
    pub cache_ttl: Duration,
    pub layout: Layout,
}

const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "NVDA", "TSLA", "7203.T", "6758.T", "9984.T", "2914.T", "7011.T", "8058.T", "9104.T",
];

const DEFAULT_NAMES: &[(&str, &str)] = &[
    ("AAPL", "Ａｐｐｌｅ"),
    ("NVDA", "ＮＶＩＤＩＡ"),
    ("TSLA", "Ｔｅｓｌａ"),
    ("7203.T", "トヨタ"),
    ("6758.T", "ＳＯＮＹ"),
    ("9984.T", "ソフトバンクＧ"),
    ("2914.T", "ＪＴ"),
    ("7011.T", "三菱重工"),
    ("8058.T", "三菱商事"),
    ("9104.T", "商船三井"),
];

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            names: DEFAULT_NAMES
                .iter()
                .map(|(symbol, name)| (symbol.to_string(), name.to_string()))
                .collect(),
            panels: 4,
            brightness: 1,
            frame_delay: Duration::from_millis(50),
            cycle_pause: Duration::from_secs(1),
            cache_ttl: DEFAULT_TTL,
            layout: Layout::default(),
        }
    }
}

/// Parse a name mapping: one `SYMBOL NAME` pair per line, where the name
/// may contain spaces. Blank lines and `#` comments are ignored.
pub fn parse_names(text: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut names = HashMap::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((symbol, name)) = line.split_once(char::is_whitespace) else {
            return Err(ConfigError::Malformed(index + 1));
        };

        names.insert(symbol.to_owned(), name.trim().to_owned());
    }

    Ok(names)
}

pub fn load_names(path: impl Into<PathBuf>) -> Result<HashMap<String, String>, ConfigError> {
    let path = path.into();
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
    parse_names(&text)
}
