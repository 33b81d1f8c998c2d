//! Quote sources and the cache in front of them.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    time::{Duration, Instant},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("unknown symbol {0}")]
    UnknownSymbol(String),

    #[error("failed to read quotes from {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Something that knows the latest price of a ticker symbol.
///
/// Prices may be delayed by the service; callers must not assume they are
/// current.
pub trait QuoteSource {
    fn price(&mut self, symbol: &str) -> Result<f64, QuoteError>;

    /// The company name the service reports for a symbol, if any.
    fn name(&mut self, _symbol: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Quote {
    price: f64,
    name: Option<String>,
}

/// A fixed table of quotes.
///
/// The text form has one quote per line: `SYMBOL PRICE [NAME...]`. Blank
/// lines and lines starting with `#` are ignored.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StaticQuotes {
    quotes: HashMap<String, Quote>,
}

impl StaticQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, price: f64, name: Option<String>) {
        self.quotes.insert(symbol.into(), Quote { price, name });
    }

    pub fn parse(text: &str) -> Result<Self, QuoteError> {
        let mut quotes = Self::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = |message: &str| QuoteError::Malformed {
                line: index + 1,
                message: message.to_owned(),
            };

            let mut parts = line.split_whitespace();
            let symbol = parts.next().ok_or_else(|| malformed("missing symbol"))?;
            let price = parts
                .next()
                .ok_or_else(|| malformed("missing price"))?
                .parse::<f64>()
                .map_err(|_| malformed("price is not a number"))?;

            let name = parts.collect::<Vec<_>>().join(" ");
            let name = (!name.is_empty()).then_some(name);

            quotes.insert(symbol, price, name);
        }

        Ok(quotes)
    }
}

impl QuoteSource for StaticQuotes {
    fn price(&mut self, symbol: &str) -> Result<f64, QuoteError> {
        self.quotes
            .get(symbol)
            .map(|quote| quote.price)
            .ok_or_else(|| QuoteError::UnknownSymbol(symbol.to_owned()))
    }

    fn name(&mut self, symbol: &str) -> Option<String> {
        self.quotes.get(symbol).and_then(|quote| quote.name.clone())
    }
}

/// Quotes read from a file which some other process keeps up to date.
///
/// The file is re-read on every fetch, in the [StaticQuotes] text form.
#[derive(Debug, Clone)]
pub struct QuoteFile {
    path: PathBuf,
}

impl QuoteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<StaticQuotes, QuoteError> {
        let text = fs::read_to_string(&self.path).map_err(|source| QuoteError::Io {
            path: self.path.clone(),
            source,
        })?;
        StaticQuotes::parse(&text)
    }
}

impl QuoteSource for QuoteFile {
    fn price(&mut self, symbol: &str) -> Result<f64, QuoteError> {
        self.read()?.price(symbol)
    }

    fn name(&mut self, symbol: &str) -> Option<String> {
        self.read().ok()?.name(symbol)
    }
}

/// How long a fetched price stays fresh by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(160);

/// A per-symbol cache in front of a [QuoteSource].
///
/// When a refresh fails the last known price is kept, and the symbol is not
/// retried until the TTL passes again.
pub struct CachedQuotes<S> {
    source: S,
    ttl: Duration,
    cache: HashMap<String, (Option<f64>, Instant)>,
}

impl<S: QuoteSource> CachedQuotes<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: HashMap::new(),
        }
    }

    /// The price for `symbol`, or `None` if it has never been fetched
    /// successfully.
    pub fn price(&mut self, symbol: &str) -> Option<f64> {
        self.price_at(symbol, Instant::now())
    }

    pub fn price_at(&mut self, symbol: &str, now: Instant) -> Option<f64> {
        if let Some(&(price, fetched)) = self.cache.get(symbol)
            && now.saturating_duration_since(fetched) < self.ttl
        {
            return price;
        }

        let price = match self.source.price(symbol) {
            Ok(price) => Some(price),
            Err(err) => {
                log::warn!("price fetch failed for {symbol}: {err}");
                self.cache.get(symbol).and_then(|&(price, _)| price)
            }
        };

        self.cache.insert(symbol.to_owned(), (price, now));
        price
    }

    pub fn name(&mut self, symbol: &str) -> Option<String> {
        self.source.name(symbol)
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
