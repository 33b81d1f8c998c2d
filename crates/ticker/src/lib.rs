//! `matrix-ticker` scrolls stock prices across a chain of 8x8 LED panels.
//!
//! Names and prices are rendered with fonts converted by `matrix-font-bdf`,
//! laid out into one long [PixelStrip](matrix_font_core::PixelStrip) by the
//! [Board](board::Board), and scrolled one column per frame onto a
//! [MatrixDisplay](display::MatrixDisplay).

pub mod board;
pub mod config;
pub mod display;
pub mod format;
pub mod logger;
pub mod quote;
pub mod ticker;

pub use board::{Board, Entry, Layout, Scroller};
pub use config::Config;
pub use display::{DisplayError, MatrixDisplay, TerminalDisplay};
pub use quote::{CachedQuotes, QuoteError, QuoteFile, QuoteSource, StaticQuotes};
pub use ticker::Ticker;
