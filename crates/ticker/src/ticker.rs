//! The refresh-and-scroll loop.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use crate::board::{Board, Scroller, build_entries};
use crate::config::Config;
use crate::display::{DisplayError, MatrixDisplay};
use crate::quote::{CachedQuotes, QuoteSource};

/// Drives a display from a quote source, one scroll cycle at a time.
pub struct Ticker<'a, S, D> {
    board: Board<'a>,
    quotes: CachedQuotes<S>,
    display: D,
    config: Config,
}

impl<'a, S: QuoteSource, D: MatrixDisplay> Ticker<'a, S, D> {
    pub fn new(board: Board<'a>, source: S, mut display: D, config: Config) -> Result<Self, DisplayError> {
        display.set_brightness(config.brightness)?;

        Ok(Self {
            board,
            quotes: CachedQuotes::new(source, config.cache_ttl),
            display,
            config,
        })
    }

    /// Refresh the entries and scroll them across the display once.
    ///
    /// Stops early when `running` is cleared. Returns the number of frames
    /// shown.
    pub fn cycle(&mut self, running: &AtomicBool) -> Result<usize, DisplayError> {
        let entries = build_entries(&self.config.symbols, &self.config.names, &mut self.quotes);
        log::debug!("showing {} entries", entries.len());

        let strip = self.board.compose(&entries, self.display.columns());
        let mut shown = 0;

        for frame in Scroller::new(&strip, self.display.columns()) {
            if !running.load(Ordering::Relaxed) {
                break;
            }

            self.display.show(&frame)?;
            shown += 1;

            if !self.config.frame_delay.is_zero() {
                thread::sleep(self.config.frame_delay);
            }
        }

        Ok(shown)
    }

    /// Cycle until `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) -> Result<(), DisplayError> {
        while running.load(Ordering::Relaxed) {
            self.cycle(running)?;

            if running.load(Ordering::Relaxed) {
                thread::sleep(self.config.cycle_pause);
            }
        }

        log::info!("ticker stopped");
        Ok(())
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}
