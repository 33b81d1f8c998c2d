//! Laying entries out into one long strip and scrolling across it.

use std::collections::HashMap;

use matrix_font_core::{FontContainer, GlyphRenderer, PANEL_SIZE, PixelStrip, Renderer};

use crate::format::{display_name, format_price};
use crate::quote::{CachedQuotes, QuoteSource};

/// Spacing rules for the board, in pixels unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Height of the display
    pub rows: usize,
    /// Nominal width of one character; gaps are measured in cells
    pub cell_width: usize,
    /// Cells between a name and its price
    pub name_gap: usize,
    /// Cells between one entry's price and the next entry's name
    pub entry_gap: usize,
    /// Rows the price is pushed down relative to the name
    pub price_offset: usize,
    /// Blank columns between glyphs within a word
    pub spacing: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            rows: PANEL_SIZE,
            cell_width: 6,
            name_gap: 2,
            entry_gap: 3,
            price_offset: 1,
            spacing: 0,
        }
    }
}

/// One symbol's worth of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub price: String,
}

/// Fetch prices and names for every symbol, substituting the placeholder
/// for prices that are unavailable.
pub fn build_entries<S: QuoteSource>(
    symbols: &[String],
    names: &HashMap<String, String>,
    quotes: &mut CachedQuotes<S>,
) -> Vec<Entry> {
    symbols
        .iter()
        .map(|symbol| {
            let reported = if names.contains_key(symbol) {
                None
            } else {
                quotes.name(symbol)
            };

            Entry {
                name: display_name(symbol, names, reported.as_deref()),
                price: format_price(symbol, quotes.price(symbol)),
            }
        })
        .collect()
}

/// Renders entries with one font for names and another for prices.
pub struct Board<'a> {
    name: GlyphRenderer<'a>,
    price: GlyphRenderer<'a>,
    layout: Layout,
}

impl<'a> Board<'a> {
    pub fn new(name_font: &'a FontContainer, price_font: &'a FontContainer, layout: Layout) -> Self {
        Self {
            name: GlyphRenderer::new(name_font).with_spacing(layout.spacing),
            price: GlyphRenderer::new(price_font).with_spacing(layout.spacing),
            layout,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Lay all entries out in one strip.
    ///
    /// The strip starts and ends with `display_columns` blank columns, so
    /// scrolling it brings the first entry in from the right edge and takes
    /// the last one fully off the left.
    pub fn compose(&self, entries: &[Entry], display_columns: usize) -> PixelStrip {
        let Layout {
            rows,
            cell_width,
            name_gap,
            entry_gap,
            price_offset,
            ..
        } = self.layout;

        let mut strip = PixelStrip::blank(display_columns, rows);

        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                strip.push_blank(entry_gap * cell_width);
            }

            let mut name = self.name.render_text(&entry.name);
            name.set_height(rows);
            strip.append(&name);

            strip.push_blank(name_gap * cell_width);

            let mut price = self.price.render_text(&entry.price);
            price.set_height(rows);
            price.shift_down(price_offset);
            strip.append(&price);
        }

        strip.push_blank(display_columns);
        strip
    }
}

/// Successive display-sized windows over a strip, one column apart.
pub struct Scroller<'a> {
    strip: &'a PixelStrip,
    columns: usize,
    offset: usize,
    last: usize,
}

impl<'a> Scroller<'a> {
    pub fn new(strip: &'a PixelStrip, columns: usize) -> Self {
        Self {
            strip,
            columns,
            offset: 0,
            last: strip.width().saturating_sub(columns),
        }
    }
}

impl Iterator for Scroller<'_> {
    type Item = PixelStrip;

    fn next(&mut self) -> Option<PixelStrip> {
        if self.offset > self.last {
            return None;
        }

        let frame = self.strip.window(self.offset, self.columns);
        self.offset += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last + 1).saturating_sub(self.offset);
        (remaining, Some(remaining))
    }
}
