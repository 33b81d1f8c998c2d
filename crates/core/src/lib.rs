#![no_std]

//! `matrix-font-core` provides the primitives shared by the `matrix-ticker`
//! crates: a compact fixed-cell bitmap font container, the [PixelStrip] that
//! text is rendered into, and the [Renderer] trait.
//!
//! Fonts are converted offline (see `matrix-font-bdf`) into a small binary
//! container, loaded once at startup, and then rendered into strips which a
//! display driver windows across its physical panels:
//!
//! ```
//! use matrix_font_core::{FontContainer, GlyphDefinition, render};
//!
//! let mut font = FontContainer::new(5, 8).unwrap();
//! font.insert(GlyphDefinition::new('A' as u16, [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11, 0x00]))
//!     .unwrap();
//!
//! let strip = render("AA", &font, 1);
//! assert_eq!(strip.width(), 11);
//! assert_eq!(strip.height(), 8);
//! ```

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::vec::Vec;

mod container;
mod render;
mod strip;

pub use container::{ContainerError, FontContainer, Glyph, HEADER_LEN, MAGIC, MAX_WIDTH};
#[cfg(feature = "std")]
pub use container::{LoadError, load};
pub use render::{Fallback, GlyphRenderer, render};
pub use strip::{PANEL_SIZE, PixelStrip};

/// A single glyph parsed from a source font, before it is packed into a
/// [FontContainer].
///
/// Rows are stored one byte per row, top to bottom. Only the low `width` bits
/// of each row are significant; bit `width - 1` is the leftmost column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphDefinition {
    /// Identity of the character within the font's encoding
    pub codepoint: u16,
    /// Bitmap rows, top to bottom
    pub rows: Vec<u8>,
}

impl GlyphDefinition {
    pub fn new(codepoint: u16, rows: impl Into<Vec<u8>>) -> Self {
        Self {
            codepoint,
            rows: rows.into(),
        }
    }
}

/// Allows rendering text into a [PixelStrip].
///
/// Implementors decide how characters map to glyphs and what happens to
/// characters the font does not cover.
pub trait Renderer {
    /// Render the given text string into a strip of pixel columns.
    fn render_text(&self, text: &str) -> PixelStrip;
}
