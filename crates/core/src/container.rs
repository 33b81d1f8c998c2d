//! The compact font container and its binary layout.
//!
//! ```text
//! offset 0: magic/version byte (0xA1)
//! offset 1: glyph width (1 byte, at most 8)
//! offset 2: glyph height (1 byte)
//! offset 3: glyph count (2 bytes, big-endian)
//! offset 5: for each glyph, ascending codepoint order:
//!     codepoint (2 bytes, big-endian)
//!     `height` bytes, one per row, low `width` bits significant
//! ```

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use thiserror::Error;

use crate::GlyphDefinition;

/// Magic/version byte at the start of every container.
/// High nibble identifies the format, low nibble is the layout version.
pub const MAGIC: u8 = 0xA1;

/// Length of the fixed header preceding the glyph records.
pub const HEADER_LEN: usize = 5;

/// Widest glyph a one-byte-per-row record can hold.
pub const MAX_WIDTH: u8 = 8;

/// Structural problems with a font container.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("container is {0} bytes, shorter than its header")]
    TooShort(usize),

    #[error("bad magic byte {0:#04x}, expected 0xa1")]
    BadMagic(u8),

    #[error("glyph width {0} is wider than 8 columns")]
    UnsupportedWidth(u8),

    #[error("{width}x{height} cell cannot hold glyphs")]
    EmptyCell { width: u8, height: u8 },

    #[error("{count} glyphs need {expected} bytes, container has {actual}")]
    LengthMismatch {
        count: u16,
        expected: usize,
        actual: usize,
    },

    #[error("codepoint {0:#06x} is out of order")]
    UnorderedCodepoint(u16),

    #[error("duplicate codepoint {0:#06x}")]
    DuplicateCodepoint(u16),

    #[error("glyph {codepoint:#06x} has {actual} rows, expected {expected}")]
    RowCount {
        codepoint: u16,
        expected: u8,
        actual: usize,
    },

    #[error("glyph {codepoint:#06x} row {row} has bits set beyond column {width}")]
    RowOverflow { codepoint: u16, row: usize, width: u8 },

    #[error("container is full")]
    TooManyGlyphs,
}

/// Mask of the significant bits in a row of the given width.
fn row_mask(width: u8) -> u8 {
    ((1u16 << width.min(MAX_WIDTH)) - 1) as u8
}

/// A fixed-cell bitmap font, mapping codepoints to packed glyph rows.
///
/// Every glyph shares the container's width and height. Once loaded, a
/// container is only ever read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontContainer {
    width: u8,
    height: u8,
    glyphs: BTreeMap<u16, Vec<u8>>,
}

impl FontContainer {
    /// Create an empty container for glyphs of the given cell size.
    pub fn new(width: u8, height: u8) -> Result<Self, ContainerError> {
        if width > MAX_WIDTH {
            return Err(ContainerError::UnsupportedWidth(width));
        }

        Ok(Self {
            width,
            height,
            glyphs: BTreeMap::new(),
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of glyphs in the container.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Size of one glyph record in the binary layout.
    pub fn record_len(&self) -> usize {
        2 + usize::from(self.height)
    }

    /// Add a glyph, checking it against the container's cell size.
    pub fn insert(&mut self, glyph: GlyphDefinition) -> Result<(), ContainerError> {
        let GlyphDefinition { codepoint, rows } = glyph;

        if self.width == 0 || self.height == 0 {
            return Err(ContainerError::EmptyCell {
                width: self.width,
                height: self.height,
            });
        }

        if rows.len() != usize::from(self.height) {
            return Err(ContainerError::RowCount {
                codepoint,
                expected: self.height,
                actual: rows.len(),
            });
        }

        let mask = row_mask(self.width);
        if let Some(row) = rows.iter().position(|r| r & !mask != 0) {
            return Err(ContainerError::RowOverflow {
                codepoint,
                row,
                width: self.width,
            });
        }

        if self.glyphs.contains_key(&codepoint) {
            return Err(ContainerError::DuplicateCodepoint(codepoint));
        }

        if self.glyphs.len() >= usize::from(u16::MAX) {
            return Err(ContainerError::TooManyGlyphs);
        }

        self.glyphs.insert(codepoint, rows);
        Ok(())
    }

    /// Look up the glyph for a codepoint.
    pub fn glyph(&self, codepoint: u16) -> Option<Glyph<'_>> {
        self.glyphs.get(&codepoint).map(|rows| Glyph {
            codepoint,
            width: self.width,
            rows,
        })
    }

    /// Iterate over all glyphs in ascending codepoint order.
    pub fn glyphs(&self) -> impl Iterator<Item = Glyph<'_>> {
        self.glyphs.iter().map(|(&codepoint, rows)| Glyph {
            codepoint,
            width: self.width,
            rows,
        })
    }

    /// Serialize the container into its binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.len() * self.record_len());

        // `insert` caps the glyph count at u16::MAX
        let count = self.glyphs.len() as u16;

        out.push(MAGIC);
        out.push(self.width);
        out.push(self.height);
        out.extend_from_slice(&count.to_be_bytes());

        for (codepoint, rows) in &self.glyphs {
            out.extend_from_slice(&codepoint.to_be_bytes());
            out.extend_from_slice(rows);
        }

        out
    }

    /// Parse and validate a container from its binary layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContainerError> {
        let &[magic, width, height, count_hi, count_lo, ref body @ ..] = bytes else {
            return Err(ContainerError::TooShort(bytes.len()));
        };

        if magic != MAGIC {
            return Err(ContainerError::BadMagic(magic));
        }

        let mut font = Self::new(width, height)?;
        let count = u16::from_be_bytes([count_hi, count_lo]);

        let expected = HEADER_LEN + usize::from(count) * font.record_len();
        if bytes.len() != expected {
            return Err(ContainerError::LengthMismatch {
                count,
                expected,
                actual: bytes.len(),
            });
        }

        if count == 0 {
            return Ok(font);
        }

        if width == 0 || height == 0 {
            return Err(ContainerError::EmptyCell { width, height });
        }

        let mut previous: Option<u16> = None;

        for record in body.chunks_exact(font.record_len()) {
            let codepoint = u16::from_be_bytes([record[0], record[1]]);

            if previous.is_some_and(|p| p >= codepoint) {
                return Err(ContainerError::UnorderedCodepoint(codepoint));
            }
            previous = Some(codepoint);

            font.insert(GlyphDefinition::new(codepoint, &record[2..]))?;
        }

        Ok(font)
    }
}

/// A borrowed view of one glyph in a [FontContainer].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph<'a> {
    pub codepoint: u16,
    width: u8,
    rows: &'a [u8],
}

impl Glyph<'_> {
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Packed rows, top to bottom.
    pub fn rows(&self) -> &[u8] {
        self.rows
    }

    /// Is the pixel at column `x`, row `y` lit?
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= self.width() || y >= self.height() {
            return false;
        }

        (self.rows[y] >> (self.width() - 1 - x)) & 1 == 1
    }

    /// Copy the glyph back out as a definition.
    pub fn to_definition(&self) -> GlyphDefinition {
        GlyphDefinition::new(self.codepoint, self.rows)
    }
}

/// Errors from loading a container file.
#[cfg(feature = "std")]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read font container: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt font container: {0}")]
    Corrupt(#[from] ContainerError),
}

/// Read and validate a font container from disk.
#[cfg(feature = "std")]
pub fn load(path: impl AsRef<std::path::Path>) -> Result<FontContainer, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let font = FontContainer::from_bytes(&bytes)?;

    log::debug!(
        "loaded {} glyphs ({}x{}) from {}",
        font.len(),
        font.width(),
        font.height(),
        path.display()
    );

    Ok(font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> FontContainer {
        let mut font = FontContainer::new(3, 2).unwrap();
        font.insert(GlyphDefinition::new(0x42, [0b111, 0b010])).unwrap();
        font.insert(GlyphDefinition::new(0x41, [0b101, 0b000])).unwrap();
        font
    }

    #[test]
    fn serializes_documented_layout() {
        assert_eq!(
            sample().to_bytes(),
            vec![
                0xA1, 3, 2, 0x00, 0x02, // header
                0x00, 0x41, 0b101, 0b000, // 'A'
                0x00, 0x42, 0b111, 0b010, // 'B'
            ]
        );
    }

    #[test]
    fn parses_what_it_writes() {
        let font = sample();
        assert_eq!(FontContainer::from_bytes(&font.to_bytes()), Ok(font));
    }

    #[test]
    fn empty_container_is_header_only() {
        let font = FontContainer::new(0, 0).unwrap();
        let bytes = font.to_bytes();
        assert_eq!(bytes, vec![MAGIC, 0, 0, 0, 0]);
        assert!(FontContainer::from_bytes(&bytes).unwrap().is_empty());
    }

    #[test]
    fn rejects_short_input() {
        assert_eq!(
            FontContainer::from_bytes(&[MAGIC, 8]),
            Err(ContainerError::TooShort(2))
        );
    }

    #[test]
    fn rejects_bad_magic() {
        assert_eq!(
            FontContainer::from_bytes(&[0x00, 8, 8, 0, 0]),
            Err(ContainerError::BadMagic(0x00))
        );
    }

    #[test]
    fn rejects_truncated_records() {
        let mut bytes = sample().to_bytes();
        bytes.pop();
        assert_eq!(
            FontContainer::from_bytes(&bytes),
            Err(ContainerError::LengthMismatch {
                count: 2,
                expected: 13,
                actual: 12
            })
        );
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = sample().to_bytes();
        bytes.extend_from_slice(&[0, 0x43, 0, 0]);
        assert!(matches!(
            FontContainer::from_bytes(&bytes),
            Err(ContainerError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn rejects_unordered_codepoints() {
        let bytes = [MAGIC, 3, 1, 0, 2, 0, 0x42, 0b1, 0, 0x41, 0b1];
        assert_eq!(
            FontContainer::from_bytes(&bytes),
            Err(ContainerError::UnorderedCodepoint(0x41))
        );

        let bytes = [MAGIC, 3, 1, 0, 2, 0, 0x41, 0b1, 0, 0x41, 0b1];
        assert_eq!(
            FontContainer::from_bytes(&bytes),
            Err(ContainerError::UnorderedCodepoint(0x41))
        );
    }

    #[test]
    fn rejects_bits_beyond_width() {
        let bytes = [MAGIC, 3, 1, 0, 1, 0, 0x41, 0b1000];
        assert_eq!(
            FontContainer::from_bytes(&bytes),
            Err(ContainerError::RowOverflow {
                codepoint: 0x41,
                row: 0,
                width: 3
            })
        );
    }

    #[test]
    fn rejects_wide_cells() {
        assert_eq!(
            FontContainer::new(9, 8),
            Err(ContainerError::UnsupportedWidth(9))
        );
    }

    #[test]
    fn insert_checks_glyph_shape() {
        let mut font = sample();
        assert_eq!(
            font.insert(GlyphDefinition::new(0x41, [0, 0])),
            Err(ContainerError::DuplicateCodepoint(0x41))
        );
        assert_eq!(
            font.insert(GlyphDefinition::new(0x43, [0])),
            Err(ContainerError::RowCount {
                codepoint: 0x43,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn glyph_pixels_read_msb_first() {
        let font = sample();
        let glyph = font.glyph(0x41).unwrap();
        assert!(glyph.pixel(0, 0));
        assert!(!glyph.pixel(1, 0));
        assert!(glyph.pixel(2, 0));
        assert!(!glyph.pixel(0, 1));
        assert!(!glyph.pixel(3, 0));
    }
}
