use alloc::vec::Vec;
use core::fmt;

use crate::Glyph;

/// Rows and columns of a single MAX7219 panel.
pub const PANEL_SIZE: usize = 8;

/// A horizontal run of pixel columns of fixed height.
///
/// Strips may be far wider than the physical display; the caller scrolls
/// across them with [PixelStrip::window].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelStrip {
    width: usize,
    height: usize,
    /// Column-major: column `x` is `pixels[x * height..(x + 1) * height]`
    pixels: Vec<bool>,
}

impl PixelStrip {
    /// An empty (zero-column) strip.
    pub fn new(height: usize) -> Self {
        Self {
            width: 0,
            height,
            pixels: Vec::new(),
        }
    }

    /// A strip of unlit columns.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: alloc::vec![false; width * height],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Is the pixel at column `x`, row `y` lit? Out-of-range pixels are unlit.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[x * self.height + y]
    }

    /// The pixels of column `x`, top to bottom, or `None` past the right
    /// edge.
    pub fn column(&self, x: usize) -> Option<&[bool]> {
        if x >= self.width {
            return None;
        }

        let start = x * self.height;
        self.pixels.get(start..start + self.height)
    }

    /// Append one column. Missing pixels are unlit; extra pixels are dropped.
    pub fn push_column(&mut self, column: impl IntoIterator<Item = bool>) {
        let start = self.pixels.len();
        self.pixels.extend(column.into_iter().take(self.height));
        self.pixels.resize(start + self.height, false);
        self.width += 1;
    }

    /// Append `columns` unlit columns.
    pub fn push_blank(&mut self, columns: usize) {
        self.pixels
            .resize(self.pixels.len() + columns * self.height, false);
        self.width += columns;
    }

    /// Append every column of a glyph.
    pub fn push_glyph(&mut self, glyph: &Glyph<'_>) {
        for x in 0..glyph.width() {
            self.push_column((0..self.height).map(|y| glyph.pixel(x, y)));
        }
    }

    /// Append another strip, growing this one if the other is taller.
    pub fn append(&mut self, other: &PixelStrip) {
        if other.height > self.height {
            self.set_height(other.height);
        }

        for column in (0..other.width).filter_map(|x| other.column(x)) {
            self.push_column(column.iter().copied());
        }
    }

    /// Change the height, keeping the top rows.
    pub fn set_height(&mut self, height: usize) {
        if height == self.height {
            return;
        }

        let mut pixels = Vec::with_capacity(self.width * height);
        for x in 0..self.width {
            pixels.extend((0..height).map(|y| self.pixel(x, y)));
        }

        self.height = height;
        self.pixels = pixels;
    }

    /// Move every pixel down by `rows`, dropping whatever falls off the
    /// bottom.
    pub fn shift_down(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }

        for x in 0..self.width {
            let column = &mut self.pixels[x * self.height..(x + 1) * self.height];
            let keep = self.height.saturating_sub(rows);
            column.copy_within(0..keep, self.height - keep);
            column[..self.height - keep].fill(false);
        }
    }

    /// `columns` columns starting at `offset`, padded with unlit columns
    /// past the end of the strip.
    pub fn window(&self, offset: usize, columns: usize) -> PixelStrip {
        let mut out = PixelStrip::new(self.height);

        for x in offset..offset + columns {
            match self.column(x) {
                Some(column) => out.push_column(column.iter().copied()),
                None => out.push_blank(1),
            }
        }

        out
    }

    /// Pack the first `panels * 8` columns into per-panel row bytes.
    ///
    /// Each panel gets eight bytes, one per row from the top, with the
    /// leftmost column of the panel in the most significant bit. Rows past
    /// the strip's height are unlit.
    pub fn panel_rows(&self, panels: usize) -> Vec<[u8; PANEL_SIZE]> {
        (0..panels)
            .map(|panel| {
                let mut rows = [0u8; PANEL_SIZE];
                for (y, row) in rows.iter_mut().enumerate() {
                    for col in 0..PANEL_SIZE {
                        if self.pixel(panel * PANEL_SIZE + col, y) {
                            *row |= 0x80 >> col;
                        }
                    }
                }
                rows
            })
            .collect()
    }
}

impl fmt::Display for PixelStrip {
    /// Draws lit pixels as `#` and unlit pixels as `.`, one line per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                f.write_str(if self.pixel(x, y) { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn diagonal() -> PixelStrip {
        let mut strip = PixelStrip::new(3);
        for x in 0..3 {
            strip.push_column((0..3).map(|y| y == x));
        }
        strip
    }

    #[test]
    fn columns_are_stored_in_order() {
        let strip = diagonal();
        assert_eq!(strip.width(), 3);
        assert_eq!(strip.column(1), Some(&[false, true, false][..]));
        assert_eq!(strip.column(3), None);
        assert_eq!(strip.to_string(), "#..\n.#.\n..#\n");
    }

    #[test]
    fn push_column_pads_and_truncates() {
        let mut strip = PixelStrip::new(2);
        strip.push_column([true]);
        strip.push_column([true, true, true]);
        assert_eq!(strip.column(0), Some(&[true, false][..]));
        assert_eq!(strip.column(1), Some(&[true, true][..]));
    }

    #[test]
    fn window_pads_past_the_end() {
        let window = diagonal().window(2, 3);
        assert_eq!(window.width(), 3);
        assert_eq!(window.to_string(), "...\n...\n#..\n");
    }

    #[test]
    fn shift_down_drops_bottom_rows() {
        let mut strip = diagonal();
        strip.shift_down(1);
        assert_eq!(strip.to_string(), "...\n#..\n.#.\n");
    }

    #[test]
    fn append_grows_to_taller_strip() {
        let mut strip = PixelStrip::blank(1, 2);
        strip.append(&diagonal());
        assert_eq!(strip.height(), 3);
        assert_eq!(strip.width(), 4);
        assert_eq!(strip.to_string(), ".#..\n..#.\n...#\n");
    }

    #[test]
    fn panel_rows_put_left_column_in_msb() {
        let mut strip = PixelStrip::new(8);
        strip.push_column([true; 8]);
        strip.push_blank(8);
        strip.push_column([true]);

        let rows = strip.panel_rows(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], [0x80; 8]);
        assert_eq!(rows[1], [0x40, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn empty_strip_has_no_columns() {
        let strip = PixelStrip::new(8);
        assert!(strip.is_empty());
        assert_eq!(strip.panel_rows(1), [[0; 8]]);
    }
}
