use crate::BdfFont;

/// Generate BDF source for a font, which [crate::parse] reads back to an
/// identical [BdfFont] (apart from comments and properties, which are not
/// kept).
///
/// Every glyph is written with the font's own bounding box.
pub fn write_bdf(font: &BdfFont) -> String {
    let mut out = String::new();
    let cell = font.bounding_box;

    out.push_str("STARTFONT 2.1\n");

    if let Some(name) = &font.name {
        out.push_str(&format!("FONT {}\n", name));
    }

    // An empty font has no cell to describe
    if cell.width > 0 && cell.height > 0 {
        out.push_str(&format!("SIZE {} 75 75\n", cell.height));
        out.push_str(&format!(
            "FONTBOUNDINGBOX {} {} {} {}\n",
            cell.width, cell.height, cell.x, cell.y
        ));
    }

    out.push_str(&format!("CHARS {}\n", font.glyphs.len()));

    for glyph in &font.glyphs {
        out.push_str(&format!("STARTCHAR {}\n", glyph.name));
        out.push_str(&format!("ENCODING {}\n", glyph.definition.codepoint));
        out.push_str(&format!("DWIDTH {} 0\n", cell.width));
        out.push_str(&format!(
            "BBX {} {} {} {}\n",
            cell.width, cell.height, cell.x, cell.y
        ));
        out.push_str("BITMAP\n");

        // Rows are stored low-aligned; BDF wants them from the MSB
        let shift = 8u32.saturating_sub(cell.width.max(0) as u32);
        for row in &glyph.definition.rows {
            out.push_str(&format!("{:02X}\n", row.checked_shl(shift).unwrap_or(0)));
        }

        out.push_str("ENDCHAR\n");
    }

    out.push_str("ENDFONT\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, parse};
    use matrix_font_core::GlyphDefinition;

    #[test]
    fn writes_msb_aligned_rows() {
        let font = BdfFont::from_definitions(4, 2, [GlyphDefinition::new(65, [0b0110, 0b1001])]);
        let text = write_bdf(&font);

        assert!(text.contains("FONTBOUNDINGBOX 4 2 0 0\n"));
        assert!(text.contains("STARTCHAR U+0041\nENCODING 65\n"));
        assert!(text.contains("BITMAP\n60\n90\nENDCHAR\n"));
    }

    #[test]
    fn output_parses_back() {
        let mut font = BdfFont::from_definitions(
            5,
            3,
            [
                GlyphDefinition::new(0x30, [0b01110, 0b10001, 0b01110]),
                GlyphDefinition::new(0x3042, [0b11111, 0b00100, 0b11011]),
            ],
        );
        font.name = Some("-misc-test-medium-r-normal--3-30-75-75-c-50-iso10646-1".into());
        font.bounding_box = BoundingBox {
            y: -1,
            ..font.bounding_box
        };

        assert_eq!(parse(&write_bdf(&font)), Ok(font));
    }

    #[test]
    fn empty_font_parses_back() {
        let font = BdfFont::default();
        assert_eq!(parse(&write_bdf(&font)), Ok(font));
    }
}
