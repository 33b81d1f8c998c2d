use svg::Document;
use svg::node::element::Rectangle;

use matrix_font_core::{FontContainer, GlyphDefinition, PixelStrip};
use matrix_ticker::{Board, Entry, Layout};

/// A tiny 3x5 digit font, bottom two rows blank.
fn digits() -> FontContainer {
    const GLYPHS: [(char, [u8; 5]); 11] = [
        ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
        ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
        ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
        ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
        ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
        ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
        ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
        ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
        ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
        ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
        ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    ];

    let mut font = FontContainer::new(3, 8).expect("valid cell");
    for (character, rows) in GLYPHS {
        let mut cell = rows.to_vec();
        cell.resize(8, 0);
        font.insert(GlyphDefinition::new(character as u16, cell))
            .expect("valid glyph");
    }
    font
}

fn strip_to_svg(strip: &PixelStrip, scale: f32, margin: f32) -> Document {
    let width = strip.width() as f32 * scale + 2.0 * margin;
    let height = strip.height() as f32 * scale + 2.0 * margin;

    let background = Rectangle::new()
        .set("x", 0)
        .set("y", 0)
        .set("width", width)
        .set("height", height)
        .set("fill", "black");

    let mut document = Document::new().add(background);

    for x in 0..strip.width() {
        for y in 0..strip.height() {
            if !strip.pixel(x, y) {
                continue;
            }

            let led = Rectangle::new()
                .set("x", x as f32 * scale + margin)
                .set("y", y as f32 * scale + margin)
                .set("width", scale * 0.9)
                .set("height", scale * 0.9)
                .set("fill", "red");
            document = document.add(led);
        }
    }

    document
        .set("viewBox", (0, 0, width, height))
        .set("width", format!("{width}px"))
        .set("height", format!("{height}px"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let font = digits();
    let board = Board::new(&font, &font, Layout::default());

    let entries = [
        Entry {
            name: "7203".into(),
            price: "2841.5".into(),
        },
        Entry {
            name: "6758".into(),
            price: "3125".into(),
        },
    ];

    // Skip the blank lead-in and lead-out
    let strip = board.compose(&entries, 0);
    let document = strip_to_svg(&strip, 10.0, 10.0);

    svg::save("output_board.svg", &document)?;
    println!("Wrote output_board.svg");

    Ok(())
}
