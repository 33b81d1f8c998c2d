use std::collections::HashMap;
use std::str::FromStr;

use matrix_font_core::{GlyphDefinition, MAX_WIDTH};
use thiserror::Error;

use crate::{BdfFont, BdfGlyph, BoundingBox};

/// A problem with the source font, and the line it was found on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected STARTFONT")]
    MissingStartFont,

    #[error("FONTBOUNDINGBOX must come before the first glyph")]
    MissingBoundingBox,

    #[error("malformed {0} line")]
    Malformed(&'static str),

    #[error("glyph width {0} is not between 1 and 8 columns")]
    UnsupportedWidth(i32),

    #[error("glyph height {0} is not between 1 and 255 rows")]
    UnsupportedHeight(i32),

    #[error("glyph has no ENCODING")]
    MissingEncoding,

    #[error("glyph has no BITMAP")]
    MissingBitmap,

    #[error("codepoint {0} does not fit in 16 bits")]
    CodepointOutOfRange(i64),

    #[error("duplicate codepoint {codepoint:#06x}, first defined on line {first_line}")]
    DuplicateCodepoint { codepoint: u16, first_line: usize },

    #[error("glyph box {width}x{height}{x:+}{y:+} does not fit the font cell")]
    InconsistentDimensions { width: i32, height: i32, x: i32, y: i32 },

    #[error("bitmap has {found} rows, expected {expected}")]
    RowCount { expected: usize, found: usize },

    #[error("bitmap row {row:?} is not {width} columns wide")]
    RowWidth { row: String, width: i32 },

    #[error("{keyword} before ENDCHAR")]
    MissingEndChar { keyword: &'static str },

    #[error("CHARS declares {declared} glyphs, found {found}")]
    CharCount { declared: usize, found: usize },

    #[error("unexpected end of file")]
    UnexpectedEof,
}

impl ParseErrorKind {
    fn at(self, line: usize) -> ParseError {
        ParseError { line, kind: self }
    }
}

/// Non-blank lines of the source, split into keyword and arguments.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last: usize,
}

struct Line<'a> {
    number: usize,
    keyword: &'a str,
    args: &'a str,
}

impl<'a> Lines<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            inner: source.lines().enumerate(),
            last: 0,
        }
    }

    fn next(&mut self) -> Option<Line<'a>> {
        for (index, text) in self.inner.by_ref() {
            let text = text.trim();
            self.last = index + 1;

            if text.is_empty() {
                continue;
            }

            let (keyword, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));

            if keyword == "COMMENT" {
                continue;
            }

            return Some(Line {
                number: self.last,
                keyword,
                args: args.trim(),
            });
        }

        None
    }

    /// Like `next`, but running out of input is an error.
    fn expect(&mut self) -> Result<Line<'a>, ParseError> {
        self.next()
            .ok_or_else(|| ParseErrorKind::UnexpectedEof.at(self.last + 1))
    }
}

/// Parse exactly `N` whitespace-separated numbers.
fn numbers<T: FromStr, const N: usize>(line: &Line<'_>, keyword: &'static str) -> Result<[T; N], ParseError> {
    let malformed = || ParseErrorKind::Malformed(keyword).at(line.number);

    let parsed = line
        .args
        .split_whitespace()
        .map(|part| part.parse::<T>().map_err(|_| malformed()))
        .collect::<Result<Vec<_>, _>>()?;

    parsed.try_into().map_err(|_| malformed())
}

fn parse_box(line: &Line<'_>, keyword: &'static str) -> Result<BoundingBox, ParseError> {
    let [width, height, x, y] = numbers::<i32, 4>(line, keyword)?;

    if width < 0 || height < 0 {
        return Err(ParseErrorKind::Malformed(keyword).at(line.number));
    }

    Ok(BoundingBox {
        width,
        height,
        x,
        y,
    })
}

/// Decode one hex bitmap row into its `width` significant bits, low-aligned.
fn parse_row(line: &Line<'_>, width: i32) -> Result<u8, ParseError> {
    let row = line.keyword;
    let bad_width = || {
        ParseErrorKind::RowWidth {
            row: row.to_owned(),
            width,
        }
        .at(line.number)
    };

    // The font cell is at most 8 columns, so every row is one byte
    if !line.args.is_empty() || row.len() != 2 || !row.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad_width());
    }

    let value = u8::from_str_radix(row, 16).map_err(|_| bad_width())?;
    let padding = 0xFFu8.checked_shr(width as u32).unwrap_or(0);

    if value & padding != 0 {
        return Err(bad_width());
    }

    Ok(value.checked_shr(8 - width as u32).unwrap_or(0))
}

/// Parse the source text of a BDF font.
///
/// Every glyph is placed into the font's bounding box cell using its `BBX`
/// offsets, so all glyphs in the result share one width and height. A blank
/// source yields an empty font.
pub fn parse(source: &str) -> Result<BdfFont, ParseError> {
    let mut lines = Lines::new(source);
    let mut font = BdfFont::default();

    let Some(first) = lines.next() else {
        return Ok(font);
    };

    if first.keyword != "STARTFONT" {
        return Err(ParseErrorKind::MissingStartFont.at(first.number));
    }

    let mut have_box = false;
    let mut declared = None;
    let mut found = 0;
    let mut seen: HashMap<u16, usize> = HashMap::new();

    loop {
        let line = lines.expect()?;

        match line.keyword {
            "FONT" => font.name = Some(line.args.to_owned()),
            "FONTBOUNDINGBOX" => {
                let cell = parse_box(&line, "FONTBOUNDINGBOX")?;

                if !(1..=i32::from(MAX_WIDTH)).contains(&cell.width) {
                    return Err(ParseErrorKind::UnsupportedWidth(cell.width).at(line.number));
                }
                if !(1..=255).contains(&cell.height) {
                    return Err(ParseErrorKind::UnsupportedHeight(cell.height).at(line.number));
                }

                font.bounding_box = cell;
                have_box = true;
            }
            "STARTPROPERTIES" => loop {
                if lines.expect()?.keyword == "ENDPROPERTIES" {
                    break;
                }
            },
            "CHARS" => {
                let [count] = numbers::<usize, 1>(&line, "CHARS")?;
                declared = Some((count, line.number));
            }
            "STARTCHAR" => {
                if !have_box {
                    return Err(ParseErrorKind::MissingBoundingBox.at(line.number));
                }

                found += 1;

                let name = line.args.to_owned();
                let start = line.number;

                if let Some(glyph) = parse_glyph(&mut lines, &font.bounding_box, name)? {
                    let codepoint = glyph.definition.codepoint;

                    if let Some(&first_line) = seen.get(&codepoint) {
                        return Err(ParseErrorKind::DuplicateCodepoint {
                            codepoint,
                            first_line,
                        }
                        .at(start));
                    }

                    seen.insert(codepoint, start);
                    font.glyphs.push(glyph);
                }
            }
            "ENDFONT" => break,
            _ => {}
        }
    }

    if let Some((declared, line)) = declared
        && declared != found
    {
        return Err(ParseErrorKind::CharCount { declared, found }.at(line));
    }

    Ok(font)
}

/// Parse one glyph, from the line after `STARTCHAR` up to `ENDCHAR`.
///
/// Returns `None` for unencoded glyphs (`ENCODING -1`).
fn parse_glyph(
    lines: &mut Lines<'_>,
    cell: &BoundingBox,
    name: String,
) -> Result<Option<BdfGlyph>, ParseError> {
    let mut encoding = None;
    let mut glyph_box = *cell;

    let bitmap_line = loop {
        let line = lines.expect()?;

        match line.keyword {
            "ENCODING" => {
                let first = line.args.split_whitespace().next().unwrap_or("");
                let value = first
                    .parse::<i64>()
                    .map_err(|_| ParseErrorKind::Malformed("ENCODING").at(line.number))?;
                encoding = Some(value);
            }
            "BBX" => glyph_box = parse_box(&line, "BBX")?,
            "BITMAP" => break line.number,
            "ENDCHAR" => return Err(ParseErrorKind::MissingBitmap.at(line.number)),
            "STARTCHAR" => {
                return Err(ParseErrorKind::MissingEndChar { keyword: "STARTCHAR" }.at(line.number));
            }
            "ENDFONT" => {
                return Err(ParseErrorKind::MissingEndChar { keyword: "ENDFONT" }.at(line.number));
            }
            _ => {}
        }
    };

    let encoding = encoding.ok_or_else(|| ParseErrorKind::MissingEncoding.at(bitmap_line))?;

    // Where the glyph box sits inside the cell; i64 so extreme offsets
    // cannot overflow
    let [x, y, width, height] = [glyph_box.x, glyph_box.y, glyph_box.width, glyph_box.height].map(i64::from);
    let left = x - i64::from(cell.x);
    let top = i64::from(cell.y) + i64::from(cell.height) - (y + height);

    if left < 0 || top < 0 || left + width > i64::from(cell.width) || top + height > i64::from(cell.height) {
        return Err(ParseErrorKind::InconsistentDimensions {
            width: glyph_box.width,
            height: glyph_box.height,
            x: glyph_box.x,
            y: glyph_box.y,
        }
        .at(bitmap_line));
    }

    let mut rows = Vec::new();

    loop {
        let line = lines.expect()?;

        match line.keyword {
            "ENDCHAR" => break,
            "STARTCHAR" => {
                return Err(ParseErrorKind::MissingEndChar { keyword: "STARTCHAR" }.at(line.number));
            }
            "ENDFONT" => {
                return Err(ParseErrorKind::MissingEndChar { keyword: "ENDFONT" }.at(line.number));
            }
            _ => rows.push((line.number, parse_row(&line, glyph_box.width)?)),
        }
    }

    if rows.len() != glyph_box.height as usize {
        let line = rows.last().map_or(bitmap_line, |&(number, _)| number);
        return Err(ParseErrorKind::RowCount {
            expected: glyph_box.height as usize,
            found: rows.len(),
        }
        .at(line));
    }

    if encoding < 0 {
        log::debug!("skipping unencoded glyph {name:?}");
        return Ok(None);
    }

    let codepoint = u16::try_from(encoding)
        .map_err(|_| ParseErrorKind::CodepointOutOfRange(encoding).at(bitmap_line))?;

    let shift = (i64::from(cell.width) - left - width) as u32;
    let mut cell_rows = vec![0u8; cell.height as usize];
    for (offset, (_, bits)) in rows.into_iter().enumerate() {
        cell_rows[top as usize + offset] = bits << shift;
    }

    Ok(Some(BdfGlyph {
        name,
        definition: GlyphDefinition::new(codepoint, cell_rows),
    }))
}
