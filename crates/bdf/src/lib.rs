//! `matrix-font-bdf` converts fonts in the Glyph Bitmap Distribution Format
//! (BDF) into the compact container read by `matrix-font-core`.
//!
//! Only fixed-cell fonts up to 8 columns wide are supported, which covers
//! the usual LED matrix fonts such as [Misaki](https://littlelimit.net/misaki.htm).
//!
//! ```no_run
//! use matrix_font_bdf::{ConvertOptions, convert};
//!
//! let font = convert("misaki_gothic.bdf", "misaki_gothic.mfc", &ConvertOptions::default())?;
//! println!("converted {} glyphs", font.len());
//! # Ok::<(), matrix_font_bdf::ConvertError>(())
//! ```

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use matrix_font_core::{ContainerError, FontContainer, GlyphDefinition};
use thiserror::Error;

mod parse;
mod write;

pub use parse::{ParseError, ParseErrorKind, parse};
pub use write::write_bdf;

/// A BDF bounding box: size, then offset of the lower-left corner from the
/// origin.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
}

/// A glyph read from a BDF file, already placed into the font's cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BdfGlyph {
    /// Name given by `STARTCHAR`
    pub name: String,
    pub definition: GlyphDefinition,
}

/// A parsed BDF font. Every glyph is `bounding_box.width` by
/// `bounding_box.height` pixels.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BdfFont {
    pub name: Option<String>,
    pub bounding_box: BoundingBox,
    pub glyphs: Vec<BdfGlyph>,
}

impl BdfFont {
    /// Build a font from glyph definitions, naming each glyph after its
    /// codepoint.
    pub fn from_definitions(
        width: u8,
        height: u8,
        definitions: impl IntoIterator<Item = GlyphDefinition>,
    ) -> Self {
        Self {
            name: None,
            bounding_box: BoundingBox {
                width: i32::from(width),
                height: i32::from(height),
                x: 0,
                y: 0,
            },
            glyphs: definitions
                .into_iter()
                .map(|definition| BdfGlyph {
                    name: format!("U+{:04X}", definition.codepoint),
                    definition,
                })
                .collect(),
        }
    }

    /// Pack the glyphs into a container.
    pub fn to_container(&self, options: &ConvertOptions) -> Result<FontContainer, ContainerError> {
        // Out-of-range widths are rejected by `FontContainer::new`
        let width = u8::try_from(self.bounding_box.width).unwrap_or(u8::MAX);
        let height = u8::try_from(self.bounding_box.height)
            .map_err(|_| ContainerError::EmptyCell { width, height: 0 })?;

        let mut font = FontContainer::new(width, height)?;

        for glyph in &self.glyphs {
            let mut definition = glyph.definition.clone();

            if options.skip_control && definition.codepoint < 0x20 {
                log::debug!("skipping control character {:#04x}", definition.codepoint);
                continue;
            }

            if options.flip_vertical {
                definition.rows.reverse();
            }

            font.insert(definition)?;
        }

        Ok(font)
    }
}

/// Adjustments applied while converting.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Drop glyphs for codepoints below `0x20`.
    pub skip_control: bool,
    /// Store every glyph upside down, for modules mounted inverted.
    pub flip_vertical: bool,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid BDF font: {0}")]
    Parse(#[from] ParseError),

    #[error("cannot pack font: {0}")]
    Container(#[from] ContainerError),
}

/// Convert the BDF font at `source` into a container written to `dest`.
///
/// The container is only written once the whole font has parsed, and is
/// written atomically, so a failed conversion never leaves a partial file
/// at `dest`.
pub fn convert(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<FontContainer, ConvertError> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    let raw = fs::read(source).map_err(|source_err| ConvertError::Read {
        path: source.to_owned(),
        source: source_err,
    })?;

    // Properties and comments are not always UTF-8; glyph data is ASCII
    let text = String::from_utf8_lossy(&raw);

    let bdf = parse(&text)?;
    let font = bdf.to_container(options)?;

    write_container(dest, &font).map_err(|source| ConvertError::Write {
        path: dest.to_owned(),
        source,
    })?;

    log::info!(
        "converted {} glyphs ({}x{}) from {} to {}",
        font.len(),
        font.width(),
        font.height(),
        source.display(),
        dest.display()
    );

    Ok(font)
}

/// Write a container to `path` via a temporary file in the same directory
/// which is renamed into place.
pub fn write_container(path: &Path, font: &FontContainer) -> io::Result<()> {
    let Some(file_name) = path.file_name() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        ));
    };

    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    let temp = path.with_file_name(temp_name);

    let result = write_file(&temp, &font.to_bytes()).and_then(|()| fs::rename(&temp, path));

    if result.is_err() {
        // Best effort: the temporary may never have been created
        let _ = fs::remove_file(&temp);
    }

    result
}

fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
