use std::{
    fs,
    path::{Path, PathBuf},
};

use matrix_font_bdf::{
    BdfFont, ConvertError, ConvertOptions, ParseErrorKind, convert, write_bdf, write_container,
};
use matrix_font_core::{ContainerError, GlyphDefinition, LoadError, load, render};

/// A scratch directory unique to one test.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("matrix-font-bdf-{}-{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

fn definitions() -> Vec<GlyphDefinition> {
    vec![
        GlyphDefinition::new(0x20, [0; 8]),
        GlyphDefinition::new(
            'A' as u16,
            [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11, 0x00],
        ),
        GlyphDefinition::new(
            'B' as u16,
            [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E, 0x00],
        ),
        // ア
        GlyphDefinition::new(
            0x30A2,
            [0x1F, 0x01, 0x05, 0x06, 0x04, 0x04, 0x08, 0x00],
        ),
    ]
}

#[test]
fn bitmaps_survive_conversion_and_loading() {
    let dir = scratch("round-trip");
    let source = dir.join("font.bdf");
    let dest = dir.join("font.mfc");

    // Deliberately out of codepoint order
    let mut defs = definitions();
    defs.reverse();
    fs::write(&source, write_bdf(&BdfFont::from_definitions(5, 8, defs))).unwrap();

    let converted = convert(&source, &dest, &ConvertOptions::default()).unwrap();
    let loaded = load(&dest).unwrap();

    assert_eq!(loaded, converted);
    assert_eq!((loaded.width(), loaded.height()), (5, 8));

    let restored: Vec<_> = loaded.glyphs().map(|glyph| glyph.to_definition()).collect();
    assert_eq!(restored, definitions());
    assert_eq!(entries(&dir), ["font.bdf", "font.mfc"]);
}

#[test]
fn duplicate_codepoint_writes_nothing() {
    let dir = scratch("duplicate");
    let source = dir.join("font.bdf");
    let dest = dir.join("font.mfc");

    let mut defs = definitions();
    defs.push(GlyphDefinition::new('A' as u16, [0; 8]));
    fs::write(&source, write_bdf(&BdfFont::from_definitions(5, 8, defs))).unwrap();

    let err = convert(&source, &dest, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Parse(ref e) if matches!(e.kind, ParseErrorKind::DuplicateCodepoint { codepoint: 0x41, .. })
    ));
    assert_eq!(entries(&dir), ["font.bdf"]);
}

#[test]
fn failed_conversion_keeps_previous_container() {
    let dir = scratch("keep-previous");
    let source = dir.join("font.bdf");
    let dest = dir.join("font.mfc");

    fs::write(&source, write_bdf(&BdfFont::from_definitions(5, 8, definitions()))).unwrap();
    let original = convert(&source, &dest, &ConvertOptions::default()).unwrap();

    let broken = write_bdf(&BdfFont::from_definitions(5, 8, definitions()))
        .replacen("BITMAP\n70\n", "BITMAP\n700\n", 1);
    fs::write(&source, broken).unwrap();

    let err = convert(&source, &dest, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Parse(ref e) if matches!(e.kind, ParseErrorKind::RowWidth { .. })
    ));
    assert_eq!(load(&dest).unwrap(), original);
}

#[test]
fn missing_source_is_a_read_error() {
    let dir = scratch("missing");
    let err = convert(dir.join("nope.bdf"), dir.join("font.mfc"), &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::Read { .. }));
    assert!(entries(&dir).is_empty());
}

#[test]
fn unwritable_destination_is_a_write_error() {
    let dir = scratch("unwritable");
    let source = dir.join("font.bdf");
    fs::write(&source, write_bdf(&BdfFont::from_definitions(5, 8, definitions()))).unwrap();

    let err = convert(&source, dir.join("no/such/dir/font.mfc"), &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::Write { .. }));
}

#[test]
fn empty_source_gives_empty_container() {
    let dir = scratch("empty");
    let source = dir.join("empty.bdf");
    let dest = dir.join("empty.mfc");
    fs::write(&source, "").unwrap();

    let converted = convert(&source, &dest, &ConvertOptions::default()).unwrap();
    assert!(converted.is_empty());

    let loaded = load(&dest).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(render("N/A", &loaded, 1).width(), 2);
}

#[test]
fn truncated_container_is_corrupt() {
    let dir = scratch("truncated");
    let dest = dir.join("font.mfc");

    let font = BdfFont::from_definitions(5, 8, definitions())
        .to_container(&ConvertOptions::default())
        .unwrap();
    write_container(&dest, &font).unwrap();

    let mut bytes = fs::read(&dest).unwrap();
    bytes.truncate(bytes.len() - 3);
    fs::write(&dest, bytes).unwrap();

    assert!(matches!(
        load(&dest),
        Err(LoadError::Corrupt(ContainerError::LengthMismatch { count: 4, .. }))
    ));
}

#[test]
fn missing_container_is_an_io_error() {
    let dir = scratch("no-container");
    assert!(matches!(load(dir.join("font.mfc")), Err(LoadError::Io(_))));
}

#[test]
fn loaded_font_renders_with_fallback() {
    let dir = scratch("render");
    let dest = dir.join("font.mfc");

    let font = BdfFont::from_definitions(5, 8, definitions())
        .to_container(&ConvertOptions::default())
        .unwrap();
    write_container(&dest, &font).unwrap();
    let font = load(&dest).unwrap();

    // "Z" is not in the font and renders as a blank cell
    let strip = render("AZB", &font, 1);
    assert_eq!(strip.height(), 8);
    assert_eq!(strip.width(), 5 + 1 + 5 + 1 + 5);
    assert!((6..11).all(|x| strip.column(x).unwrap().iter().all(|&lit| !lit)));

    assert_eq!(render("AB", &font, 1).width(), 11);
}

#[test]
fn options_filter_and_flip() {
    let mut defs = definitions();
    defs.push(GlyphDefinition::new(0x07, [0x1F; 8]));
    let bdf = BdfFont::from_definitions(5, 8, defs);

    let font = bdf
        .to_container(&ConvertOptions {
            skip_control: true,
            flip_vertical: true,
        })
        .unwrap();

    assert!(font.glyph(0x07).is_none());
    assert_eq!(
        font.glyph('A' as u16).unwrap().rows(),
        &[0x00, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x0E]
    );
}
