use crate::{FontContainer, Glyph, PixelStrip, Renderer};

/// What to draw for characters the font has no glyph for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fallback {
    /// An unlit cell of the font's width.
    #[default]
    Blank,
    /// Another glyph from the same font, e.g. `?`. Drawn blank if the font
    /// lacks that glyph too.
    Glyph(u16),
}

/// A [Renderer] which draws text using a loaded [FontContainer].
#[derive(Debug, Clone, Copy)]
pub struct GlyphRenderer<'a> {
    font: &'a FontContainer,
    fallback: Fallback,
    spacing: usize,
}

impl<'a> GlyphRenderer<'a> {
    pub fn new(font: &'a FontContainer) -> Self {
        Self {
            font,
            fallback: Fallback::default(),
            spacing: 0,
        }
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Blank columns inserted between consecutive glyphs.
    pub fn with_spacing(mut self, spacing: usize) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn font(&self) -> &'a FontContainer {
        self.font
    }

    fn resolve(&self, character: char) -> Option<Glyph<'a>> {
        let found = u16::try_from(u32::from(character))
            .ok()
            .and_then(|codepoint| self.font.glyph(codepoint));

        if found.is_some() {
            return found;
        }

        log::trace!("no glyph for {character:?}, using {:?}", self.fallback);

        match self.fallback {
            Fallback::Blank => None,
            Fallback::Glyph(codepoint) => self.font.glyph(codepoint),
        }
    }
}

impl Renderer for GlyphRenderer<'_> {
    fn render_text(&self, text: &str) -> PixelStrip {
        let mut strip = PixelStrip::new(usize::from(self.font.height()));

        for (i, character) in text.chars().enumerate() {
            if i > 0 {
                strip.push_blank(self.spacing);
            }

            match self.resolve(character) {
                Some(glyph) => strip.push_glyph(&glyph),
                None => strip.push_blank(usize::from(self.font.width())),
            }
        }

        strip
    }
}

/// Render `text` with `font`, leaving `spacing` blank columns between
/// glyphs. Characters missing from the font become blank cells.
pub fn render(text: &str, font: &FontContainer, spacing: usize) -> PixelStrip {
    GlyphRenderer::new(font)
        .with_spacing(spacing)
        .render_text(text)
}
