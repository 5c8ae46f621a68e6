//! State shared by the table mergers.

use read_fonts::FontRef;

use crate::{
    glyph_order::{GlyphName, GlyphOrder},
    types::{GlyphId, MegaGlyphId},
};

/// Fonts being merged and their merged glyph order
pub struct MergeContext<'a> {
    fonts: &'a [FontRef<'a>],
    glyph_order: GlyphOrder,
}

impl<'a> MergeContext<'a> {
    pub fn new(fonts: &'a [FontRef<'a>], glyph_order: GlyphOrder) -> Self {
        Self { fonts, glyph_order }
    }

    pub fn fonts(&self) -> &[FontRef<'a>] {
        self.fonts
    }

    /// The base font; tables without a merge rule come from it.
    pub fn base(&self) -> &FontRef<'a> {
        &self.fonts[0]
    }

    /// Amount every glyph id of `font_idx` moves by in the merged order
    pub fn glyph_offset(&self, font_idx: usize) -> u16 {
        self.glyph_order.font_offset(font_idx)
    }

    pub fn mega(&self) -> &[GlyphName] {
        self.glyph_order.mega()
    }

    pub fn total_glyphs(&self) -> u16 {
        self.glyph_order.total_glyphs()
    }

    pub fn font_glyphs(&self, font_idx: usize) -> impl Iterator<Item = (GlyphId, &GlyphName)> {
        self.glyph_order.font_glyphs(font_idx)
    }

    pub fn remap(&self, font_idx: usize, gid: GlyphId) -> Option<MegaGlyphId> {
        self.glyph_order.remap(font_idx, gid)
    }
}
