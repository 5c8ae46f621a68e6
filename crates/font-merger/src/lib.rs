//! Merge TrueType fonts into one font.
//!
//! The first font is the base font. Its glyph ids, codepoints, names,
//! layout tables and hint programs survive unchanged; later fonts contribute
//! glyphs and the codepoints the base font does not map.

mod context;
mod error;
mod glyph_order;
mod merger;
mod options;
mod strategies;
mod tables;
mod types;

pub use context::MergeContext;
pub use error::{MergeError, Result};
pub use glyph_order::{GlyphName, GlyphOrder};
pub use merger::Merger;
pub use options::Options;
pub use types::{GlyphId, MegaGlyphId, TableTag};

/// Merge fonts given as raw bytes with default options.
///
/// ```no_run
/// use robotonoto_font_merger::merge_fonts;
///
/// let latin = std::fs::read("Roboto-Regular.ttf").unwrap();
/// let cjk = std::fs::read("NotoSansJP-Regular.ttf").unwrap();
/// let merged = merge_fonts(&[&latin, &cjk]).unwrap();
/// ```
pub fn merge_fonts(fonts: &[&[u8]]) -> Result<Vec<u8>> {
    Merger::default().merge(fonts)
}
