//! TrueType hinting across merged fonts.
//!
//! Hint programs (`fpgm`, `prep`, `cvt `) reference function and control
//! value indices private to their font, so only the base font keeps them.
//! Glyphs from every later font lose their instructions in `glyf`.

use log::{debug, warn};
use read_fonts::FontRef;

use robotonoto_font_ops::HINTING_TABLES;

/// Hinting tables present in a font
pub fn hinting_tables(font: &FontRef) -> Vec<String> {
    HINTING_TABLES
        .iter()
        .filter(|tag| font.table_data(**tag).is_some())
        .map(|tag| tag.to_string())
        .collect()
}

/// Report hinting data that will not survive the merge.
///
/// Returns the indices of later fonts whose hinting is dropped.
pub fn check_hinting(fonts: &[FontRef]) -> Vec<usize> {
    let mut dropped = Vec::new();
    for (idx, font) in fonts.iter().enumerate() {
        let tables = hinting_tables(font);
        if tables.is_empty() {
            continue;
        }
        debug!("Font {idx}: hinting tables {}", tables.join(", "));
        if idx > 0 {
            dropped.push(idx);
        }
    }

    if !dropped.is_empty() {
        warn!(
            "Hinting of font(s) {:?} is dropped; only the first font keeps its hint programs",
            dropped
        );
    }
    dropped
}
