//! Font subsetting on top of hb-subset.
//!
//! The build uses it to strip from the Japanese font every character the
//! Latin font already covers, so the merged font takes those glyphs from the
//! Latin side.
//!
//! ```no_run
//! use robotonoto_font_subsetter::{Subsetter, strip_codepoints};
//!
//! let latin: &[u8] = &[];
//! let japanese: &[u8] = &[];
//! let stripped = strip_codepoints(japanese, latin);
//!
//! let kana = Subsetter::new()
//!     .with_unicode_ranges([(0x3041, 0x30FF)])
//!     .subset(japanese);
//! ```

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use log::info;
use skrifa::{FontRef, MetadataProvider};

/// Layout features kept when subsetting.
///
/// Covers the Japanese width, vertical and kana features together with the
/// common Latin ones.
pub const LAYOUT_FEATURES: &[&[u8; 4]] = &[
    b"aalt", b"ccmp", b"dlig", b"fwid", b"hwid", b"jp78", b"jp83", b"jp90", b"liga", b"locl",
    b"nlck", b"pwid", b"vert", b"vjmo", b"vrt2", b"halt", b"vhal", b"kern", b"mark", b"mkmk",
    b"palt", b"vpal", b"hkna", b"vkna", b"ruby", b"trad", b"expt", b"calt", b"frac", b"sups",
];

/// Font subsetter with builder pattern.
#[derive(Debug, Default, Clone)]
pub struct Subsetter {
    unicode_ranges: Vec<(u32, u32)>,
    codepoints: BTreeSet<u32>,
    retain_glyph_names: bool,
    layout_features: Vec<[u8; 4]>,
}

impl Subsetter {
    /// A subsetter keeping [`LAYOUT_FEATURES`] and glyph names.
    pub fn new() -> Self {
        Self {
            retain_glyph_names: true,
            layout_features: LAYOUT_FEATURES.iter().map(|f| **f).collect(),
            ..Default::default()
        }
    }

    /// Adds inclusive Unicode ranges to the subset.
    pub fn with_unicode_ranges(mut self, ranges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        self.unicode_ranges.extend(ranges);
        self
    }

    /// Adds individual codepoints to the subset.
    pub fn with_codepoints(mut self, codepoints: impl IntoIterator<Item = u32>) -> Self {
        self.codepoints.extend(codepoints);
        self
    }

    /// Sets whether `post` glyph names survive subsetting.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    /// Replaces the layout features to retain.
    pub fn with_layout_features(mut self, features: impl IntoIterator<Item = [u8; 4]>) -> Self {
        self.layout_features = features.into_iter().collect();
        self
    }

    fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.unicode_ranges
            .iter()
            .flat_map(|(start, end)| *start..=*end)
            .chain(self.codepoints.iter().copied())
            .filter_map(char::from_u32)
    }

    /// Subsets the font data and returns the result.
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = SubsetInput::new()?;

        if self.retain_glyph_names {
            input.flags().retain_glyph_names();
        }

        {
            let mut feature_set = input.layout_feature_tag_set();
            for tag in &self.layout_features {
                feature_set.insert(Tag::new(tag));
            }
        }

        {
            let mut unicode_set = input.unicode_set();
            for c in self.chars() {
                unicode_set.insert(c);
            }
        }

        let font = FontFace::new(Blob::from_bytes(data)?)?;
        let subset_font = input.subset_font(&font)?;
        Ok(subset_font.underlying_blob().to_vec())
    }
}

/// Codepoints mapped by a font's cmap.
pub fn mapped_codepoints(data: &[u8]) -> Result<BTreeSet<u32>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    Ok(font.charmap().mappings().map(|(cp, _)| cp).collect())
}

/// Remove from `secondary` every codepoint that `primary` maps.
///
/// Glyphs only reachable through removed codepoints are dropped. Glyphs still
/// reachable through retained layout features stay.
pub fn strip_codepoints(secondary: &[u8], primary: &[u8]) -> Result<Vec<u8>> {
    let covered = mapped_codepoints(primary).context("Failed to read primary cmap")?;
    let own = mapped_codepoints(secondary).context("Failed to read secondary cmap")?;

    let kept: BTreeSet<u32> = own.difference(&covered).copied().collect();
    info!(
        "Stripping {} duplicate codepoints, keeping {}",
        own.len() - kept.len(),
        kept.len()
    );

    Subsetter::new().with_codepoints(kept).subset(secondary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use robotonoto_font_ops::testing::TestFont;

    #[test]
    fn test_layout_features_unique() {
        let unique: BTreeSet<_> = LAYOUT_FEATURES.iter().collect();
        assert_eq!(unique.len(), LAYOUT_FEATURES.len());
    }

    #[test]
    fn test_builder_chain() {
        let subsetter = Subsetter::new()
            .with_unicode_ranges([(0x0041, 0x0043)])
            .with_codepoints([0x3042, 0x0041])
            .retain_glyph_names(false)
            .with_layout_features([*b"kern", *b"liga"]);

        assert!(!subsetter.retain_glyph_names);
        assert_eq!(subsetter.layout_features.len(), 2);
        let chars: Vec<char> = subsetter.chars().collect();
        assert_eq!(chars, vec!['A', 'B', 'C', 'A', 'あ']);
    }

    #[test]
    fn test_chars_skip_surrogates() {
        let subsetter = Subsetter::new().with_unicode_ranges([(0xD7FF, 0xE000)]);
        assert_eq!(subsetter.chars().count(), 2);
    }

    #[test]
    fn test_mapped_codepoints() {
        let data = TestFont::new(1000).square("A", 'A', 600).square("a", 'a', 500).build();
        let codepoints = mapped_codepoints(&data).unwrap();
        assert_eq!(codepoints.into_iter().collect::<Vec<_>>(), vec![0x41, 0x61]);
    }

    #[test]
    fn test_mapped_codepoints_rejects_garbage() {
        assert!(mapped_codepoints(b"garbage").is_err());
    }
}
