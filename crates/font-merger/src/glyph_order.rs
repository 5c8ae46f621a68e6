//! Glyph order of the merged font.
//!
//! The merged order lists the glyphs of the first font at their original ids,
//! followed by the glyphs of every later font. Names are taken from `post`
//! and made unique with `.N` suffixes, so the merged `post` table can carry
//! them all.

use std::{
    borrow::Borrow,
    collections::{HashMap, HashSet},
    fmt::{self, Display, Formatter},
};

use read_fonts::{FontRef, TableProvider, types::GlyphId16};

use crate::{
    MergeError, Result,
    types::{GlyphId, MegaGlyphId},
};

/// A glyph name, unique within the merged font
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphName(String);

impl GlyphName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Glyph order shared by every table merger
#[derive(Debug, Clone)]
pub struct GlyphOrder {
    mega: Vec<GlyphName>,
    /// Per font, the merged name of each source glyph, indexed by source gid
    per_font: Vec<Vec<GlyphName>>,
    name_to_mega: HashMap<GlyphName, MegaGlyphId>,
}

impl GlyphOrder {
    /// Compute the merged order of `fonts`.
    pub fn compute(fonts: &[FontRef]) -> Result<Self> {
        Self::from_names(fonts.iter().map(source_glyph_names).collect())
    }

    /// Build the order from the glyph names of each source font.
    pub fn from_names(sources: Vec<Vec<String>>) -> Result<Self> {
        let total: usize = sources.iter().map(Vec::len).sum();
        if total > usize::from(u16::MAX) {
            return Err(MergeError::TooManyGlyphs(total));
        }

        let mut taken: HashSet<String> = HashSet::with_capacity(total);
        let mut mega = Vec::with_capacity(total);
        let mut per_font = Vec::with_capacity(sources.len());

        for names in sources {
            let mut mapping = Vec::with_capacity(names.len());
            for name in names {
                let unique = unique_name(&taken, name);
                taken.insert(unique.clone());
                let name = GlyphName::new(unique);
                mega.push(name.clone());
                mapping.push(name);
            }
            per_font.push(mapping);
        }

        let name_to_mega = mega
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), MegaGlyphId::new(i as u16)))
            .collect();

        Ok(Self { mega, per_font, name_to_mega })
    }

    /// All glyph names in merged order
    pub fn mega(&self) -> &[GlyphName] {
        &self.mega
    }

    pub fn total_glyphs(&self) -> u16 {
        self.mega.len() as u16
    }

    /// Merged id of the first glyph of a font.
    ///
    /// Each font's glyphs are contiguous in the merged order, so every
    /// source id of that font moves by this same amount.
    pub fn font_offset(&self, font_idx: usize) -> u16 {
        self.per_font[..font_idx].iter().map(Vec::len).sum::<usize>() as u16
    }

    /// Source glyphs of one font with their merged names
    pub fn font_glyphs(&self, font_idx: usize) -> impl Iterator<Item = (GlyphId, &GlyphName)> {
        self.per_font[font_idx]
            .iter()
            .enumerate()
            .map(|(gid, name)| (GlyphId::new(gid as u16), name))
    }

    pub fn mega_id(&self, name: &str) -> Option<MegaGlyphId> {
        self.name_to_mega.get(name).copied()
    }

    /// Merged id of a source glyph
    pub fn remap(&self, font_idx: usize, gid: GlyphId) -> Option<MegaGlyphId> {
        let name = self.per_font.get(font_idx)?.get(usize::from(gid.to_u16()))?;
        self.mega_id(name.as_str())
    }
}

fn unique_name(taken: &HashSet<String>, name: String) -> String {
    if !taken.contains(&name) {
        return name;
    }
    (1..)
        .map(|n| format!("{name}.{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(name)
}

/// Glyph names from `post`, with generated names where it has none.
fn source_glyph_names(font: &FontRef) -> Vec<String> {
    let num_glyphs = font.maxp().map(|m| m.num_glyphs()).unwrap_or_default();
    let post = font.post().ok();

    (0..num_glyphs)
        .map(|gid| {
            post.as_ref()
                .and_then(|p| p.glyph_name(GlyphId16::new(gid)))
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| {
                    if gid == 0 { ".notdef".into() } else { format!("glyph{gid:05}") }
                })
        })
        .collect()
}
