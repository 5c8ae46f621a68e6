//! cmap table merging

use std::collections::BTreeMap;

use indexmap::{IndexMap, map::Entry};
use log::debug;
use robotonoto_font_ops::cmap::{VariationGlyph, variation_subtable};
use skrifa::{MetadataProvider, charmap::MapVariant};
use write_fonts::tables::cmap::{
    Cmap, Cmap12, Cmap14, CmapSubtable, EncodingRecord, PlatformId, SequentialMapGroup,
};

use crate::{Result, context::MergeContext, types::GlyphId};

/// A merged glyph and the font it came from
#[derive(Debug, Clone, Copy)]
struct Nominal {
    gid: u32,
    font_idx: usize,
}

/// Merge the character maps of all fonts.
///
/// A codepoint keeps the glyph of the first font that maps it. Variation
/// sequences follow the same rule per `(selector, codepoint)`.
pub fn merge_cmap(ctx: &MergeContext) -> Result<Cmap> {
    let mut codepoints: IndexMap<u32, Nominal> = IndexMap::new();
    let mut shadowed = 0usize;

    for (font_idx, font) in ctx.fonts().iter().enumerate() {
        for (codepoint, gid) in font.charmap().mappings() {
            let Some(gid) = merged_gid(ctx, font_idx, gid) else {
                continue;
            };
            match codepoints.entry(codepoint) {
                Entry::Vacant(slot) => {
                    slot.insert(Nominal { gid: u32::from(gid), font_idx });
                }
                Entry::Occupied(_) => shadowed += 1,
            }
        }
    }

    if shadowed > 0 {
        debug!("{shadowed} codepoints already mapped by an earlier font");
    }

    let sequences = merge_variation_sequences(ctx, &codepoints);
    let variations = if sequences.is_empty() {
        None
    } else {
        debug!("Merged {} variation sequences", sequences.len());
        Some(variation_subtable(&sequences)?)
    };

    let mut mappings: Vec<(u32, u32)> =
        codepoints.into_iter().map(|(codepoint, nominal)| (codepoint, nominal.gid)).collect();
    mappings.sort_unstable();
    Ok(build_cmap(&mappings, variations))
}

fn merged_gid(ctx: &MergeContext, font_idx: usize, gid: skrifa::GlyphId) -> Option<u16> {
    let gid = u16::try_from(gid.to_u32()).ok()?;
    ctx.remap(font_idx, GlyphId::new(gid)).map(|mega| mega.to_u16())
}

/// Variation sequences of every font, keyed by `(selector, codepoint)`.
///
/// A default-glyph sequence stays a default only when the merged nominal
/// glyph of its base character comes from the same font. Otherwise it is
/// pinned to that font's own nominal glyph.
fn merge_variation_sequences(
    ctx: &MergeContext,
    nominal: &IndexMap<u32, Nominal>,
) -> BTreeMap<(u32, u32), VariationGlyph> {
    let mut sequences = BTreeMap::new();

    for (font_idx, font) in ctx.fonts().iter().enumerate() {
        let charmap = font.charmap();
        for (codepoint, selector, variant) in charmap.variant_mappings() {
            let glyph = match variant {
                MapVariant::Variant(gid) => {
                    merged_gid(ctx, font_idx, gid).map(VariationGlyph::Glyph)
                }
                MapVariant::UseDefault => match nominal.get(&codepoint) {
                    Some(owner) if owner.font_idx == font_idx => Some(VariationGlyph::Default),
                    _ => charmap
                        .map(codepoint)
                        .and_then(|gid| merged_gid(ctx, font_idx, gid))
                        .map(VariationGlyph::Glyph),
                },
            };
            if let Some(glyph) = glyph {
                sequences.entry((selector, codepoint)).or_insert(glyph);
            }
        }
    }

    sequences
}

/// Build a cmap with format 12 subtables and an optional format 14 one.
///
/// Format 4 stores its length in 16 bits, which a CJK-sized map overflows.
fn build_cmap(mappings: &[(u32, u32)], variations: Option<Cmap14>) -> Cmap {
    let subtable = CmapSubtable::Format12(Cmap12 {
        language: 0,
        groups: sequential_groups(mappings),
    });

    let mut records = vec![EncodingRecord::new(PlatformId::Unicode, 4, subtable.clone())];
    if let Some(variations) = variations {
        records.push(EncodingRecord::new(
            PlatformId::Unicode,
            5,
            CmapSubtable::Format14(variations),
        ));
    }
    records.push(EncodingRecord::new(PlatformId::Windows, 10, subtable));

    Cmap::new(records)
}

/// Runs of consecutive codepoints mapped to consecutive glyphs.
fn sequential_groups(mappings: &[(u32, u32)]) -> Vec<SequentialMapGroup> {
    let mut groups = Vec::new();
    let mut iter = mappings.iter().copied();
    let Some((mut start_cp, mut start_gid)) = iter.next() else {
        return groups;
    };
    let (mut prev_cp, mut prev_gid) = (start_cp, start_gid);

    for (cp, gid) in iter {
        if cp != prev_cp + 1 || gid != prev_gid + 1 {
            groups.push(SequentialMapGroup::new(start_cp, prev_cp, start_gid));
            (start_cp, start_gid) = (cp, gid);
        }
        (prev_cp, prev_gid) = (cp, gid);
    }
    groups.push(SequentialMapGroup::new(start_cp, prev_cp, start_gid));

    groups
}
