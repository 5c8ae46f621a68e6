//! Unicode variation sequence (cmap format 14) subtables.

use std::collections::BTreeMap;

use font_types::Uint24;
use write_fonts::{
    dump_table,
    error::Error,
    tables::cmap::{Cmap14, DefaultUvs, NonDefaultUvs, UnicodeRange, UvsMapping, VariationSelector},
};

/// What a variation sequence maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationGlyph {
    /// The nominal glyph of the base character
    Default,
    Glyph(u16),
}

/// Build a format 14 subtable from sequences keyed by `(selector, codepoint)`.
pub fn variation_subtable(
    sequences: &BTreeMap<(u32, u32), VariationGlyph>,
) -> Result<Cmap14, Error> {
    let mut selectors: BTreeMap<u32, (Vec<u32>, Vec<UvsMapping>)> = BTreeMap::new();
    for (&(selector, codepoint), glyph) in sequences {
        let (defaults, mappings) = selectors.entry(selector).or_default();
        match glyph {
            VariationGlyph::Default => defaults.push(codepoint),
            VariationGlyph::Glyph(gid) => {
                mappings.push(UvsMapping::new(Uint24::new(codepoint), *gid));
            }
        }
    }

    let records: Vec<VariationSelector> = selectors
        .into_iter()
        .map(|(selector, (defaults, mappings))| {
            let ranges = default_ranges(&defaults);
            let default_uvs =
                (!ranges.is_empty()).then(|| DefaultUvs::new(ranges.len() as u32, ranges));
            let non_default_uvs = (!mappings.is_empty())
                .then(|| NonDefaultUvs::new(mappings.len() as u32, mappings));
            VariationSelector::new(Uint24::new(selector), default_uvs, non_default_uvs)
        })
        .collect();

    // The length field is not derived by the writer. Its own size is fixed,
    // so packing once with a placeholder gives the final length.
    let mut subtable = Cmap14::new(0, records.len() as u32, records);
    subtable.length = dump_table(&subtable)?.len() as u32;
    Ok(subtable)
}

/// Sorted codepoints as runs of at most 256 consecutive values.
fn default_ranges(codepoints: &[u32]) -> Vec<UnicodeRange> {
    let mut ranges: Vec<UnicodeRange> = Vec::new();
    for &codepoint in codepoints {
        if let Some(last) = ranges.last_mut() {
            let end = last.start_unicode_value.to_u32() + u32::from(last.additional_count);
            if codepoint == end + 1 && last.additional_count < u8::MAX {
                last.additional_count += 1;
                continue;
            }
        }
        ranges.push(UnicodeRange::new(Uint24::new(codepoint), 0));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use read_fonts::{FontData, FontRead, tables::cmap::MapVariant};

    use super::*;

    #[test]
    fn test_default_ranges() {
        let ranges = default_ranges(&[0x41, 0x42, 0x43, 0x50]);
        let runs: Vec<(u32, u8)> = ranges
            .iter()
            .map(|r| (r.start_unicode_value.to_u32(), r.additional_count))
            .collect();
        assert_eq!(runs, vec![(0x41, 2), (0x50, 0)]);
    }

    #[test]
    fn test_default_range_limit() {
        let codepoints: Vec<u32> = (0x4E00..0x4E00 + 300).collect();
        let ranges = default_ranges(&codepoints);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].additional_count, u8::MAX);
        assert_eq!(ranges[1].start_unicode_value.to_u32(), 0x4E00 + 256);
        assert_eq!(ranges[1].additional_count, 43);
    }

    #[test]
    fn test_variation_subtable_reads_back() {
        let sequences = BTreeMap::from([
            ((0xE0100, 0x845B), VariationGlyph::Default),
            ((0xE0101, 0x845B), VariationGlyph::Glyph(7)),
            ((0xFE00, 0x2205), VariationGlyph::Glyph(3)),
        ]);
        let subtable = variation_subtable(&sequences).unwrap();
        let bytes = dump_table(&subtable).unwrap();
        assert_eq!(subtable.length as usize, bytes.len());

        let read = read_fonts::tables::cmap::Cmap14::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read.num_var_selector_records(), 3);
        assert!(matches!(read.map_variant(0x845Bu32, 0xE0100u32), Some(MapVariant::UseDefault)));
        assert!(matches!(
            read.map_variant(0x845Bu32, 0xE0101u32),
            Some(MapVariant::Variant(gid)) if gid.to_u32() == 7
        ));
        assert!(matches!(
            read.map_variant(0x2205u32, 0xFE00u32),
            Some(MapVariant::Variant(gid)) if gid.to_u32() == 3
        ));
        assert!(read.map_variant(0x2205u32, 0xE0100u32).is_none());
    }
}
