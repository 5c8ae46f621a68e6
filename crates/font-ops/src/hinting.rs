//! TrueType hint removal.
//!
//! Equivalent of `ttfautohint --dehint`: the font programs and hint caches
//! are dropped, every glyph loses its instructions and the `maxp` limits that
//! only matter to the interpreter are reset.

use anyhow::{Context, Result};
use log::{info, warn};
use read_fonts::{
    FontRef, TableProvider,
    types::{GlyphId, Tag},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{GlyfLocaBuilder, Glyph},
        head::Head,
        maxp::Maxp,
    },
};

use crate::{
    builder_without,
    glyph::{RebuildOptions, rebuild_glyph},
};

/// Tables that only carry hinting data.
pub const HINTING_TABLES: &[Tag] = &[
    Tag::new(b"fpgm"),
    Tag::new(b"prep"),
    Tag::new(b"cvt "),
    Tag::new(b"hdmx"),
    Tag::new(b"LTSH"),
    Tag::new(b"VDMX"),
    Tag::new(b"TTFA"),
];

/// Remove all TrueType hinting from a font.
pub fn strip_hinting(data: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;

    let mut skip = HINTING_TABLES.to_vec();
    skip.extend([Tag::new(b"glyf"), Tag::new(b"loca"), Tag::new(b"head"), Tag::new(b"maxp")]);
    let mut builder = builder_without(&font, &skip);

    let mut head: Head = font.head()?.to_owned_table();

    if let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) {
        let num_glyphs = font.maxp()?.num_glyphs();
        let options = RebuildOptions::IDENTITY.without_instructions();
        let mut glyf_builder = GlyfLocaBuilder::new();

        for gid in 0..num_glyphs {
            let glyph = match loca.get_glyf(GlyphId::new(gid as u32), &glyf) {
                Ok(Some(glyph)) => rebuild_glyph(&glyph, options, |g| g)
                    .with_context(|| format!("Failed to rebuild glyph {gid}"))?,
                Ok(None) => Glyph::Empty,
                Err(e) => {
                    warn!("glyph {gid} is unreadable, writing it empty: {e}");
                    Glyph::Empty
                }
            };
            glyf_builder
                .add_glyph(&glyph)
                .with_context(|| format!("Failed to write glyph {gid}"))?;
        }

        let (glyf, loca, loca_format) = glyf_builder.build();
        head.index_to_loc_format = loca_format as i16;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
    }

    let mut maxp: Maxp = font.maxp()?.to_owned_table();
    reset_hinting_limits(&mut maxp);

    builder.add_table(&head)?;
    builder.add_table(&maxp)?;

    info!("Removed hinting ({} glyphs)", maxp.num_glyphs);
    Ok(builder.build())
}

/// Reset the `maxp` fields that size the TrueType interpreter.
///
/// Version 0.5 tables have none of them and are left alone.
pub fn reset_hinting_limits(maxp: &mut Maxp) {
    if maxp.max_zones.is_some() {
        maxp.max_zones = Some(1);
        maxp.max_twilight_points = Some(0);
        maxp.max_storage = Some(0);
        maxp.max_function_defs = Some(0);
        maxp.max_instruction_defs = Some(0);
        maxp.max_stack_elements = Some(0);
        maxp.max_size_of_instructions = Some(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestFont, TestGlyph};

    #[test]
    fn test_strip_hinting() {
        let data = TestFont::new(1000)
            .glyph(TestGlyph::square("A", Some('A'), 600).with_instructions(vec![0xb0, 0x01]))
            .table(Tag::new(b"fpgm"), vec![0xb0, 0x00])
            .table(Tag::new(b"prep"), vec![0xb0, 0x00])
            .table(Tag::new(b"cvt "), vec![0x00, 0x10])
            .build();

        let stripped = strip_hinting(&data).unwrap();
        let font = FontRef::new(&stripped).unwrap();

        for tag in HINTING_TABLES {
            assert!(font.table_data(*tag).is_none(), "{tag} still present");
        }

        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();
        let Some(read_fonts::tables::glyf::Glyph::Simple(simple)) =
            loca.get_glyf(GlyphId::new(1), &glyf).unwrap()
        else {
            panic!("expected simple glyph");
        };
        assert!(simple.instructions().is_empty());
        assert_eq!(simple.x_min(), 50);

        let maxp = font.maxp().unwrap();
        assert_eq!(maxp.num_glyphs(), 2);
        assert_eq!(maxp.max_function_defs(), Some(0));
    }

    #[test]
    fn test_strip_hinting_keeps_cmap() {
        let data = TestFont::new(1000).square("A", 'A', 600).build();
        let stripped = strip_hinting(&data).unwrap();
        let font = FontRef::new(&stripped).unwrap();
        assert!(font.cmap().unwrap().map_codepoint('A').is_some());
    }
}
