//! Merging fonts into one.

use std::collections::HashSet;

use log::{debug, info};
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::{FontBuilder, tables::loca::LocaFormat};

use crate::{
    MergeError, Result,
    context::MergeContext,
    glyph_order::GlyphOrder,
    options::Options,
    tables::{
        cmap::merge_cmap,
        glyf::merge_glyf,
        head::{merge_head, merge_maxp},
        hint::check_hinting,
        layout::merge_gsub,
        metrics::{all_vertical, merge_hhea, merge_hmtx, merge_vhea, merge_vmtx},
        os2::merge_os2,
        post::merge_post,
    },
};

/// Tables rebuilt by the merger, or not valid after it
const HANDLED_TABLES: &[[u8; 4]] = &[
    *b"head", *b"maxp", *b"cmap", *b"hmtx", *b"hhea", *b"post", *b"OS/2", *b"vhea", *b"vmtx",
    *b"glyf", *b"loca", *b"CFF ", *b"CFF2", *b"VORG", *b"hdmx", *b"LTSH", *b"DSIG",
];

/// Merges TrueType fonts that share an em size.
///
/// The first font is the base: its glyphs keep their ids and its codepoints
/// win over later fonts. GSUB lookups of every font are combined. Tables
/// without a merge rule are copied from the base.
#[derive(Debug, Default)]
pub struct Merger {
    options: Options,
}

impl Merger {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Merge font files given as raw bytes.
    pub fn merge(&self, font_data: &[&[u8]]) -> Result<Vec<u8>> {
        if font_data.is_empty() {
            return Err(MergeError::NoFonts);
        }

        let fonts: Vec<FontRef> = font_data
            .iter()
            .map(|data| FontRef::new(data))
            .collect::<std::result::Result<_, _>>()?;

        self.merge_fonts(&fonts)
    }

    pub fn merge_fonts(&self, fonts: &[FontRef]) -> Result<Vec<u8>> {
        if fonts.is_empty() {
            return Err(MergeError::NoFonts);
        }
        validate_units_per_em(fonts)?;
        reject_cff(fonts)?;
        check_hinting(fonts);

        let glyph_order = GlyphOrder::compute(fonts)?;
        info!(
            "Merging {} fonts into {} glyphs",
            fonts.len(),
            glyph_order.total_glyphs()
        );
        let ctx = MergeContext::new(fonts, glyph_order);

        let (glyf, loca, loca_format) = merge_glyf(&ctx)?;
        let mut head = merge_head(&ctx)?;
        head.index_to_loc_format = match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        };

        let hmtx = merge_hmtx(&ctx)?;
        let hhea = merge_hhea(&ctx, hmtx.h_metrics.len() as u16)?;

        let mut builder = FontBuilder::new();
        builder.add_table(&head)?;
        builder.add_table(&merge_maxp(&ctx)?)?;
        builder.add_table(&merge_cmap(&ctx)?)?;
        builder.add_table(&hhea)?;
        builder.add_table(&hmtx)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;

        if !self.options.should_drop(Tag::new(b"post")) {
            builder.add_table(&merge_post(&ctx)?)?;
        }
        if let Some(os2) = merge_os2(&ctx)?.filter(|_| !self.options.should_drop(Tag::new(b"OS/2")))
        {
            builder.add_table(&os2)?;
        }
        if all_vertical(&ctx) && !self.options.should_drop(Tag::new(b"vmtx")) {
            let vmtx = merge_vmtx(&ctx)?;
            builder.add_table(&merge_vhea(&ctx, vmtx.v_metrics.len() as u16)?)?;
            builder.add_table(&vmtx)?;
        } else {
            debug!("Not every font has vertical metrics; vhea and vmtx omitted");
        }

        if !self.options.should_drop(Tag::new(b"GSUB"))
            && let Some(gsub) = merge_gsub(&ctx)?
        {
            builder.add_table(&gsub)?;
        }

        self.copy_base_tables(&mut builder, ctx.base());

        Ok(builder.build())
    }

    fn copy_base_tables<'a>(&self, builder: &mut FontBuilder<'a>, base: &FontRef<'a>) {
        let handled: HashSet<Tag> = HANDLED_TABLES.iter().map(Tag::new).collect();

        for record in base.table_directory.table_records() {
            let tag = record.tag();
            if handled.contains(&tag) || self.options.should_drop(tag) || builder.contains(tag) {
                continue;
            }
            if let Some(data) = base.table_data(tag) {
                debug!("Copying '{tag}' from the base font");
                builder.add_raw(tag, data);
            }
        }
    }
}

fn validate_units_per_em(fonts: &[FontRef]) -> Result<()> {
    let (first, rest) = fonts.split_first().ok_or(MergeError::NoFonts)?;
    let expected = first.head()?.units_per_em();
    rest.iter().try_for_each(|font| {
        let actual = font.head()?.units_per_em();
        if actual == expected {
            Ok(())
        } else {
            Err(MergeError::IncompatibleUnitsPerEm { expected, actual })
        }
    })
}

fn reject_cff(fonts: &[FontRef]) -> Result<()> {
    let cff = [Tag::new(b"CFF "), Tag::new(b"CFF2")];
    match fonts
        .iter()
        .position(|font| cff.iter().any(|tag| font.table_data(*tag).is_some()))
    {
        Some(idx) => Err(MergeError::CffNotSupported(idx)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merger_no_fonts() {
        let merger = Merger::default();
        assert!(matches!(merger.merge(&[]), Err(MergeError::NoFonts)));
        assert!(matches!(merger.merge_fonts(&[]), Err(MergeError::NoFonts)));
    }
}
