//! Uniform rescaling of a TrueType font to a new em size.
//!
//! Every font-unit value in the outline and metrics tables is multiplied by
//! `target / unitsPerEm` and rounded half away from zero. Tables holding font
//! units this crate does not rewrite are dropped rather than left at the old
//! scale.

mod error;

use font_types::{FWord, UfWord};
use log::{debug, info, warn};
use read_fonts::{
    FontRef, TableProvider,
    types::{GlyphId, Tag},
};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        glyf::{GlyfLocaBuilder, Glyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        os2::Os2,
        post::Post,
        vhea::Vhea,
        vmtx::{LongMetric as VerticalMetric, Vmtx},
    },
};

use robotonoto_font_ops::{
    HINTING_TABLES, RebuildOptions, builder_without, rebuild_glyph, reset_hinting_limits,
};

pub use error::{Result, ScaleError};

/// Tables with font-unit values that are not rescaled.
pub const UNSCALED_TABLES: &[Tag] = &[
    Tag::new(b"GPOS"),
    Tag::new(b"kern"),
    Tag::new(b"BASE"),
    Tag::new(b"VORG"),
    Tag::new(b"JSTF"),
    Tag::new(b"MATH"),
];

const REBUILT_TABLES: &[Tag] = &[
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"hmtx"),
    Tag::new(b"vhea"),
    Tag::new(b"vmtx"),
    Tag::new(b"maxp"),
    Tag::new(b"OS/2"),
    Tag::new(b"post"),
];

/// Scale factor with range-checked conversions.
#[derive(Debug, Clone, Copy)]
struct Scale(f64);

impl Scale {
    fn apply(self, value: f64) -> f64 {
        (value * self.0).round()
    }

    fn i16(self, value: i16, table: &'static str, field: &'static str) -> Result<i16> {
        let scaled = self.apply(value.into());
        if scaled < f64::from(i16::MIN) || scaled > f64::from(i16::MAX) {
            return Err(ScaleError::Overflow { table, field });
        }
        Ok(scaled as i16)
    }

    fn u16(self, value: u16, table: &'static str, field: &'static str) -> Result<u16> {
        let scaled = self.apply(value.into());
        if scaled > f64::from(u16::MAX) {
            return Err(ScaleError::Overflow { table, field });
        }
        Ok(scaled as u16)
    }

    fn fword(self, value: FWord, table: &'static str, field: &'static str) -> Result<FWord> {
        self.i16(value.to_i16(), table, field).map(FWord::new)
    }

    fn ufword(self, value: UfWord, table: &'static str, field: &'static str) -> Result<UfWord> {
        self.u16(value.to_u16(), table, field).map(UfWord::new)
    }
}

/// Rescale a font so that `head.unitsPerEm` becomes `target_upem`.
///
/// A font already at the target size is returned unchanged.
pub fn scale_to_upem(data: &[u8], target_upem: u16) -> Result<Vec<u8>> {
    if target_upem == 0 {
        return Err(ScaleError::ZeroTarget);
    }

    let font = FontRef::new(data)?;
    let source_upem = font.head()?.units_per_em();
    if source_upem == target_upem {
        debug!("Font is already at {target_upem} units per em");
        return Ok(data.to_vec());
    }
    if source_upem == 0 {
        return Err(ScaleError::Overflow { table: "head", field: "unitsPerEm" });
    }
    if font.table_data(Tag::new(b"CFF ")).is_some() || font.table_data(Tag::new(b"CFF2")).is_some()
    {
        return Err(ScaleError::CffNotSupported);
    }

    let scale = Scale(f64::from(target_upem) / f64::from(source_upem));

    let mut skip: Vec<Tag> = REBUILT_TABLES.to_vec();
    for tag in UNSCALED_TABLES.iter().chain(HINTING_TABLES) {
        if font.table_data(*tag).is_some() {
            warn!("Dropping '{tag}': its values are not rescaled");
        }
        skip.push(*tag);
    }
    let mut builder = builder_without(&font, &skip);

    let mut head: Head = font.head()?.to_owned_table();
    head.units_per_em = target_upem;
    head.x_min = scale.i16(head.x_min, "head", "xMin")?;
    head.y_min = scale.i16(head.y_min, "head", "yMin")?;
    head.x_max = scale.i16(head.x_max, "head", "xMax")?;
    head.y_max = scale.i16(head.y_max, "head", "yMax")?;

    if let Some(loca_format) = scale_glyf(&font, scale, &mut builder)? {
        head.index_to_loc_format = loca_format;
    }
    builder.add_table(&head)?;

    let mut maxp: Maxp = font.maxp()?.to_owned_table();
    reset_hinting_limits(&mut maxp);
    builder.add_table(&maxp)?;

    builder.add_table(&scale_hhea(&font, scale)?)?;
    builder.add_table(&scale_hmtx(&font, scale)?)?;

    if let (Ok(vhea), Ok(_)) = (font.vhea(), font.vmtx()) {
        let vhea: Vhea = vhea.to_owned_table();
        builder.add_table(&scale_vhea(vhea, scale)?)?;
        builder.add_table(&scale_vmtx(&font, scale)?)?;
    }

    if let Ok(os2) = font.os2() {
        builder.add_table(&scale_os2(os2.to_owned_table(), scale)?)?;
    }

    if let Ok(post) = font.post() {
        let mut post: Post = post.to_owned_table();
        post.underline_position =
            scale.fword(post.underline_position, "post", "underlinePosition")?;
        post.underline_thickness =
            scale.fword(post.underline_thickness, "post", "underlineThickness")?;
        builder.add_table(&post)?;
    }

    info!("Scaled font from {source_upem} to {target_upem} units per em");
    Ok(builder.build())
}

/// Rebuild `glyf`/`loca` at the new scale, returning the new loca format.
fn scale_glyf(font: &FontRef, scale: Scale, builder: &mut FontBuilder) -> Result<Option<i16>> {
    let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) else {
        return Ok(None);
    };

    let num_glyphs = font.maxp()?.num_glyphs();
    let options = RebuildOptions::scaled(scale.0).without_instructions();
    let mut glyf_builder = GlyfLocaBuilder::new();

    for gid in 0..num_glyphs {
        let glyph = match loca.get_glyf(GlyphId::new(gid.into()), &glyf) {
            Ok(Some(glyph)) => rebuild_glyph(&glyph, options, |g| g)
                .map_err(|source| ScaleError::GlyphOverflow { gid, source })?,
            Ok(None) => Glyph::Empty,
            Err(e) => {
                warn!("glyph {gid} is unreadable, writing it empty: {e}");
                Glyph::Empty
            }
        };
        glyf_builder.add_glyph(&glyph)?;
    }

    let (glyf, loca, loca_format) = glyf_builder.build();
    builder.add_table(&glyf)?;
    builder.add_table(&loca)?;
    Ok(Some(loca_format as i16))
}

fn scale_hhea(font: &FontRef, scale: Scale) -> Result<Hhea> {
    let mut hhea: Hhea = font.hhea()?.to_owned_table();
    hhea.ascender = scale.fword(hhea.ascender, "hhea", "ascender")?;
    hhea.descender = scale.fword(hhea.descender, "hhea", "descender")?;
    hhea.line_gap = scale.fword(hhea.line_gap, "hhea", "lineGap")?;
    hhea.advance_width_max = scale.ufword(hhea.advance_width_max, "hhea", "advanceWidthMax")?;
    hhea.min_left_side_bearing =
        scale.fword(hhea.min_left_side_bearing, "hhea", "minLeftSideBearing")?;
    hhea.min_right_side_bearing =
        scale.fword(hhea.min_right_side_bearing, "hhea", "minRightSideBearing")?;
    hhea.x_max_extent = scale.fword(hhea.x_max_extent, "hhea", "xMaxExtent")?;
    hhea.caret_offset = scale.i16(hhea.caret_offset, "hhea", "caretOffset")?;
    Ok(hhea)
}

fn scale_hmtx(font: &FontRef, scale: Scale) -> Result<Hmtx> {
    let hmtx = font.hmtx()?;

    let h_metrics = hmtx
        .h_metrics()
        .iter()
        .map(|m| {
            Ok(LongMetric {
                advance: scale.u16(m.advance.get(), "hmtx", "advanceWidth")?,
                side_bearing: scale.i16(m.side_bearing.get(), "hmtx", "leftSideBearing")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let left_side_bearings = hmtx
        .left_side_bearings()
        .iter()
        .map(|lsb| scale.i16(lsb.get(), "hmtx", "leftSideBearing"))
        .collect::<Result<Vec<_>>>()?;

    Ok(Hmtx::new(h_metrics, left_side_bearings))
}

fn scale_vhea(mut vhea: Vhea, scale: Scale) -> Result<Vhea> {
    vhea.ascender = scale.fword(vhea.ascender, "vhea", "ascender")?;
    vhea.descender = scale.fword(vhea.descender, "vhea", "descender")?;
    vhea.line_gap = scale.fword(vhea.line_gap, "vhea", "lineGap")?;
    vhea.advance_height_max = scale.ufword(vhea.advance_height_max, "vhea", "advanceHeightMax")?;
    vhea.min_top_side_bearing =
        scale.fword(vhea.min_top_side_bearing, "vhea", "minTopSideBearing")?;
    vhea.min_bottom_side_bearing =
        scale.fword(vhea.min_bottom_side_bearing, "vhea", "minBottomSideBearing")?;
    vhea.y_max_extent = scale.fword(vhea.y_max_extent, "vhea", "yMaxExtent")?;
    vhea.caret_offset = scale.i16(vhea.caret_offset, "vhea", "caretOffset")?;
    Ok(vhea)
}

fn scale_vmtx(font: &FontRef, scale: Scale) -> Result<Vmtx> {
    let vmtx = font.vmtx()?;

    let v_metrics = vmtx
        .v_metrics()
        .iter()
        .map(|m| {
            Ok(VerticalMetric {
                advance: scale.u16(m.advance.get(), "vmtx", "advanceHeight")?,
                side_bearing: scale.i16(m.side_bearing.get(), "vmtx", "topSideBearing")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let top_side_bearings = vmtx
        .top_side_bearings()
        .iter()
        .map(|tsb| scale.i16(tsb.get(), "vmtx", "topSideBearing"))
        .collect::<Result<Vec<_>>>()?;

    Ok(Vmtx { v_metrics, top_side_bearings })
}

fn scale_os2(mut os2: Os2, scale: Scale) -> Result<Os2> {
    os2.x_avg_char_width = scale.i16(os2.x_avg_char_width, "OS/2", "xAvgCharWidth")?;
    os2.y_subscript_x_size = scale.i16(os2.y_subscript_x_size, "OS/2", "ySubscriptXSize")?;
    os2.y_subscript_y_size = scale.i16(os2.y_subscript_y_size, "OS/2", "ySubscriptYSize")?;
    os2.y_subscript_x_offset = scale.i16(os2.y_subscript_x_offset, "OS/2", "ySubscriptXOffset")?;
    os2.y_subscript_y_offset = scale.i16(os2.y_subscript_y_offset, "OS/2", "ySubscriptYOffset")?;
    os2.y_superscript_x_size = scale.i16(os2.y_superscript_x_size, "OS/2", "ySuperscriptXSize")?;
    os2.y_superscript_y_size = scale.i16(os2.y_superscript_y_size, "OS/2", "ySuperscriptYSize")?;
    os2.y_superscript_x_offset =
        scale.i16(os2.y_superscript_x_offset, "OS/2", "ySuperscriptXOffset")?;
    os2.y_superscript_y_offset =
        scale.i16(os2.y_superscript_y_offset, "OS/2", "ySuperscriptYOffset")?;
    os2.y_strikeout_size = scale.i16(os2.y_strikeout_size, "OS/2", "yStrikeoutSize")?;
    os2.y_strikeout_position = scale.i16(os2.y_strikeout_position, "OS/2", "yStrikeoutPosition")?;
    os2.s_typo_ascender = scale.i16(os2.s_typo_ascender, "OS/2", "sTypoAscender")?;
    os2.s_typo_descender = scale.i16(os2.s_typo_descender, "OS/2", "sTypoDescender")?;
    os2.s_typo_line_gap = scale.i16(os2.s_typo_line_gap, "OS/2", "sTypoLineGap")?;
    os2.us_win_ascent = scale.u16(os2.us_win_ascent, "OS/2", "usWinAscent")?;
    os2.us_win_descent = scale.u16(os2.us_win_descent, "OS/2", "usWinDescent")?;
    os2.sx_height = os2.sx_height.map(|v| scale.i16(v, "OS/2", "sxHeight")).transpose()?;
    os2.s_cap_height = os2.s_cap_height.map(|v| scale.i16(v, "OS/2", "sCapHeight")).transpose()?;
    Ok(os2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rounding() {
        let scale = Scale(2.048);
        assert_eq!(scale.i16(800, "t", "f").unwrap(), 1638);
        assert_eq!(scale.i16(-100, "t", "f").unwrap(), -205);
        assert_eq!(scale.u16(600, "t", "f").unwrap(), 1229);
    }

    #[test]
    fn test_scale_overflow() {
        let scale = Scale(2.048);
        assert!(matches!(
            scale.i16(20000, "head", "xMax"),
            Err(ScaleError::Overflow { table: "head", field: "xMax" })
        ));
        assert!(scale.u16(40000, "hmtx", "advanceWidth").is_err());
        assert!(Scale(0.5).u16(u16::MAX, "hmtx", "advanceWidth").is_ok());
    }
}
