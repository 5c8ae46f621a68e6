//! hhea/hmtx and vhea/vmtx merging
//!
//! Metrics are concatenated in merged glyph order. Header fields describing
//! extremes take the extreme over all fonts; the rest come from the base font.

use font_types::{FWord, UfWord};
use read_fonts::{TableProvider, types::BigEndian};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        vhea::Vhea,
        vmtx::{LongMetric as VerticalMetric, Vmtx},
    },
};

use crate::{
    Result,
    context::MergeContext,
    strategies::{max, min},
};

/// Advance and side bearing of every glyph of a font.
fn expand_metrics<M>(
    long: &[M],
    bearings: &[BigEndian<i16>],
    num_glyphs: u16,
    read: impl Fn(&M) -> (u16, i16),
) -> Vec<(u16, i16)> {
    let last_advance = long.last().map(|m| read(m).0).unwrap_or(0);
    (0..usize::from(num_glyphs))
        .map(|gid| match long.get(gid) {
            Some(metric) => read(metric),
            None => {
                let bearing = bearings.get(gid - long.len()).map(|b| b.get()).unwrap_or(0);
                (last_advance, bearing)
            }
        })
        .collect()
}

pub fn merge_hmtx(ctx: &MergeContext) -> Result<Hmtx> {
    let mut h_metrics = Vec::with_capacity(ctx.mega().len());

    for font in ctx.fonts() {
        let hmtx = font.hmtx()?;
        let num_glyphs = font.maxp()?.num_glyphs();
        let metrics = expand_metrics(
            hmtx.h_metrics(),
            hmtx.left_side_bearings(),
            num_glyphs,
            |m| (m.advance.get(), m.side_bearing.get()),
        );
        h_metrics.extend(
            metrics
                .into_iter()
                .map(|(advance, side_bearing)| LongMetric { advance, side_bearing }),
        );
    }

    Ok(Hmtx { h_metrics, left_side_bearings: Vec::new() })
}

pub fn merge_hhea(ctx: &MergeContext, num_h_metrics: u16) -> Result<Hhea> {
    let tables = ctx
        .fonts()
        .iter()
        .map(|f| f.hhea())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut hhea: Hhea = ctx.base().hhea()?.to_owned_table();
    hhea.ascender = FWord::new(max(&collect(&tables, |t| t.ascender().to_i16()))?);
    hhea.descender = FWord::new(min(&collect(&tables, |t| t.descender().to_i16()))?);
    hhea.line_gap = FWord::new(max(&collect(&tables, |t| t.line_gap().to_i16()))?);
    hhea.advance_width_max =
        UfWord::new(max(&collect(&tables, |t| t.advance_width_max().to_u16()))?);
    hhea.min_left_side_bearing =
        FWord::new(min(&collect(&tables, |t| t.min_left_side_bearing().to_i16()))?);
    hhea.min_right_side_bearing =
        FWord::new(min(&collect(&tables, |t| t.min_right_side_bearing().to_i16()))?);
    hhea.x_max_extent = FWord::new(max(&collect(&tables, |t| t.x_max_extent().to_i16()))?);
    hhea.number_of_h_metrics = num_h_metrics;
    Ok(hhea)
}

/// True when every font carries vertical metrics.
pub fn all_vertical(ctx: &MergeContext) -> bool {
    ctx.fonts().iter().all(|f| f.vhea().is_ok() && f.vmtx().is_ok())
}

pub fn merge_vmtx(ctx: &MergeContext) -> Result<Vmtx> {
    let mut v_metrics = Vec::with_capacity(ctx.mega().len());

    for font in ctx.fonts() {
        let vmtx = font.vmtx()?;
        let num_glyphs = font.maxp()?.num_glyphs();
        let metrics = expand_metrics(
            vmtx.v_metrics(),
            vmtx.top_side_bearings(),
            num_glyphs,
            |m| (m.advance.get(), m.side_bearing.get()),
        );
        v_metrics.extend(
            metrics
                .into_iter()
                .map(|(advance, side_bearing)| VerticalMetric { advance, side_bearing }),
        );
    }

    Ok(Vmtx { v_metrics, top_side_bearings: Vec::new() })
}

pub fn merge_vhea(ctx: &MergeContext, num_v_metrics: u16) -> Result<Vhea> {
    let tables = ctx
        .fonts()
        .iter()
        .map(|f| f.vhea())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut vhea: Vhea = ctx.base().vhea()?.to_owned_table();
    vhea.ascender = FWord::new(max(&collect(&tables, |t| t.ascender().to_i16()))?);
    vhea.descender = FWord::new(min(&collect(&tables, |t| t.descender().to_i16()))?);
    vhea.line_gap = FWord::new(max(&collect(&tables, |t| t.line_gap().to_i16()))?);
    vhea.advance_height_max =
        UfWord::new(max(&collect(&tables, |t| t.advance_height_max().to_u16()))?);
    vhea.min_top_side_bearing =
        FWord::new(min(&collect(&tables, |t| t.min_top_side_bearing().to_i16()))?);
    vhea.min_bottom_side_bearing =
        FWord::new(min(&collect(&tables, |t| t.min_bottom_side_bearing().to_i16()))?);
    vhea.y_max_extent = FWord::new(max(&collect(&tables, |t| t.y_max_extent().to_i16()))?);
    vhea.number_of_long_ver_metrics = num_v_metrics;
    Ok(vhea)
}

fn collect<T, V>(tables: &[T], field: impl Fn(&T) -> V) -> Vec<V> {
    tables.iter().map(field).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_metrics_short_table() {
        let long = [(500u16, 10i16), (600, 20)];
        let bearings = [BigEndian::from(30i16), BigEndian::from(40i16)];
        let metrics = expand_metrics(&long, &bearings, 4, |m| *m);
        assert_eq!(metrics, vec![(500, 10), (600, 20), (600, 30), (600, 40)]);
    }

    #[test]
    fn test_expand_metrics_missing_bearings() {
        let long = [(500u16, 10i16)];
        let metrics = expand_metrics(&long, &[], 2, |m| *m);
        assert_eq!(metrics, vec![(500, 10), (500, 0)]);
    }
}
