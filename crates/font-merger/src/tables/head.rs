//! head and maxp merging

use font_types::Fixed;
use read_fonts::{TableProvider, tables::maxp::Maxp as ReadMaxp};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        head::{Flags, Head, MacStyle},
        maxp::Maxp,
    },
};

use crate::{
    MergeError, Result,
    context::MergeContext,
    strategies::{Bit, max, merge_bits, min},
};

use Bit::{All, Any, First};

/// head.flags: layout-affecting bits from any font, the rest from the base
const HEAD_FLAGS: [Bit; 16] = [
    Any, Any, First, Any, Any, First, First, First, First, First, First, Any, Any, Any, Any, First,
];

/// head.macStyle: bold and italic only when every font has them
const MAC_STYLE: [Bit; 16] = [
    All, All, Any, Any, Any, All, All, First, First, First, First, First, First, First, First,
    First,
];

/// Merge head tables. The loca format is set by the caller.
pub fn merge_head(ctx: &MergeContext) -> Result<Head> {
    let tables = ctx
        .fonts()
        .iter()
        .map(|f| f.head())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut head: Head = ctx.base().head()?.to_owned_table();
    head.checksum_adjustment = 0;
    let revisions = tables.iter().map(|t| t.font_revision().to_bits()).collect::<Vec<_>>();
    head.font_revision = Fixed::from_bits(max(&revisions)?);
    head.flags = Flags::from_bits_truncate(merge_bits(
        &tables.iter().map(|t| t.flags().bits()).collect::<Vec<_>>(),
        &HEAD_FLAGS,
    )?);
    head.mac_style = MacStyle::from_bits_truncate(merge_bits(
        &tables.iter().map(|t| t.mac_style().bits()).collect::<Vec<_>>(),
        &MAC_STYLE,
    )?);
    head.x_min = min(&tables.iter().map(|t| t.x_min()).collect::<Vec<_>>())?;
    head.y_min = min(&tables.iter().map(|t| t.y_min()).collect::<Vec<_>>())?;
    head.x_max = max(&tables.iter().map(|t| t.x_max()).collect::<Vec<_>>())?;
    head.y_max = max(&tables.iter().map(|t| t.y_max()).collect::<Vec<_>>())?;
    head.lowest_rec_ppem = max(&tables.iter().map(|t| t.lowest_rec_ppem()).collect::<Vec<_>>())?;
    Ok(head)
}

/// Merge maxp tables into a version 1.0 table.
///
/// Outline limits take the maximum over all fonts. Interpreter limits tied
/// to the base font's programs come from the base font.
pub fn merge_maxp(ctx: &MergeContext) -> Result<Maxp> {
    let tables = ctx
        .fonts()
        .iter()
        .map(|f| f.maxp())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let base = tables.first().ok_or(MergeError::NoFonts)?;

    Ok(Maxp {
        num_glyphs: ctx.total_glyphs(),
        max_points: largest(&tables, |t| t.max_points())?,
        max_contours: largest(&tables, |t| t.max_contours())?,
        max_composite_points: largest(&tables, |t| t.max_composite_points())?,
        max_composite_contours: largest(&tables, |t| t.max_composite_contours())?,
        max_zones: Some(base.max_zones().unwrap_or(1).max(1)),
        max_twilight_points: largest(&tables, |t| t.max_twilight_points())?,
        max_storage: Some(base.max_storage().unwrap_or(0)),
        max_function_defs: Some(base.max_function_defs().unwrap_or(0)),
        max_instruction_defs: Some(base.max_instruction_defs().unwrap_or(0)),
        max_stack_elements: largest(&tables, |t| t.max_stack_elements())?,
        max_size_of_instructions: largest(&tables, |t| t.max_size_of_instructions())?,
        max_component_elements: largest(&tables, |t| t.max_component_elements())?,
        max_component_depth: largest(&tables, |t| t.max_component_depth())?,
    })
}

fn largest(tables: &[ReadMaxp], field: fn(&ReadMaxp) -> Option<u16>) -> Result<Option<u16>> {
    max(&tables.iter().map(|t| field(t).unwrap_or(0)).collect::<Vec<_>>()).map(Some)
}
