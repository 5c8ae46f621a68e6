//! OS/2 merging

use read_fonts::{TableProvider, tables::os2::Os2 as ReadOs2};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::os2::{Os2, SelectionFlags},
};

use crate::{
    Result,
    context::MergeContext,
    strategies::{Bit, max, merge_bits, min},
};

use Bit::{All, Any, First};

/// fsSelection: style bits need every font, decoration bits need any
const FS_SELECTION: [Bit; 16] = [
    All, Any, Any, Any, Any, All, All, All, All, All, First, First, First, First, First, First,
];

/// Merge OS/2 tables, or `None` when a font has none.
///
/// Descriptive fields come from the base font. Coverage ranges are ORed and
/// the merged table has the highest version found.
pub fn merge_os2(ctx: &MergeContext) -> Result<Option<Os2>> {
    let tables: Vec<ReadOs2> = ctx.fonts().iter().filter_map(|f| f.os2().ok()).collect();
    if tables.len() != ctx.fonts().len() {
        return Ok(None);
    }
    let Some(base) = tables.first() else {
        return Ok(None);
    };

    let version = tables.iter().map(|t| t.version()).max().unwrap_or(0);
    let mut os2: Os2 = base.to_owned_table();

    let or_all = |field: fn(&ReadOs2) -> u32| tables.iter().map(field).fold(0, |a, b| a | b);
    os2.ul_unicode_range_1 = or_all(|t| t.ul_unicode_range_1());
    os2.ul_unicode_range_2 = or_all(|t| t.ul_unicode_range_2());
    os2.ul_unicode_range_3 = or_all(|t| t.ul_unicode_range_3());
    os2.ul_unicode_range_4 = or_all(|t| t.ul_unicode_range_4());

    os2.fs_selection = SelectionFlags::from_bits_truncate(merge_bits(
        &tables.iter().map(|t| t.fs_selection().bits()).collect::<Vec<_>>(),
        &FS_SELECTION,
    )?);

    os2.us_first_char_index =
        min(&tables.iter().map(|t| t.us_first_char_index()).collect::<Vec<_>>())?;
    os2.us_last_char_index =
        max(&tables.iter().map(|t| t.us_last_char_index()).collect::<Vec<_>>())?;
    os2.s_typo_ascender = max(&tables.iter().map(|t| t.s_typo_ascender()).collect::<Vec<_>>())?;
    os2.s_typo_descender = min(&tables.iter().map(|t| t.s_typo_descender()).collect::<Vec<_>>())?;
    os2.s_typo_line_gap = max(&tables.iter().map(|t| t.s_typo_line_gap()).collect::<Vec<_>>())?;
    os2.us_win_ascent = max(&tables.iter().map(|t| t.us_win_ascent()).collect::<Vec<_>>())?;
    os2.us_win_descent = max(&tables.iter().map(|t| t.us_win_descent()).collect::<Vec<_>>())?;

    if version >= 1 {
        let or_some = |field: fn(&ReadOs2) -> Option<u32>| {
            Some(tables.iter().filter_map(field).fold(0, |a, b| a | b))
        };
        os2.ul_code_page_range_1 = or_some(|t| t.ul_code_page_range_1());
        os2.ul_code_page_range_2 = or_some(|t| t.ul_code_page_range_2());
    }

    if version >= 2 {
        let largest = |field: fn(&ReadOs2) -> Option<i16>| tables.iter().filter_map(field).max();
        os2.sx_height = Some(largest(|t| t.sx_height()).unwrap_or(0));
        os2.s_cap_height = Some(largest(|t| t.s_cap_height()).unwrap_or(0));
        os2.us_default_char = Some(base.us_default_char().unwrap_or(0));
        os2.us_break_char = Some(base.us_break_char().unwrap_or(0x20));
        os2.us_max_context = Some(
            tables
                .iter()
                .filter_map(|t| t.us_max_context())
                .max()
                .unwrap_or(0),
        );
    }

    if version >= 5 {
        os2.us_lower_optical_point_size = Some(base.us_lower_optical_point_size().unwrap_or(0));
        os2.us_upper_optical_point_size =
            Some(base.us_upper_optical_point_size().unwrap_or(0xFFFF));
    }

    Ok(Some(os2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_selection_bits() {
        const ITALIC: u16 = 1 << 0;
        const UNDERSCORE: u16 = 1 << 1;
        const USE_TYPO_METRICS: u16 = 1 << 7;

        let merged = merge_bits(&[ITALIC | USE_TYPO_METRICS, UNDERSCORE], &FS_SELECTION).unwrap();
        assert_eq!(merged, UNDERSCORE);

        let merged =
            merge_bits(&[USE_TYPO_METRICS, USE_TYPO_METRICS | ITALIC], &FS_SELECTION).unwrap();
        assert_eq!(merged, USE_TYPO_METRICS);
    }
}
