//! Generic font table manipulation utilities.

pub mod cmap;
pub mod glyph;
mod hinting;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::collections::HashSet;

use anyhow::{Context, Result};
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::FontBuilder;

pub use glyph::{CoordinateOverflow, RebuildOptions, contours_bbox, rebuild_glyph};
pub use hinting::{HINTING_TABLES, reset_hinting_limits, strip_hinting};

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// The function receives a reference to the source font and a mutable builder
/// that already contains all original tables.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Copy every table except `skip` into a fresh builder.
///
/// Used by operations that rebuild a handful of tables and pass the rest
/// through untouched.
pub fn builder_without<'a>(font: &FontRef<'a>, skip: &[Tag]) -> FontBuilder<'a> {
    let skip: HashSet<Tag> = skip.iter().copied().collect();
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if skip.contains(&tag) {
            continue;
        }
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    builder
}
