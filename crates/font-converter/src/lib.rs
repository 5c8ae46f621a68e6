//! Flatten CFF outlines into TrueType `glyf` outlines.
//!
//! Name-keyed and CID-keyed CFF fonts are both supported; skrifa resolves
//! the private dicts and font matrices while drawing, so the result only
//! depends on the rendered outlines.

mod error;
mod pen;

use log::{debug, info};
use read_fonts::{FontRef, TableProvider, types::Tag};
use skrifa::{
    GlyphId, MetadataProvider,
    outline::DrawSettings,
    prelude::{LocationRef, Size},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{Bbox, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
        maxp::Maxp,
    },
};

use robotonoto_font_ops::{builder_without, contours_bbox};

pub use error::{ConvertError, Result};
pub use pen::QuadraticPen;

/// Maximum distance in font units between a cubic curve and its quadratic
/// approximation.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

const CFF: Tag = Tag::new(b"CFF ");
const VORG: Tag = Tag::new(b"VORG");

/// Returns true if the font carries CFF outlines.
pub fn is_cff(data: &[u8]) -> bool {
    FontRef::new(data).is_ok_and(|font| font.table_data(CFF).is_some())
}

/// Convert a CFF-flavored OpenType font to TrueType outlines with the
/// default tolerance.
pub fn convert_cff_to_glyf(data: &[u8]) -> Result<Vec<u8>> {
    convert_with_tolerance(data, DEFAULT_TOLERANCE)
}

/// Convert a CFF-flavored OpenType font to TrueType outlines.
pub fn convert_with_tolerance(data: &[u8], tolerance: f64) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    if font.table_data(CFF).is_none() {
        return Err(ConvertError::NotCff);
    }

    let num_glyphs = font.maxp()?.num_glyphs();
    let outlines = font.outline_glyphs();

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut limits = OutlineLimits::default();

    for gid in 0..u32::from(num_glyphs) {
        let mut pen = QuadraticPen::new(tolerance);
        if let Some(outline) = outlines.get(GlyphId::new(gid)) {
            outline
                .draw(
                    DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
                    &mut pen,
                )
                .map_err(|e| ConvertError::Draw { gid, message: e.to_string() })?;
        } else {
            debug!("glyph {gid} has no outline");
        }

        let glyph = glyph_from_pen(pen);
        limits.update(&glyph);
        glyf_builder.add_glyph(&glyph)?;
    }

    let (glyf, loca, loca_format) = glyf_builder.build();

    let mut head: Head = font.head()?.to_owned_table();
    head.index_to_loc_format = loca_format as i16;
    let bounds = limits.bounds.unwrap_or_default();
    head.x_min = bounds.x_min;
    head.y_min = bounds.y_min;
    head.x_max = bounds.x_max;
    head.y_max = bounds.y_max;

    let maxp = Maxp {
        num_glyphs,
        max_points: Some(limits.points),
        max_contours: Some(limits.contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let mut builder = builder_without(
        &font,
        &[CFF, VORG, Tag::new(b"glyf"), Tag::new(b"loca"), Tag::new(b"head"), Tag::new(b"maxp")],
    );
    builder.add_table(&glyf)?;
    builder.add_table(&loca)?;
    builder.add_table(&head)?;
    builder.add_table(&maxp)?;

    info!(
        "Converted {num_glyphs} CFF glyphs to TrueType (max {} points, {} contours)",
        limits.points, limits.contours
    );
    Ok(builder.build())
}

/// Turn the contours collected by a pen into a glyph.
pub fn glyph_from_pen(pen: QuadraticPen) -> Glyph {
    let contours = pen.into_contours();
    if contours.is_empty() {
        return Glyph::Empty;
    }
    let bbox = contours_bbox(&contours);
    Glyph::Simple(SimpleGlyph { bbox, contours, instructions: vec![] })
}

#[derive(Debug, Default)]
struct OutlineLimits {
    points: u16,
    contours: u16,
    /// Union of all glyph bounding boxes, for `head`
    bounds: Option<Bbox>,
}

impl OutlineLimits {
    fn update(&mut self, glyph: &Glyph) {
        if let Glyph::Simple(simple) = glyph {
            let points: usize = simple.contours.iter().map(|c| c.len()).sum();
            self.points = self.points.max(points.min(u16::MAX as usize) as u16);
            self.contours = self.contours.max(simple.contours.len().min(u16::MAX as usize) as u16);
            self.bounds = Some(match self.bounds {
                Some(bounds) => bounds.union(simple.bbox),
                None => simple.bbox,
            });
        }
    }
}
