//! Conversion of parsed `glyf` glyphs into writable glyphs.
//!
//! Every operation that rebuilds a `glyf` table (merging, em scaling, hint
//! removal) goes through [`rebuild_glyph`], which copies outlines and
//! components while optionally scaling coordinates, remapping component glyph
//! ids and dropping per-glyph instructions.

use read_fonts::{
    tables::glyf::{
        Anchor as ReadAnchor, CompositeGlyph as ReadCompositeGlyph, CurvePoint,
        Glyph as ReadGlyph, SimpleGlyph as ReadSimpleGlyph,
    },
    types::GlyphId16,
};
use thiserror::Error;
use write_fonts::tables::glyf::{
    Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, Glyph, SimpleGlyph,
    Transform,
};

/// A scaled glyph value that no longer fits in 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("scaled value {value} is outside the 16-bit coordinate range")]
pub struct CoordinateOverflow {
    pub value: f64,
}

/// How a glyph is rewritten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebuildOptions {
    /// Uniform scale applied to coordinates, bounding boxes and offsets.
    pub scale: f64,
    /// Keep per-glyph hinting instructions.
    pub keep_instructions: bool,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RebuildOptions {
    /// Copy the glyph as is.
    pub const IDENTITY: Self = Self { scale: 1.0, keep_instructions: true };

    pub fn scaled(scale: f64) -> Self {
        Self { scale, ..Self::IDENTITY }
    }

    pub fn without_instructions(mut self) -> Self {
        self.keep_instructions = false;
        self
    }

    fn is_unscaled(&self) -> bool {
        self.scale == 1.0
    }
}

/// Scale a font-unit value, rounding half away from zero.
pub fn scale_coord(value: i16, scale: f64) -> Result<i16, CoordinateOverflow> {
    let scaled = (f64::from(value) * scale).round();
    if scaled < f64::from(i16::MIN) || scaled > f64::from(i16::MAX) {
        return Err(CoordinateOverflow { value: scaled });
    }
    Ok(scaled as i16)
}

/// Rebuild a glyph for writing.
///
/// `remap` maps component glyph ids from the source font to the target font.
/// Fails when a scaled coordinate, bounding box or offset leaves the `i16`
/// range.
pub fn rebuild_glyph(
    glyph: &ReadGlyph,
    options: RebuildOptions,
    remap: impl Fn(GlyphId16) -> GlyphId16,
) -> Result<Glyph, CoordinateOverflow> {
    match glyph {
        ReadGlyph::Simple(simple) => rebuild_simple(simple, options),
        ReadGlyph::Composite(composite) => rebuild_composite(composite, options, remap),
    }
}

fn rebuild_simple(
    simple: &ReadSimpleGlyph,
    options: RebuildOptions,
) -> Result<Glyph, CoordinateOverflow> {
    let mut contours: Vec<Contour> = Vec::new();
    let mut points = simple.points();
    let mut current_point = 0usize;

    for end_pt in simple.end_pts_of_contours() {
        let end = end_pt.get() as usize;
        let mut contour_points = Vec::new();

        while current_point <= end {
            if let Some(pt) = points.next() {
                contour_points.push(CurvePoint::new(
                    scale_coord(pt.x, options.scale)?,
                    scale_coord(pt.y, options.scale)?,
                    pt.on_curve,
                ));
            }
            current_point += 1;
        }

        contours.push(contour_points.into());
    }

    if contours.is_empty() {
        return Ok(Glyph::Empty);
    }

    let bbox = if options.is_unscaled() {
        Bbox {
            x_min: simple.x_min(),
            y_min: simple.y_min(),
            x_max: simple.x_max(),
            y_max: simple.y_max(),
        }
    } else {
        contours_bbox(&contours)
    };

    let instructions = if options.keep_instructions {
        simple.instructions().to_vec()
    } else {
        vec![]
    };

    Ok(Glyph::Simple(SimpleGlyph { bbox, contours, instructions }))
}

/// Bounding box of a set of contours, zero when they have no points.
pub fn contours_bbox(contours: &[Contour]) -> Bbox {
    let mut points = contours.iter().flat_map(|c| c.iter());
    let Some(first) = points.next() else {
        return Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 };
    };

    points.fold(
        Bbox { x_min: first.x, y_min: first.y, x_max: first.x, y_max: first.y },
        |bbox, pt| Bbox {
            x_min: bbox.x_min.min(pt.x),
            y_min: bbox.y_min.min(pt.y),
            x_max: bbox.x_max.max(pt.x),
            y_max: bbox.y_max.max(pt.y),
        },
    )
}

fn rebuild_composite(
    composite: &ReadCompositeGlyph,
    options: RebuildOptions,
    remap: impl Fn(GlyphId16) -> GlyphId16,
) -> Result<Glyph, CoordinateOverflow> {
    let mut components = composite
        .components()
        .map(|comp| -> Result<Component, CoordinateOverflow> {
            let anchor = match comp.anchor {
                ReadAnchor::Offset { x, y } => Anchor::Offset {
                    x: scale_coord(x, options.scale)?,
                    y: scale_coord(y, options.scale)?,
                },
                ReadAnchor::Point { base, component } => Anchor::Point { base, component },
            };

            let transform = Transform {
                xx: comp.transform.xx,
                yx: comp.transform.yx,
                xy: comp.transform.xy,
                yy: comp.transform.yy,
            };

            let flags: ComponentFlags = comp.flags.into();

            Ok(Component { glyph: remap(comp.glyph), anchor, flags, transform })
        })
        .collect::<Result<Vec<_>, CoordinateOverflow>>()?;

    if components.is_empty() {
        return Ok(Glyph::Empty);
    }

    let bbox = Bbox {
        x_min: scale_coord(composite.x_min(), options.scale)?,
        y_min: scale_coord(composite.y_min(), options.scale)?,
        x_max: scale_coord(composite.x_max(), options.scale)?,
        y_max: scale_coord(composite.y_max(), options.scale)?,
    };

    let first = components.remove(0);
    let mut rebuilt = CompositeGlyph::new(first, bbox);
    for comp in components {
        rebuilt.add_component(comp, bbox);
    }

    Ok(Glyph::Composite(rebuilt))
}

#[cfg(test)]
mod tests {
    use read_fonts::{FontRef, TableProvider, types::GlyphId};

    use super::*;
    use crate::testing::TestFont;

    fn scaled_glyph(data: &[u8], gid: u32) -> Glyph {
        let font = FontRef::new(data).unwrap();
        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();
        let glyph = loca.get_glyf(GlyphId::new(gid), &glyf).unwrap().unwrap();
        rebuild_glyph(&glyph, RebuildOptions::scaled(2.0), |g| g).unwrap()
    }

    #[test]
    fn test_scale_coord_rounding() {
        assert_eq!(scale_coord(100, 2.048), Ok(205));
        assert_eq!(scale_coord(-100, 2.048), Ok(-205));
        assert_eq!(scale_coord(1, 0.5), Ok(1));
        assert_eq!(scale_coord(-1, 0.5), Ok(-1));
        assert_eq!(scale_coord(15_999, 2.048), Ok(32_766));
    }

    #[test]
    fn test_scale_coord_overflow() {
        assert_eq!(scale_coord(i16::MAX, 2.0), Err(CoordinateOverflow { value: 65_534.0 }));
        assert_eq!(scale_coord(i16::MIN, 2.048), Err(CoordinateOverflow { value: -67_109.0 }));
        assert_eq!(scale_coord(i16::MIN, 1.0), Ok(i16::MIN));
    }

    #[test]
    fn test_scaled_glyph_overflow() {
        let data = TestFont::new(1000)
            .glyph(crate::testing::TestGlyph {
                contours: vec![vec![(0, 0, true), (0, 20_000, true), (500, 20_000, true)]],
                ..crate::testing::TestGlyph::square("tall", Some('T'), 600)
            })
            .build();
        let font = FontRef::new(&data).unwrap();
        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();
        let glyph = loca.get_glyf(GlyphId::new(1), &glyf).unwrap().unwrap();

        let result = rebuild_glyph(&glyph, RebuildOptions::scaled(2.048), |g| g);
        assert_eq!(result.unwrap_err(), CoordinateOverflow { value: 40_960.0 });
        assert!(rebuild_glyph(&glyph, RebuildOptions::IDENTITY, |g| g).is_ok());
    }

    #[test]
    fn test_scaled_simple_glyph() {
        let data = TestFont::new(1000).square("A", 'A', 600).build();
        let Glyph::Simple(simple) = scaled_glyph(&data, 1) else {
            panic!("expected simple glyph");
        };
        assert_eq!(simple.bbox.x_min, 100);
        assert_eq!(simple.bbox.x_max, 1100);
        assert_eq!(simple.bbox.y_max, 1400);
    }

    #[test]
    fn test_strip_instructions() {
        let data = TestFont::new(1000)
            .glyph(
                crate::testing::TestGlyph::square("A", Some('A'), 600)
                    .with_instructions(vec![0xb0, 0x01]),
            )
            .build();
        let font = FontRef::new(&data).unwrap();
        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();
        let glyph = loca.get_glyf(GlyphId::new(1), &glyf).unwrap().unwrap();

        let Glyph::Simple(kept) = rebuild_glyph(&glyph, RebuildOptions::IDENTITY, |g| g).unwrap()
        else {
            panic!("expected simple glyph");
        };
        assert_eq!(kept.instructions, vec![0xb0, 0x01]);

        let stripped =
            rebuild_glyph(&glyph, RebuildOptions::IDENTITY.without_instructions(), |g| g).unwrap();
        let Glyph::Simple(stripped) = stripped else {
            panic!("expected simple glyph");
        };
        assert!(stripped.instructions.is_empty());
    }

    #[test]
    fn test_composite_remap_and_scale() {
        let data = TestFont::new(1000)
            .square("A", 'A', 600)
            .composite("Aacute", Some('Á'), 600, &[("A", 10, 20)])
            .build();
        let font = FontRef::new(&data).unwrap();
        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();
        let glyph = loca.get_glyf(GlyphId::new(2), &glyf).unwrap().unwrap();

        let rebuilt = rebuild_glyph(&glyph, RebuildOptions::scaled(2.0), |g| {
            GlyphId16::new(g.to_u16() + 5)
        })
        .unwrap();
        let Glyph::Composite(composite) = rebuilt else {
            panic!("expected composite glyph");
        };
        let component = &composite.components()[0];
        assert_eq!(component.glyph, GlyphId16::new(6));
        assert!(matches!(component.anchor, Anchor::Offset { x: 20, y: 40 }));
    }
}
