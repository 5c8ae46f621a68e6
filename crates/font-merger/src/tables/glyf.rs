//! glyf table merging
//!
//! Glyphs of the base font keep their instructions; every later font's
//! glyphs lose them, because `fpgm`, `prep` and `cvt ` come from the base font
//! only and foreign instructions would call into the wrong programs.

use std::collections::HashSet;

use log::{debug, warn};
use read_fonts::{
    TableProvider,
    types::{GlyphId as ReadGlyphId, GlyphId16},
};
use robotonoto_font_ops::{RebuildOptions, rebuild_glyph};
use write_fonts::tables::{
    glyf::{Glyf, GlyfLocaBuilder, Glyph},
    loca::{Loca, LocaFormat},
};

use crate::{MergeError, Result, context::MergeContext, types::GlyphId};

/// Merge glyf tables, returning glyf, loca and the loca format.
pub fn merge_glyf(ctx: &MergeContext) -> Result<(Glyf, Loca, LocaFormat)> {
    let mut glyphs: Vec<Glyph> = Vec::with_capacity(ctx.mega().len());

    for (font_idx, font) in ctx.fonts().iter().enumerate() {
        let glyf = font.glyf().map_err(|_| MergeError::MissingTable("glyf"))?;
        let loca = font.loca(None).map_err(|_| MergeError::MissingTable("loca"))?;
        let options = if font_idx == 0 {
            RebuildOptions::IDENTITY
        } else {
            RebuildOptions::IDENTITY.without_instructions()
        };
        let remap = |gid: GlyphId16| {
            ctx.remap(font_idx, GlyphId::new(gid.to_u16()))
                .map(|mega| GlyphId16::new(mega.to_u16()))
                .unwrap_or(GlyphId16::new(0))
        };

        for (gid, name) in ctx.font_glyphs(font_idx) {
            let glyph = match loca.get_glyf(ReadGlyphId::new(gid.to_u32()), &glyf) {
                Ok(Some(glyph)) => rebuild_glyph(&glyph, options, remap).map_err(|source| {
                    MergeError::GlyphOverflow { font: font_idx, glyph: name.to_string(), source }
                })?,
                Ok(None) => Glyph::Empty,
                Err(e) => {
                    warn!("{name} of font {font_idx} is unreadable, writing it empty: {e}");
                    Glyph::Empty
                }
            };
            glyphs.push(glyph);
        }
    }

    let emptied = empty_broken_composites(&mut glyphs);
    if emptied > 0 {
        debug!("Emptied {emptied} composites referencing empty glyphs");
    }

    let mut builder = GlyfLocaBuilder::new();
    for glyph in &glyphs {
        builder.add_glyph(glyph)?;
    }
    Ok(builder.build())
}

/// Replace composites that reference empty glyphs with empty glyphs.
///
/// Sanitizers such as OTS reject such composites. Repeats until nested
/// composites settle; returns the number of glyphs emptied.
fn empty_broken_composites(glyphs: &mut [Glyph]) -> usize {
    let mut emptied = 0;
    loop {
        let empty: HashSet<u16> = glyphs
            .iter()
            .enumerate()
            .filter_map(|(gid, g)| matches!(g, Glyph::Empty).then_some(gid as u16))
            .collect();

        let mut changed = false;
        for glyph in glyphs.iter_mut() {
            if let Glyph::Composite(composite) = glyph
                && composite
                    .components()
                    .iter()
                    .any(|c| empty.contains(&c.glyph.to_u16()))
            {
                *glyph = Glyph::Empty;
                changed = true;
                emptied += 1;
            }
        }

        if !changed {
            return emptied;
        }
    }
}

#[cfg(test)]
mod tests {
    use write_fonts::tables::glyf::{
        Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, SimpleGlyph, Transform,
    };

    use super::*;

    fn component(gid: u16) -> Component {
        Component {
            glyph: GlyphId16::new(gid),
            anchor: Anchor::Offset { x: 0, y: 0 },
            flags: ComponentFlags::default(),
            transform: Transform::default(),
        }
    }

    fn composite(gid: u16) -> Glyph {
        Glyph::Composite(CompositeGlyph::new(component(gid), Bbox::default()))
    }

    #[test]
    fn test_nested_broken_composites() {
        let mut glyphs = vec![
            Glyph::Empty,
            Glyph::Simple(SimpleGlyph::default()),
            composite(1),
            composite(0),
            composite(3),
        ];
        assert_eq!(empty_broken_composites(&mut glyphs), 2);
        assert!(matches!(glyphs[2], Glyph::Composite(_)));
        assert!(matches!(glyphs[3], Glyph::Empty));
        assert!(matches!(glyphs[4], Glyph::Empty));
    }
}
