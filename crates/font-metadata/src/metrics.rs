//! Ascent and descent.

use anyhow::{Result, bail};
use log::info;
use read_fonts::TableProvider;
use robotonoto_font_ops::rewrite_font;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{hhea::Hhea, os2::Os2},
    types::FWord,
};

/// Vertical metrics of the merged font.
///
/// The em box (`em_ascent + em_descent`) must equal `unitsPerEm`. The line
/// metrics are larger so that accents and descenders are not clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub em_ascent: u16,
    pub em_descent: u16,
    pub line_ascent: u16,
    pub line_descent: u16,
}

impl VerticalMetrics {
    pub fn units_per_em(&self) -> u16 {
        self.em_ascent + self.em_descent
    }

    /// Write the metrics into OS/2 and hhea.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let metrics = *self;

        rewrite_font(data, |font, builder| {
            let upem = font.head()?.units_per_em();
            if upem != metrics.units_per_em() {
                bail!(
                    "unitsPerEm is {upem}, but the em ascent and descent add up to {}",
                    metrics.units_per_em()
                );
            }

            let mut hhea: Hhea = font.hhea()?.to_owned_table();
            hhea.ascender = FWord::new(metrics.line_ascent as i16);
            hhea.descender = FWord::new(-(metrics.line_descent as i16));
            hhea.line_gap = FWord::new(0);
            builder.add_table(&hhea)?;

            if let Ok(os2) = font.os2() {
                let mut os2: Os2 = os2.to_owned_table();
                os2.s_typo_ascender = metrics.em_ascent as i16;
                os2.s_typo_descender = -(metrics.em_descent as i16);
                os2.s_typo_line_gap = 0;
                os2.us_win_ascent = metrics.line_ascent;
                os2.us_win_descent = metrics.line_descent;
                builder.add_table(&os2)?;
            }

            Ok(())
        })
        .inspect(|_| {
            info!(
                "Vertical metrics: em {}/{}, line {}/{}",
                metrics.em_ascent, metrics.em_descent, metrics.line_ascent, metrics.line_descent
            )
        })
    }
}
