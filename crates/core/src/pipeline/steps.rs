//! Pipeline step definitions.

use std::fs::{copy, create_dir_all};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use read_fonts::{FontRef, TableProvider};
use robotonoto_font_converter::{convert_cff_to_glyf, is_cff};
use robotonoto_font_merger::Merger;
use robotonoto_font_scaler::scale_to_upem;
use robotonoto_font_subsetter::strip_codepoints;

use super::PipelineContext;
use crate::{
    config::BuildSettings,
    io::{read_font, transform_font, transform_font_in_place, write_font},
};

pub type PipelineStep = (&'static str, fn(&PipelineContext) -> Result<()>);

/// Steps run for each weight, in order.
pub fn steps(settings: &BuildSettings) -> Vec<PipelineStep> {
    let mut steps: Vec<PipelineStep> = vec![
        ("prepare-dirs", step_prepare_dirs),
        ("convert-cjk", step_convert_cjk),
        ("strip-duplicates", step_strip_duplicates),
        ("normalize-em", step_normalize_em),
        ("merge", step_merge),
        ("set-metadata", step_set_metadata),
        ("generate", step_generate),
        ("dehint", step_dehint),
    ];
    if !settings.strip_duplicates {
        steps.retain(|(name, _)| *name != "strip-duplicates");
    }
    steps
}

fn step_prepare_dirs(ctx: &PipelineContext) -> Result<()> {
    for dir in [&ctx.settings.build_dir, &ctx.settings.dist_dir] {
        create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

/// Put a TrueType-flavored Japanese font into the build directory.
///
/// A `.ttf` source is used as is unless it carries CFF outlines; otherwise
/// the `.otf` source is flattened to quadratic outlines.
fn step_convert_cjk(ctx: &PipelineContext) -> Result<()> {
    let ttf = ctx.cjk_ttf_source();
    let otf = ctx.cjk_otf_source();
    let output = ctx.cjk_converted();

    let source = if ttf.exists() {
        ttf
    } else if otf.exists() {
        otf
    } else {
        bail!(
            "Japanese source font not found: {} (or {})",
            ttf.display(),
            otf.display()
        );
    };

    let data = read_font(&source)?;
    if is_cff(&data) {
        println!("  Converting {} to TrueType outlines...", source.display());
        let converted = convert_cff_to_glyf(&data)
            .with_context(|| format!("Failed to convert {}", source.display()))?;
        write_font(&output, converted)
    } else {
        println!("  Using {}", source.display());
        copy(&source, &output)
            .with_context(|| format!("Failed to copy {}", source.display()))?;
        Ok(())
    }
}

fn step_strip_duplicates(ctx: &PipelineContext) -> Result<()> {
    let latin = read_font(ctx.latin_source())?;
    transform_font(ctx.cjk_converted(), ctx.cjk_stripped(), |data| {
        strip_codepoints(data, &latin)
    })
}

fn step_normalize_em(ctx: &PipelineContext) -> Result<()> {
    let upem = ctx.settings.units_per_em();
    println!("  Scaling both fonts to {upem} units per em...");

    for (input, output) in [
        (ctx.latin_source(), ctx.latin_scaled()),
        (ctx.cjk_prepared(), ctx.cjk_scaled()),
    ] {
        transform_font(&input, &output, |data| {
            scale_to_upem(data, upem)
                .with_context(|| format!("Failed to scale {}", input.display()))
        })?;
    }
    Ok(())
}

fn step_merge(ctx: &PipelineContext) -> Result<()> {
    let latin = read_font(ctx.latin_scaled())?;
    let cjk = read_font(ctx.cjk_scaled())?;

    let merged = Merger::default()
        .merge(&[&latin, &cjk])
        .context("Failed to merge fonts")?;
    write_font(ctx.merged(), merged)
}

fn step_set_metadata(ctx: &PipelineContext) -> Result<()> {
    let metadata = ctx.settings.metadata(&ctx.weight, ctx.timestamp)?;
    transform_font_in_place(ctx.merged(), |data| metadata.apply(data))
}

/// Write the intermediate font after checking that it parses.
fn step_generate(ctx: &PipelineContext) -> Result<()> {
    let data = read_font(ctx.merged())?;
    let font = FontRef::new(&data).context("Merged font does not parse")?;

    let num_glyphs = font.maxp()?.num_glyphs();
    let upem = font.head()?.units_per_em();
    if upem != ctx.settings.units_per_em() {
        warn!("{}: unitsPerEm is {upem}", ctx.font_name());
    }
    info!("{}: {num_glyphs} glyphs, {} bytes", ctx.font_name(), data.len());

    write_font(ctx.generated(), &data)
}

fn step_dehint(ctx: &PipelineContext) -> Result<()> {
    let output = ctx.output();
    ctx.settings.dehinter.run(&ctx.generated(), &output)?;
    println!("  Wrote {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        let names: Vec<&str> = steps(&BuildSettings::default()).iter().map(|s| s.0).collect();
        assert_eq!(
            names,
            vec![
                "prepare-dirs",
                "convert-cjk",
                "strip-duplicates",
                "normalize-em",
                "merge",
                "set-metadata",
                "generate",
                "dehint",
            ]
        );
    }

    #[test]
    fn test_strip_duplicates_skipped() {
        let settings = BuildSettings { strip_duplicates: false, ..BuildSettings::default() };
        let names: Vec<&str> = steps(&settings).iter().map(|s| s.0).collect();
        assert!(!names.contains(&"strip-duplicates"));
        assert_eq!(names.len(), 7);
    }
}
