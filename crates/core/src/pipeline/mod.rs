//! Build pipeline for RobotoNotoJP.
//!
//! Each weight runs the same ordered list of steps. A step reads the files
//! written by the steps before it, so a failed build leaves every
//! intermediate file in the build directory for inspection.

mod clean;
mod steps;

pub use clean::clean;
pub use steps::{PipelineStep, steps};

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use rayon::prelude::*;
use robotonoto_font_metadata::BuildTimestamp;

use crate::{
    config::{BuildSettings, SOURCE_FONT_EN, SOURCE_FONT_JP, SOURCE_FONT_JP_OTF, source_name},
    io::{check_results, glob_fonts},
};

/// Settings and file locations of one weight.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub settings: BuildSettings,
    pub weight: String,
    pub timestamp: BuildTimestamp,
}

impl PipelineContext {
    pub fn new(
        settings: BuildSettings,
        weight: impl Into<String>,
        timestamp: BuildTimestamp,
    ) -> Self {
        Self { settings, weight: weight.into(), timestamp }
    }

    fn build_file(&self, name: String) -> PathBuf {
        self.settings.build_dir.join(name)
    }

    pub fn latin_source(&self) -> PathBuf {
        self.settings.source_dir.join(source_name(SOURCE_FONT_EN, &self.weight))
    }

    pub fn cjk_ttf_source(&self) -> PathBuf {
        self.settings.source_dir.join(source_name(SOURCE_FONT_JP, &self.weight))
    }

    pub fn cjk_otf_source(&self) -> PathBuf {
        self.settings.source_dir.join(source_name(SOURCE_FONT_JP_OTF, &self.weight))
    }

    /// Japanese font with TrueType outlines
    pub fn cjk_converted(&self) -> PathBuf {
        self.build_file(source_name(SOURCE_FONT_JP, &self.weight))
    }

    pub fn cjk_stripped(&self) -> PathBuf {
        self.build_file(format!("stripped_{}", source_name(SOURCE_FONT_JP, &self.weight)))
    }

    /// Japanese font entering em normalization
    pub fn cjk_prepared(&self) -> PathBuf {
        if self.settings.strip_duplicates { self.cjk_stripped() } else { self.cjk_converted() }
    }

    pub fn cjk_scaled(&self) -> PathBuf {
        self.build_file(format!("modified_{}", source_name(SOURCE_FONT_JP, &self.weight)))
    }

    pub fn latin_scaled(&self) -> PathBuf {
        self.build_file(format!("modified_{}", source_name(SOURCE_FONT_EN, &self.weight)))
    }

    pub fn font_name(&self) -> String {
        format!("{}-{}", self.settings.family, self.weight)
    }

    pub fn merged(&self) -> PathBuf {
        self.build_file(format!("merged_{}.ttf", self.font_name()))
    }

    /// Font before hint removal
    pub fn generated(&self) -> PathBuf {
        self.build_file(format!("gen_{}.ttf", self.font_name()))
    }

    pub fn output(&self) -> PathBuf {
        self.settings.dist_dir.join(format!("{}.ttf", self.font_name()))
    }
}

pub fn run_step(
    name: &str,
    step_num: usize,
    total: usize,
    ctx: &PipelineContext,
    f: impl Fn(&PipelineContext) -> Result<()>,
) -> Result<()> {
    println!("\n[{step_num}/{total}] {name} ({})", ctx.weight);
    let start = Instant::now();
    f(ctx).with_context(|| format!("Step '{name}' failed for {}", ctx.weight))?;
    println!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(())
}

pub fn run_steps(steps: &[PipelineStep], ctx: &PipelineContext) -> Result<()> {
    let total = steps.len();
    for (i, (name, step_fn)) in steps.iter().enumerate() {
        run_step(name, i + 1, total, ctx, step_fn)?;
    }
    Ok(())
}

/// Build every configured weight and return the output files.
pub fn build(settings: &BuildSettings) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    let timestamp = BuildTimestamp::from_env()?;
    let steps = steps(settings);

    println!("═══════════════════════════════════════════════════════════════════════════════");
    println!("{} {} Build Pipeline", settings.family, settings.version);
    println!("═══════════════════════════════════════════════════════════════════════════════");

    let contexts: Vec<PipelineContext> = settings
        .weights
        .iter()
        .map(|weight| PipelineContext::new(settings.clone(), weight, timestamp))
        .collect();

    if settings.parallel {
        let results: Vec<(String, Result<()>)> = contexts
            .par_iter()
            .map(|ctx| (ctx.weight.clone(), run_steps(&steps, ctx)))
            .collect();
        check_results(&results, "build")?;
    } else {
        for ctx in &contexts {
            run_steps(&steps, ctx)?;
        }
    }

    let outputs: Vec<PathBuf> = contexts.iter().map(PipelineContext::output).collect();
    let fonts = glob_fonts(&settings.dist_dir, &format!("{}-*.ttf", settings.family))?;

    println!("\n═══════════════════════════════════════════════════════════════════════════════");
    println!("✨ Build complete in {:.2}s", start.elapsed().as_secs_f64());
    println!("   Output: {}", settings.dist_dir.display());
    println!("   Fonts: {}", fonts.len());
    println!("═══════════════════════════════════════════════════════════════════════════════");

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn context(strip_duplicates: bool) -> PipelineContext {
        let settings = BuildSettings {
            source_dir: "src".into(),
            build_dir: "tmp".into(),
            dist_dir: "out".into(),
            strip_duplicates,
            ..BuildSettings::default()
        };
        let timestamp = BuildTimestamp::from_epoch("0").unwrap();
        PipelineContext::new(settings, "Bold", timestamp)
    }

    #[test]
    fn test_paths() {
        let ctx = context(true);
        assert_eq!(ctx.latin_source(), Path::new("src/Roboto-Bold.ttf"));
        assert_eq!(ctx.cjk_otf_source(), Path::new("src/NotoSansJP-Bold.otf"));
        assert_eq!(ctx.cjk_converted(), Path::new("tmp/NotoSansJP-Bold.ttf"));
        assert_eq!(ctx.cjk_prepared(), Path::new("tmp/stripped_NotoSansJP-Bold.ttf"));
        assert_eq!(ctx.cjk_scaled(), Path::new("tmp/modified_NotoSansJP-Bold.ttf"));
        assert_eq!(ctx.generated(), Path::new("tmp/gen_RobotoNotoJP-Bold.ttf"));
        assert_eq!(ctx.output(), Path::new("out/RobotoNotoJP-Bold.ttf"));
    }

    #[test]
    fn test_prepared_without_stripping() {
        let ctx = context(false);
        assert_eq!(ctx.cjk_prepared(), ctx.cjk_converted());
    }
}
