//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use robotonoto_core::{
    BuildSettings, Dehinter, build, clean,
    config::{BUILD_DIR, DIST_DIR, FONT_NAME, SOURCE_DIR, TTFAUTOHINT, VERSION},
};

#[derive(Parser)]
#[command(name = "robotonoto-fonts")]
#[command(about = "Build RobotoNotoJP from Roboto and Noto Sans JP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// How hinting is removed from the final fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DehintMode {
    /// Run ttfautohint --dehint
    External,
    /// Strip hinting without external tools
    Builtin,
}

#[derive(Debug, Clone, clap::Args)]
pub struct BuildArgs {
    #[arg(long, default_value = SOURCE_DIR)]
    pub source_dir: PathBuf,
    #[arg(long, default_value = BUILD_DIR)]
    pub build_dir: PathBuf,
    #[arg(long, default_value = DIST_DIR)]
    pub dist_dir: PathBuf,
    #[arg(long, default_value = FONT_NAME)]
    pub family: String,
    /// Version tag, vMAJOR.MINOR[.PATCH]
    #[arg(short, long, default_value = VERSION)]
    pub version: String,
    /// Weights to build (default: Regular and Bold)
    #[arg(short, long = "weight")]
    pub weights: Vec<String>,
    /// Keep Japanese glyphs for codepoints Roboto already covers
    #[arg(long)]
    pub keep_duplicates: bool,
    #[arg(long, value_enum, default_value_t = DehintMode::External)]
    pub dehint: DehintMode,
    #[arg(long, default_value = TTFAUTOHINT)]
    pub ttfautohint: PathBuf,
    /// Build weights in parallel
    #[arg(long)]
    pub parallel: bool,
}

impl BuildArgs {
    pub fn settings(self) -> BuildSettings {
        let defaults = BuildSettings::default();
        let dehinter = match self.dehint {
            DehintMode::External => Dehinter::External { program: self.ttfautohint },
            DehintMode::Builtin => Dehinter::Builtin,
        };

        BuildSettings {
            source_dir: self.source_dir,
            build_dir: self.build_dir,
            dist_dir: self.dist_dir,
            family: self.family,
            version: self.version,
            weights: if self.weights.is_empty() { defaults.weights.clone() } else { self.weights },
            strip_duplicates: !self.keep_duplicates,
            dehinter,
            parallel: self.parallel,
            ..defaults
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every weight
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Remove the build and dist directories
    Clean {
        #[arg(long, default_value = BUILD_DIR)]
        build_dir: PathBuf,
        #[arg(long, default_value = DIST_DIR)]
        dist_dir: PathBuf,
    },
    #[command(subcommand, hide = true)]
    Dev(crate::dev::DevCommands),
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { args } => {
                build(&args.settings())?;
            }
            Commands::Clean { build_dir, dist_dir } => {
                clean(&build_dir, &dist_dir)?;
            }
            Commands::Dev(dev) => dev.run()?,
        }
        Ok(())
    }
}
