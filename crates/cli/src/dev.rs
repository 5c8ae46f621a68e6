//! Development commands exposing single pipeline steps.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use rayon::prelude::*;
use robotonoto_core::{
    BuildSettings, Dehinter,
    io::{check_results, read_font, transform_font, transform_font_in_place, write_font},
};
use robotonoto_font_converter::{DEFAULT_TOLERANCE, convert_with_tolerance};
use robotonoto_font_merger::{Merger, Options};
use robotonoto_font_metadata::BuildTimestamp;
use robotonoto_font_scaler::scale_to_upem;
use robotonoto_font_subsetter::strip_codepoints;

#[derive(Subcommand)]
pub enum DevCommands {
    /// Convert CFF outlines to TrueType
    Convert {
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
        input: PathBuf,
        output: PathBuf,
    },
    /// Remove codepoints covered by another font
    StripDuplicates {
        #[arg(long)]
        primary: PathBuf,
        input: PathBuf,
        output: PathBuf,
    },
    Scale {
        #[arg(long, default_value_t = 2048)]
        upem: u16,
        input: PathBuf,
        output: PathBuf,
    },
    /// Merge fonts; the first one is the base
    Merge {
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_delimiter = ',')]
        drop_tables: Vec<String>,
    },
    /// Rewrite metrics, names, vendor and version in place
    SetMetadata {
        #[arg(long)]
        weight: String,
        #[arg(long)]
        family: Option<String>,
        #[arg(short, long)]
        version: Option<String>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    Dehint {
        /// Strip hinting without ttfautohint
        #[arg(long)]
        builtin: bool,
        #[arg(long, default_value = "ttfautohint")]
        ttfautohint: PathBuf,
        input: PathBuf,
        output: PathBuf,
    },
}

impl DevCommands {
    pub fn run(self) -> Result<()> {
        match self {
            DevCommands::Convert { tolerance, input, output } => {
                transform_font(&input, &output, |data| {
                    Ok(convert_with_tolerance(data, tolerance)?)
                })?;
                println!("Converted {} -> {}", input.display(), output.display());
            }
            DevCommands::StripDuplicates { primary, input, output } => {
                let primary_data = read_font(&primary)?;
                transform_font(&input, &output, |data| strip_codepoints(data, &primary_data))?;
                println!("Stripped {} -> {}", input.display(), output.display());
            }
            DevCommands::Scale { upem, input, output } => {
                transform_font(&input, &output, |data| Ok(scale_to_upem(data, upem)?))?;
                println!("Scaled {} to {upem} upem -> {}", input.display(), output.display());
            }
            DevCommands::Merge { inputs, output, drop_tables } => {
                let data = inputs.iter().map(read_font).collect::<Result<Vec<_>>>()?;
                let refs: Vec<&[u8]> = data.iter().map(Vec::as_slice).collect();
                let merger = Merger::new(Options::new().drop_tables(drop_tables));
                write_font(&output, merger.merge(&refs).context("Failed to merge fonts")?)?;
                println!("Merged {} fonts -> {}", inputs.len(), output.display());
            }
            DevCommands::SetMetadata { weight, family, version, files } => {
                let defaults = BuildSettings::default();
                let settings = BuildSettings {
                    family: family.unwrap_or(defaults.family.clone()),
                    version: version.unwrap_or(defaults.version.clone()),
                    ..defaults
                };
                let metadata = settings.metadata(&weight, BuildTimestamp::from_env()?)?;

                let results: Vec<(String, Result<()>)> = files
                    .par_iter()
                    .map(|path| {
                        let result = transform_font_in_place(path, |data| metadata.apply(data));
                        (path.display().to_string(), result)
                    })
                    .collect();
                check_results(&results, "set metadata")?;
                println!("Set metadata on {} fonts", files.len());
            }
            DevCommands::Dehint { builtin, ttfautohint, input, output } => {
                let dehinter = if builtin {
                    Dehinter::Builtin
                } else {
                    Dehinter::External { program: ttfautohint }
                };
                dehinter.run(&input, &output)?;
                println!("Dehinted {} -> {}", input.display(), output.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    use super::*;

    #[test]
    fn test_parse_merge() {
        let cli = Cli::parse_from([
            "robotonoto-fonts",
            "dev",
            "merge",
            "a.ttf",
            "b.ttf",
            "-o",
            "out.ttf",
            "--drop-tables",
            "GPOS,kern",
        ]);
        let Commands::Dev(DevCommands::Merge { inputs, output, drop_tables }) = cli.command else {
            panic!("expected dev merge");
        };
        assert_eq!(inputs, vec![PathBuf::from("a.ttf"), PathBuf::from("b.ttf")]);
        assert_eq!(output, PathBuf::from("out.ttf"));
        assert_eq!(drop_tables, vec!["GPOS", "kern"]);
    }

    #[test]
    fn test_merge_needs_two_inputs() {
        let result =
            Cli::try_parse_from(["robotonoto-fonts", "dev", "merge", "a.ttf", "-o", "out.ttf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_scale_default_upem() {
        let cli = Cli::parse_from(["robotonoto-fonts", "dev", "scale", "in.ttf", "out.ttf"]);
        let Commands::Dev(DevCommands::Scale { upem, .. }) = cli.command else {
            panic!("expected dev scale");
        };
        assert_eq!(upem, 2048);
    }
}
