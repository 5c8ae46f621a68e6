//! Build configuration for RobotoNotoJP.

use std::path::PathBuf;

use anyhow::Result;
use robotonoto_font_metadata::{
    BuildTimestamp, FontMetadata, FontNaming, FontVersion, Vendor, VerticalMetrics,
};

use crate::dehint::Dehinter;

/// Family name of the merged font.
pub const FONT_NAME: &str = "RobotoNotoJP";

pub const VERSION: &str = "v0.0.1";

pub const WEIGHTS: &[&str] = &["Regular", "Bold"];

pub const SOURCE_DIR: &str = "source_fonts";
pub const BUILD_DIR: &str = "build_tmp";
pub const DIST_DIR: &str = "dist";

/// Japanese source as TrueType; `{}` is the weight.
pub const SOURCE_FONT_JP: &str = "NotoSansJP-{}.ttf";
/// Japanese source as CFF OpenType, converted when no TrueType file exists.
pub const SOURCE_FONT_JP_OTF: &str = "NotoSansJP-{}.otf";
pub const SOURCE_FONT_EN: &str = "Roboto-{}.ttf";

pub const EM_ASCENT: u16 = 1638;
pub const EM_DESCENT: u16 = 410;
/// Line ascent; keeps tall accents out of the clipping zone.
pub const FONT_ASCENT: u16 = EM_ASCENT + 60;
pub const FONT_DESCENT: u16 = EM_DESCENT + 170;

pub const VENDOR: &str = "TWR";

pub const COPYRIGHT: &str = "[Roboto]
Copyright (c) 2014 The Roboto Project Authors (https://github.com/googlefonts/roboto)

[NotoSansJP]
Copyright 2012 Google Inc.

[RobotoNotoJP]
Copyright 2023 soracat
";

pub const LICENSE: &str = "This Font Software is licensed under the SIL Open Font License, Version 1.1. This license is available with a FAQ at: http://scripts.sil.org/OFL";
pub const LICENSE_URL: &str = "http://scripts.sil.org/OFL";

pub const TTFAUTOHINT: &str = "ttfautohint";

/// Fill a `{}` file name template with a weight.
pub fn source_name(template: &str, weight: &str) -> String {
    template.replace("{}", weight)
}

/// Everything a build needs, with defaults from the constants above.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub family: String,
    pub version: String,
    pub weights: Vec<String>,
    /// Remove codepoints from the Japanese font that the Latin font maps.
    pub strip_duplicates: bool,
    pub dehinter: Dehinter,
    /// Build weights concurrently
    pub parallel: bool,
    pub metrics: VerticalMetrics,
    pub vendor: String,
    pub copyright: String,
    pub license: String,
    pub license_url: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(SOURCE_DIR),
            build_dir: PathBuf::from(BUILD_DIR),
            dist_dir: PathBuf::from(DIST_DIR),
            family: FONT_NAME.to_string(),
            version: VERSION.to_string(),
            weights: WEIGHTS.iter().map(|w| w.to_string()).collect(),
            strip_duplicates: true,
            dehinter: Dehinter::External { program: PathBuf::from(TTFAUTOHINT) },
            parallel: false,
            metrics: VerticalMetrics {
                em_ascent: EM_ASCENT,
                em_descent: EM_DESCENT,
                line_ascent: FONT_ASCENT,
                line_descent: FONT_DESCENT,
            },
            vendor: VENDOR.to_string(),
            copyright: COPYRIGHT.to_string(),
            license: LICENSE.to_string(),
            license_url: LICENSE_URL.to_string(),
        }
    }
}

impl BuildSettings {
    pub fn units_per_em(&self) -> u16 {
        self.metrics.units_per_em()
    }

    /// Metadata of one weight. Fails on an invalid version or vendor id.
    pub fn metadata(&self, weight: &str, timestamp: BuildTimestamp) -> Result<FontMetadata> {
        Ok(FontMetadata {
            metrics: self.metrics,
            naming: FontNaming {
                family: self.family.clone(),
                style: weight.to_string(),
                version: self.version.clone(),
                vendor: self.vendor.clone(),
                copyright: self.copyright.clone(),
                license: self.license.clone(),
                license_url: self.license_url.clone(),
            },
            vendor: Vendor::new(&self.vendor)?,
            version: FontVersion::parse(&self.version)?,
            timestamp,
        })
    }
}
