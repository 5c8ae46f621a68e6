//! RobotoNotoJP build pipeline.
//!
//! Merges Roboto and Noto Sans JP into one family: the Japanese font is
//! converted to TrueType outlines, loses the codepoints Roboto already maps,
//! is scaled to Roboto's em and merged into it. Metadata is then rewritten
//! and hinting removed.

pub mod config;
pub mod dehint;
pub mod io;
pub mod pipeline;

pub use config::BuildSettings;
pub use dehint::Dehinter;
pub use pipeline::{PipelineContext, build, clean};

pub use robotonoto_font_converter::convert_cff_to_glyf;
pub use robotonoto_font_merger::{Merger, Options as MergeOptions};
pub use robotonoto_font_metadata::{
    BuildTimestamp, FontMetadata, FontNaming, FontVersion, Vendor, VerticalMetrics,
};
pub use robotonoto_font_ops::strip_hinting;
pub use robotonoto_font_scaler::scale_to_upem;
pub use robotonoto_font_subsetter::strip_codepoints;
