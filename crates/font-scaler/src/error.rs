use std::result;

use read_fonts::ReadError;
use robotonoto_font_ops::CoordinateOverflow;
use thiserror::Error;
use write_fonts::{BuilderError, error};

#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("failed to write font: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("target unitsPerEm must be positive")]
    ZeroTarget,

    #[error("font has CFF outlines; convert it to TrueType first")]
    CffNotSupported,

    #[error("scaled value of '{table}' field '{field}' is out of range")]
    Overflow { table: &'static str, field: &'static str },

    #[error("glyph {gid}: {source}")]
    GlyphOverflow { gid: u16, source: CoordinateOverflow },
}

pub type Result<T> = result::Result<T, ScaleError>;
