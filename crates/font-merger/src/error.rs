use std::result;

use read_fonts::ReadError;
use robotonoto_font_ops::CoordinateOverflow;
use thiserror::Error;
use write_fonts::{BuilderError, error};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("failed to write font: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("no fonts provided for merging")]
    NoFonts,

    #[error("fonts have incompatible unitsPerEm: expected {expected}, got {actual}")]
    IncompatibleUnitsPerEm { expected: u16, actual: u16 },

    #[error("font {0} has CFF outlines; convert it to TrueType first")]
    CffNotSupported(usize),

    #[error("required table '{0}' not found")]
    MissingTable(&'static str),

    #[error("merged font would have {0} glyphs, more than 65535")]
    TooManyGlyphs(usize),

    #[error("merged GSUB would have {count} {what}, more than 65535")]
    LayoutOverflow { what: &'static str, count: usize },

    #[error("glyph {glyph} of font {font}: {source}")]
    GlyphOverflow { font: usize, glyph: String, source: CoordinateOverflow },
}

pub type Result<T> = result::Result<T, MergeError>;
