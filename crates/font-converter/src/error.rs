use std::result;

use read_fonts::ReadError;
use thiserror::Error;
use write_fonts::{BuilderError, error};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("failed to write font: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("font has no CFF table")]
    NotCff,

    #[error("failed to draw glyph {gid}: {message}")]
    Draw { gid: u32, message: String },
}

pub type Result<T> = result::Result<T, ConvertError>;
