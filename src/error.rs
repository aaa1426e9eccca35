use std::path::PathBuf;
use thiserror::Error;

/// Whole-run failures surfaced to the caller as hard errors.
///
/// Everything below this tier (a bad ladder level, a bad page, a bad
/// embedded image) is recovered locally and never reaches the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Target size must be greater than zero")]
    InvalidTarget,

    #[error("Failed to read input {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create temporary file: {0}")]
    TempFile(std::io::Error),

    #[error("Failed to write output {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-candidate failures: one ladder level produced no usable artifact.
///
/// The driver logs these and continues with the next level.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
