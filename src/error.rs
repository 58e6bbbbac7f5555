//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::source_image::ImageError;
use crate::template::TemplateError;

/// Any failure surfaced by the sheetmark driver.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session script could not be read or parsed
    #[error("Invalid session script: {0}")]
    Session(String),

    /// Bad command-line arguments
    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
