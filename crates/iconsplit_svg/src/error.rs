//! SVG error types

use std::io;
use thiserror::Error;

/// Errors that can occur when loading or rewriting SVG files
#[derive(Error, Debug)]
pub enum SvgError {
    /// IO error when reading or writing the file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// SVG parsing error
    #[error("SVG parsing error: {0}")]
    Parse(String),

    /// The document parsed but its root is not an `<svg>` element
    #[error("not an SVG document: root element is <{0}>")]
    NotSvg(String),
}

/// Errors resolving an explicitly requested icon label
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no icon labeled '{0}' in the master drawing")]
    UnknownIcon(String),

    /// The group exists but its parent is not a labeled layer
    #[error("icon '{0}' is not inside a labeled layer")]
    NoLayer(String),

    #[error("icon '{0}' has no id attribute")]
    MissingId(String),
}

impl LookupError {
    /// The label that failed to resolve
    pub fn label(&self) -> &str {
        match self {
            Self::UnknownIcon(label) | Self::NoLayer(label) | Self::MissingId(label) => label,
        }
    }
}
