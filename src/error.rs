//! Error types for palette extraction

use thiserror::Error;

/// Result type alias for palette extraction
pub type Result<T> = std::result::Result<T, PaletteError>;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch { len: usize, width: u32, height: u32 },

    /// Clustering was asked to run without any sampled colors.
    #[error("cannot cluster an empty point set")]
    EmptyPointSet,

    #[error("invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    #[error("unable to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PaletteError {
    pub(crate) fn invalid(parameter: &str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }
}
