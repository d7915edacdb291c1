// Error types for the perception classifiers and their collaborators

use thiserror::Error;

/// Errors surfaced by the library.
///
/// Missing landmark groups, short keypoint sets and degenerate mouth contours are not errors:
/// the classifiers fall back to their default label instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot compute {0} of an empty point group")]
    EmptyInput(&'static str),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Malformed heatmap: {0}")]
    Heatmap(String),

    #[error("Font loading failed: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Error::Heatmap(err.to_string())
    }
}

impl From<ab_glyph::InvalidFont> for Error {
    fn from(err: ab_glyph::InvalidFont) -> Self {
        Error::Font(err.to_string())
    }
}
