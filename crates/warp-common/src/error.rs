//! Error types for the warp pipeline.

use thiserror::Error;

/// Errors that can occur while georeferencing an image.
#[derive(Debug, Error)]
pub enum WarpError {
    /// The ground control point set is too small for the requested operation.
    #[error("not enough ground control points: need {needed}, got {got}")]
    NotEnoughGcps { needed: usize, got: usize },

    /// The memory budget cannot be satisfied at any output size above the
    /// configured dimension floor.
    #[error("memory budget of {budget_bytes} bytes cannot be met above the {floor} px dimension floor")]
    BudgetUnsatisfiable { budget_bytes: u64, floor: usize },

    /// The GCP geometry produced a singular thin-plate spline system.
    #[error("ground control points produced a singular thin-plate spline system")]
    SingularSystem,

    /// The source image has no pixels.
    #[error("source image is empty")]
    EmptyImage,

    /// Projection setup failed.
    #[error("projection error: {0}")]
    Projection(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for warp operations.
pub type Result<T> = std::result::Result<T, WarpError>;
