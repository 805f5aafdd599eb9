//! Error types for dtseg-core.

use thiserror::Error;

/// Result type alias for dtseg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for segment evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Segment direction cannot be extrapolated along local z.
    #[error("degenerate segment direction ({x}, {y}, {z}): cos(theta) is zero or undefined")]
    DegenerateDirection { x: f64, y: f64, z: f64 },

    /// Reduced chi-square requested for a fit with no degrees of freedom.
    #[error("segment fit has zero degrees of freedom")]
    ZeroDegreesOfFreedom,

    /// Cluster covariance is negative or not finite.
    #[error("invalid cluster error estimate: xx = {0}")]
    InvalidClusterError(f64),

    /// Superlayer index outside 1..=3.
    #[error("invalid superlayer index: {0}")]
    InvalidSuperLayer(u8),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
