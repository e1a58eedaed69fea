//! Error types for sampling and packing operations.

use thiserror::Error;

/// Result type for packing operations.
pub type PackResult<T> = Result<T, PackError>;

/// Errors that can occur while sampling or packing objects.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PackError {
    /// A layer's mean/std pair has no real log-normal parameterization.
    #[error("invalid log-normal parameters for layer {layer}: {reason}")]
    InvalidDistribution {
        /// Zero-based layer index.
        layer: usize,
        /// Description of the offending parameter.
        reason: String,
    },

    /// Center placement exhausted its candidate budget before reaching the
    /// requested count.
    #[error(
        "packing infeasible: placed {placed} of {requested} centers after {attempts} candidates"
    )]
    PackingInfeasible {
        /// Number of centers requested.
        requested: usize,
        /// Number of centers placed before the budget ran out.
        placed: usize,
        /// Total candidates drawn.
        attempts: usize,
    },

    /// A shell geometry has zero or negative extent, or a shear angle
    /// collapses the box volume.
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// Description of the degenerate dimension.
        reason: String,
    },

    /// A configuration or bound parameter is outside its valid range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of the parameter error.
        reason: String,
    },
}

impl PackError {
    /// Create a degenerate geometry error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Check if this is an infeasible-packing error.
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::PackingInfeasible { .. })
    }
}
