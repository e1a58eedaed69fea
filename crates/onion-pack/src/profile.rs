//! Layer profiles and per-object radius vectors.
//!
//! A [`LayerProfile`] describes the population: one mean radius, one standard
//! deviation, and one point density per nested layer. A [`ShellRadii`] is one
//! object drawn from that population: the sampled per-layer radial thickness,
//! innermost layer first.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PackError, PackResult};

/// Volume of a sphere with the given radius.
#[must_use]
pub fn sphere_volume(radius: f64) -> f64 {
    4.0 / 3.0 * std::f64::consts::PI * radius.powi(3)
}

/// Population-level description of the nested layers.
///
/// Lengths of all three sequences must match; index 0 is the innermost layer
/// (the core). Densities are points per unit volume and may be zero for
/// layers that should stay empty.
///
/// # Example
///
/// ```
/// use onion_pack::LayerProfile;
///
/// let profile = LayerProfile::new(
///     vec![10.0, 7.0, 6.0, 5.0, 4.0],
///     vec![1.5, 1.2, 0.5, 0.8, 1.0],
///     vec![0.0, 0.05, 0.1, 0.03, 0.2],
/// )
/// .unwrap();
/// assert_eq!(profile.layer_count(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerProfile {
    /// Target arithmetic mean of each layer's radial thickness.
    pub means: Vec<f64>,
    /// Target standard deviation of each layer's radial thickness.
    pub stds: Vec<f64>,
    /// Target point density (points per unit volume) of each layer.
    pub densities: Vec<f64>,
}

impl LayerProfile {
    /// Creates a validated profile.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidDistribution`] if a mean is non-positive
    /// or a standard deviation is negative, non-finite, or at least as large
    /// as its mean, and [`PackError::InvalidParameter`] for length mismatches
    /// or invalid densities.
    pub fn new(means: Vec<f64>, stds: Vec<f64>, densities: Vec<f64>) -> PackResult<Self> {
        let profile = Self {
            means,
            stds,
            densities,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Number of nested layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.means.len()
    }

    /// Validates all profile invariants.
    ///
    /// # Errors
    ///
    /// See [`LayerProfile::new`].
    pub fn validate(&self) -> PackResult<()> {
        if self.means.is_empty() {
            return Err(PackError::invalid_parameter("profile has no layers"));
        }
        if self.stds.len() != self.means.len() || self.densities.len() != self.means.len() {
            return Err(PackError::invalid_parameter(format!(
                "layer count mismatch: {} means, {} stds, {} densities",
                self.means.len(),
                self.stds.len(),
                self.densities.len()
            )));
        }
        for (layer, (&mean, &std)) in self.means.iter().zip(&self.stds).enumerate() {
            if !mean.is_finite() || mean <= 0.0 {
                return Err(PackError::InvalidDistribution {
                    layer,
                    reason: format!("mean {mean} must be positive and finite"),
                });
            }
            if !std.is_finite() || std < 0.0 {
                return Err(PackError::InvalidDistribution {
                    layer,
                    reason: format!("std {std} must be non-negative and finite"),
                });
            }
            if std >= mean {
                return Err(PackError::InvalidDistribution {
                    layer,
                    reason: format!("std {std} >= mean {mean}"),
                });
            }
        }
        for (layer, &density) in self.densities.iter().enumerate() {
            if !density.is_finite() || density < 0.0 {
                return Err(PackError::invalid_parameter(format!(
                    "density {density} for layer {layer} must be non-negative and finite"
                )));
            }
        }
        Ok(())
    }
}

/// One object's sampled per-layer radial thickness, innermost layer first.
///
/// Prefix sums of the entries give the cumulative outer radius of each layer;
/// the final sum is the object's outer radius.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShellRadii {
    layers: Vec<f64>,
}

impl ShellRadii {
    /// Creates a radius vector from per-layer thickness values.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::DegenerateGeometry`] if any thickness is
    /// non-positive or non-finite, or the vector is empty.
    pub fn new(layers: Vec<f64>) -> PackResult<Self> {
        if layers.is_empty() {
            return Err(PackError::degenerate("radius vector has no layers"));
        }
        for (layer, &t) in layers.iter().enumerate() {
            if !t.is_finite() || t <= 0.0 {
                return Err(PackError::degenerate(format!(
                    "layer {layer} thickness {t} must be positive and finite"
                )));
            }
        }
        Ok(Self { layers })
    }

    /// Constructor for freshly drawn layers; log-normal draws are always
    /// positive, so no revalidation.
    pub(crate) fn from_sampled(layers: Vec<f64>) -> Self {
        debug_assert!(layers.iter().all(|&t| t.is_finite() && t > 0.0));
        Self { layers }
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Per-layer thickness values, innermost first.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.layers
    }

    /// The object's outer radius (sum of all layer thicknesses).
    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.layers.iter().sum()
    }

    /// Volume of the sphere bounded by the outer radius.
    #[must_use]
    pub fn outer_volume(&self) -> f64 {
        sphere_volume(self.outer_radius())
    }

    /// Cumulative outer radius of each layer, strictly increasing.
    #[must_use]
    pub fn cumulative(&self) -> Vec<f64> {
        let mut total = 0.0;
        self.layers
            .iter()
            .map(|&t| {
                total += t;
                total
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_profile() -> LayerProfile {
        LayerProfile::new(
            vec![10.0, 7.0, 6.0, 5.0, 4.0],
            vec![1.5, 1.2, 0.5, 0.8, 1.0],
            vec![0.0, 0.05, 0.1, 0.03, 0.2],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_profile() {
        let profile = make_profile();
        assert_eq!(profile.layer_count(), 5);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_zero_std_allowed() {
        let profile = LayerProfile::new(vec![5.0], vec![0.0], vec![1.0]).unwrap();
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_non_positive_mean_rejected() {
        let mut profile = make_profile();
        profile.means[1] = 0.0;
        assert!(matches!(
            profile.validate(),
            Err(PackError::InvalidDistribution { layer: 1, .. })
        ));

        profile.means[1] = -3.0;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_std_at_least_mean_rejected() {
        let mut profile = make_profile();
        profile.stds[2] = profile.means[2];
        assert!(matches!(
            profile.validate(),
            Err(PackError::InvalidDistribution { layer: 2, .. })
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut profile = make_profile();
        profile.densities.pop();
        assert!(matches!(
            profile.validate(),
            Err(PackError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_negative_density_rejected() {
        let mut profile = make_profile();
        profile.densities[0] = -0.1;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_empty_profile_rejected() {
        assert!(LayerProfile::new(vec![], vec![], vec![]).is_err());
    }

    #[test]
    fn test_shell_radii_cumulative() {
        let radii = ShellRadii::new(vec![10.0, 7.0, 6.0]).unwrap();
        assert_eq!(radii.layer_count(), 3);
        assert_relative_eq!(radii.outer_radius(), 23.0);

        let cumulative = radii.cumulative();
        assert_eq!(cumulative.len(), 3);
        assert_relative_eq!(cumulative[0], 10.0);
        assert_relative_eq!(cumulative[1], 17.0);
        assert_relative_eq!(cumulative[2], 23.0);
    }

    #[test]
    fn test_shell_radii_outer_volume() {
        let radii = ShellRadii::new(vec![1.0]).unwrap();
        assert_relative_eq!(
            radii.outer_volume(),
            4.0 / 3.0 * std::f64::consts::PI,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_shell_radii_rejects_bad_layers() {
        assert!(ShellRadii::new(vec![]).is_err());
        assert!(ShellRadii::new(vec![1.0, 0.0]).is_err());
        assert!(ShellRadii::new(vec![1.0, -2.0]).is_err());
        assert!(ShellRadii::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_sphere_volume() {
        assert_relative_eq!(sphere_volume(0.0), 0.0);
        assert_relative_eq!(
            sphere_volume(2.0),
            4.0 / 3.0 * std::f64::consts::PI * 8.0,
            epsilon = 1e-12
        );
    }
}
