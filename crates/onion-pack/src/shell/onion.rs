//! Concentric spherical shells around a common center.

use nalgebra::Point3;
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};

use crate::cloud::LabeledPoint;
use crate::error::{PackError, PackResult};
use crate::profile::{sphere_volume, ShellRadii};

/// An object of nested spherical shells, each with its own point density.
///
/// Layer k (0-based) occupies the annulus between cumulative radii
/// `outer[k-1]` and `outer[k]`, with `outer[-1] = 0`; emitted points carry
/// the 1-based layer index as their shell label.
///
/// # Example
///
/// ```
/// use onion_pack::{Onion, ShellRadii};
/// use nalgebra::Point3;
///
/// let radii = ShellRadii::new(vec![10.0, 7.0]).unwrap();
/// let onion = Onion::new(&radii, &[0.0, 0.1]).unwrap();
///
/// assert_eq!(onion.shell_of(&Point3::new(4.0, 0.0, 0.0)), Some(1));
/// assert_eq!(onion.shell_of(&Point3::new(12.0, 0.0, 0.0)), Some(2));
/// assert_eq!(onion.shell_of(&Point3::new(20.0, 0.0, 0.0)), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Onion {
    cumulative: Vec<f64>,
    densities: Vec<f64>,
}

impl Onion {
    /// Creates an onion from per-layer radii and densities.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidParameter`] if the density count does not
    /// match the layer count or a density is negative or non-finite.
    pub fn new(radii: &ShellRadii, densities: &[f64]) -> PackResult<Self> {
        if densities.len() != radii.layer_count() {
            return Err(PackError::invalid_parameter(format!(
                "{} densities for {} layers",
                densities.len(),
                radii.layer_count()
            )));
        }
        for (layer, &density) in densities.iter().enumerate() {
            if !density.is_finite() || density < 0.0 {
                return Err(PackError::invalid_parameter(format!(
                    "density {density} for layer {layer} must be non-negative and finite"
                )));
            }
        }
        Ok(Self {
            cumulative: radii.cumulative(),
            densities: densities.to_vec(),
        })
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.cumulative.len()
    }

    /// The outermost radius.
    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Inner and outer radius of one layer's annulus.
    #[must_use]
    pub fn layer_bounds(&self, layer: usize) -> Option<(f64, f64)> {
        let outer = *self.cumulative.get(layer)?;
        let inner = if layer == 0 {
            0.0
        } else {
            self.cumulative[layer - 1]
        };
        Some((inner, outer))
    }

    /// Exact volume of one layer's annulus.
    #[must_use]
    pub fn layer_volume(&self, layer: usize) -> Option<f64> {
        let (inner, outer) = self.layer_bounds(layer)?;
        Some(sphere_volume(outer) - sphere_volume(inner))
    }

    /// Point budget of one layer: density times annulus volume, rounded to
    /// the nearest integer.
    #[must_use]
    pub fn layer_budget(&self, layer: usize) -> Option<usize> {
        let volume = self.layer_volume(layer)?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some((self.densities[layer] * volume).round() as usize)
    }

    /// The 1-based shell label of a point local to the object's center, or
    /// `None` outside the outermost radius.
    #[must_use]
    pub fn shell_of(&self, point: &Point3<f64>) -> Option<u32> {
        let r = point.coords.norm();
        self.cumulative.iter().position(|&outer| r < outer).map(|k| {
            #[allow(clippy::cast_possible_truncation)]
            let label = k as u32 + 1;
            label
        })
    }

    /// Samples every layer's point budget, uniformly within each annulus.
    ///
    /// Directions are uniform on the unit sphere; radii follow the
    /// volume-uniform law `r = (r_in^3 + u (r_out^3 - r_in^3))^(1/3)`, so
    /// density is uniform across each annulus.
    pub fn sample_points<R: Rng>(&self, rng: &mut R) -> Vec<LabeledPoint> {
        let total: usize = (0..self.layer_count())
            .filter_map(|k| self.layer_budget(k))
            .sum();
        let mut points = Vec::with_capacity(total);

        for layer in 0..self.layer_count() {
            let Some((inner, outer)) = self.layer_bounds(layer) else {
                continue;
            };
            let Some(budget) = self.layer_budget(layer) else {
                continue;
            };
            #[allow(clippy::cast_possible_truncation)]
            let label = layer as u32 + 1;

            let inner_cubed = inner.powi(3);
            let span_cubed = outer.powi(3) - inner_cubed;
            for _ in 0..budget {
                let u: f64 = rng.gen_range(0.0..1.0);
                let r = (inner_cubed + u * span_cubed).cbrt();
                let dir: [f64; 3] = UnitSphere.sample(rng);
                points.push(LabeledPoint::from_coords(
                    dir[0] * r,
                    dir[1] * r,
                    dir[2] * r,
                    label,
                ));
            }
        }

        points
    }
}
