//! Nested oblique (sheared) rectangular shells.

use nalgebra::{Point3, Vector3};
use rand::Rng;

use crate::cloud::LabeledPoint;
use crate::error::{PackError, PackResult};
use crate::profile::ShellRadii;

/// Shear angles with `sin` below this collapse the box volume.
const MIN_SIN: f64 = 1e-9;

/// An object of nested parallelepiped shells sheared by two angles.
///
/// Layer k (0-based) is the region inside the oblique box of cumulative
/// thickness `cum[k]` but outside the box of cumulative thickness
/// `cum[k-1]`, both centered on the object's center and sharing the shear.
/// θ tilts the x-faces against the z-axis, φ the y-faces; π/2 means no
/// shear. In object-centered coordinates a point is inside the box of
/// cumulative thickness `t` iff
///
/// ```text
/// |z| ≤ t.z·sin(θ)·sin(φ) / 2
/// |x − z/tan(θ)| ≤ t.x / 2
/// |y − z/tan(φ)| ≤ t.y / 2
/// ```
///
/// so the shear vanishes at z = 0 for any angles.
#[derive(Debug, Clone, PartialEq)]
pub struct ObliqueBox {
    cumulative: Vec<Vector3<f64>>,
    densities: Vec<f64>,
    theta: f64,
    phi: f64,
    sin_theta: f64,
    sin_phi: f64,
    cot_theta: f64,
    cot_phi: f64,
}

impl ObliqueBox {
    /// Creates a box from per-layer thickness vectors and densities.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::DegenerateGeometry`] for an empty layer list, a
    /// non-positive thickness component, or a shear angle whose sine is
    /// (nearly) zero, and [`PackError::InvalidParameter`] for density
    /// mismatches.
    pub fn new(
        thickness: Vec<Vector3<f64>>,
        densities: &[f64],
        theta: f64,
        phi: f64,
    ) -> PackResult<Self> {
        if thickness.is_empty() {
            return Err(PackError::degenerate("box has no layers"));
        }
        if densities.len() != thickness.len() {
            return Err(PackError::invalid_parameter(format!(
                "{} densities for {} layers",
                densities.len(),
                thickness.len()
            )));
        }
        for (layer, t) in thickness.iter().enumerate() {
            if t.iter().any(|&c| !c.is_finite() || c <= 0.0) {
                return Err(PackError::degenerate(format!(
                    "layer {layer} thickness {t} must have positive finite components"
                )));
            }
        }
        for (layer, &density) in densities.iter().enumerate() {
            if !density.is_finite() || density < 0.0 {
                return Err(PackError::invalid_parameter(format!(
                    "density {density} for layer {layer} must be non-negative and finite"
                )));
            }
        }

        let (sin_theta, cot_theta) = shear_terms(theta, "theta")?;
        let (sin_phi, cot_phi) = shear_terms(phi, "phi")?;

        let mut total = Vector3::zeros();
        let cumulative = thickness
            .iter()
            .map(|t| {
                total += t;
                total
            })
            .collect();

        Ok(Self {
            cumulative,
            densities: densities.to_vec(),
            theta,
            phi,
            sin_theta,
            sin_phi,
            cot_theta,
            cot_phi,
        })
    }

    /// Creates an unsheared (axis-aligned) box.
    ///
    /// # Errors
    ///
    /// See [`ObliqueBox::new`].
    pub fn axis_aligned(thickness: Vec<Vector3<f64>>, densities: &[f64]) -> PackResult<Self> {
        Self::new(
            thickness,
            densities,
            std::f64::consts::FRAC_PI_2,
            std::f64::consts::FRAC_PI_2,
        )
    }

    /// Creates a box whose per-layer thickness is the same sampled radius on
    /// every axis.
    ///
    /// # Errors
    ///
    /// See [`ObliqueBox::new`].
    pub fn isotropic(
        radii: &ShellRadii,
        densities: &[f64],
        theta: f64,
        phi: f64,
    ) -> PackResult<Self> {
        let thickness = radii
            .as_slice()
            .iter()
            .map(|&t| Vector3::new(t, t, t))
            .collect();
        Self::new(thickness, densities, theta, phi)
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.cumulative.len()
    }

    /// The shear angles `(theta, phi)`.
    #[must_use]
    pub fn shear(&self) -> (f64, f64) {
        (self.theta, self.phi)
    }

    /// Axis-aligned bounding-box extents of the sheared box with the given
    /// cumulative thickness.
    fn bbox_extents(&self, cum: &Vector3<f64>) -> Vector3<f64> {
        let ez = cum.z * self.sin_theta * self.sin_phi;
        Vector3::new(
            cum.x + ez * self.cot_theta.abs(),
            cum.y + ez * self.cot_phi.abs(),
            ez,
        )
    }

    /// Membership in the oblique box of the given cumulative thickness.
    fn in_box(&self, point: &Point3<f64>, cum: &Vector3<f64>) -> bool {
        let z_len = cum.z * self.sin_theta * self.sin_phi;
        point.z.abs() <= z_len / 2.0
            && (point.x - point.z * self.cot_theta).abs() <= cum.x / 2.0
            && (point.y - point.z * self.cot_phi).abs() <= cum.y / 2.0
    }

    /// The 1-based shell label of a point local to the object's center, or
    /// `None` outside the outermost box.
    #[must_use]
    pub fn shell_of(&self, point: &Point3<f64>) -> Option<u32> {
        self.cumulative
            .iter()
            .position(|cum| self.in_box(point, cum))
            .map(|k| {
                #[allow(clippy::cast_possible_truncation)]
                let label = k as u32 + 1;
                label
            })
    }

    /// Radius of the sphere circumscribing the outermost box's bounding box.
    #[must_use]
    pub fn exclusion_radius(&self) -> f64 {
        self.cumulative
            .last()
            .map(|cum| self.bbox_extents(cum).norm() / 2.0)
            .unwrap_or(0.0)
    }

    /// True (sheared) volume of one layer's shell region.
    #[must_use]
    pub fn layer_volume(&self, layer: usize) -> Option<f64> {
        let volume = |cum: &Vector3<f64>| cum.x * cum.y * cum.z * self.sin_theta * self.sin_phi;
        let outer = volume(self.cumulative.get(layer)?);
        let inner = if layer == 0 {
            0.0
        } else {
            volume(&self.cumulative[layer - 1])
        };
        Some(outer - inner)
    }

    /// Point budget of one layer: density times the outer box's
    /// bounding-box volume, rounded to the nearest integer.
    ///
    /// Draws are uniform in the bounding box and thinned by the membership
    /// test, so the kept count concentrates on density times the true layer
    /// volume.
    #[must_use]
    pub fn layer_budget(&self, layer: usize) -> Option<usize> {
        let extents = self.bbox_extents(self.cumulative.get(layer)?);
        let bbox_volume = extents.x * extents.y * extents.z;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some((self.densities[layer] * bbox_volume).round() as usize)
    }

    /// Samples every layer: the layer's budget is drawn uniformly inside the
    /// outer box's bounding box, and points outside the outer-minus-inner
    /// shell region are rejected in the same pass.
    pub fn sample_points<R: Rng>(&self, rng: &mut R) -> Vec<LabeledPoint> {
        let mut points = Vec::new();

        for layer in 0..self.layer_count() {
            let Some(budget) = self.layer_budget(layer) else {
                continue;
            };
            let outer = &self.cumulative[layer];
            let inner = (layer > 0).then(|| &self.cumulative[layer - 1]);
            let extents = self.bbox_extents(outer);
            #[allow(clippy::cast_possible_truncation)]
            let label = layer as u32 + 1;

            for _ in 0..budget {
                let p = Point3::new(
                    rng.gen_range(-extents.x / 2.0..extents.x / 2.0),
                    rng.gen_range(-extents.y / 2.0..extents.y / 2.0),
                    rng.gen_range(-extents.z / 2.0..extents.z / 2.0),
                );
                let in_outer = self.in_box(&p, outer);
                let in_inner = inner.is_some_and(|cum| self.in_box(&p, cum));
                if in_outer && !in_inner {
                    points.push(LabeledPoint::new(p, label));
                }
            }
        }

        points
    }
}

/// Sine and cotangent of a shear angle, with an exact zero shear at π/2.
pub(crate) fn shear_terms(angle: f64, name: &str) -> PackResult<(f64, f64)> {
    if !angle.is_finite() {
        return Err(PackError::degenerate(format!(
            "shear angle {name} must be finite"
        )));
    }
    let sin = angle.sin();
    if sin <= MIN_SIN {
        return Err(PackError::degenerate(format!(
            "shear angle {name} = {angle} must have a positive sine"
        )));
    }
    let cot = if (angle - std::f64::consts::FRAC_PI_2).abs() < f64::EPSILON {
        0.0
    } else {
        angle.cos() / sin
    };
    Ok((sin, cot))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn cube(side: f64, density: f64) -> ObliqueBox {
        ObliqueBox::axis_aligned(vec![Vector3::new(side, side, side)], &[density]).unwrap()
    }

    #[test]
    fn test_construction_validation() {
        assert!(ObliqueBox::axis_aligned(vec![], &[]).is_err());
        assert!(
            ObliqueBox::axis_aligned(vec![Vector3::new(1.0, 1.0, 1.0)], &[0.1, 0.2]).is_err()
        );
        assert!(ObliqueBox::axis_aligned(vec![Vector3::new(1.0, 0.0, 1.0)], &[0.1]).is_err());
        assert!(ObliqueBox::axis_aligned(vec![Vector3::new(1.0, -1.0, 1.0)], &[0.1]).is_err());
        assert!(ObliqueBox::axis_aligned(vec![Vector3::new(1.0, 1.0, 1.0)], &[-0.1]).is_err());
    }

    #[test]
    fn test_collapsed_shear_rejected() {
        let thickness = vec![Vector3::new(1.0, 1.0, 1.0)];
        let result = ObliqueBox::new(thickness.clone(), &[0.1], 0.0, FRAC_PI_2);
        assert!(matches!(result, Err(PackError::DegenerateGeometry { .. })));

        let result = ObliqueBox::new(thickness, &[0.1], FRAC_PI_2, std::f64::consts::PI);
        assert!(matches!(result, Err(PackError::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_axis_aligned_membership_matches_box_test() {
        let two_layer = ObliqueBox::axis_aligned(
            vec![Vector3::new(2.0, 2.0, 2.0), Vector3::new(2.0, 2.0, 2.0)],
            &[1.0, 1.0],
        )
        .unwrap();

        // Inner box is 2x2x2, outer is 4x4x4.
        assert_eq!(two_layer.shell_of(&Point3::new(0.5, 0.0, 0.0)), Some(1));
        assert_eq!(two_layer.shell_of(&Point3::new(0.9, 0.9, 0.9)), Some(1));
        assert_eq!(two_layer.shell_of(&Point3::new(1.5, 0.0, 0.0)), Some(2));
        assert_eq!(two_layer.shell_of(&Point3::new(1.5, 1.9, 0.3)), Some(2));
        assert_eq!(two_layer.shell_of(&Point3::new(2.5, 0.0, 0.0)), None);
        assert_eq!(two_layer.shell_of(&Point3::new(0.0, 0.0, 2.1)), None);
    }

    #[test]
    fn test_shear_vanishes_at_z_zero() {
        let sheared = ObliqueBox::new(
            vec![Vector3::new(4.0, 4.0, 4.0)],
            &[1.0],
            FRAC_PI_4,
            FRAC_PI_2,
        )
        .unwrap();

        // At z = 0 the unsheared x-bound |x| <= 2 applies for any theta.
        assert_eq!(sheared.shell_of(&Point3::new(1.9, 0.0, 0.0)), Some(1));
        assert_eq!(sheared.shell_of(&Point3::new(2.1, 0.0, 0.0)), None);
    }

    #[test]
    fn test_sheared_bound_follows_z() {
        // theta = pi/4 gives cot(theta) = 1: the x-window at height z is
        // [z - 2, z + 2].
        let sheared = ObliqueBox::new(
            vec![Vector3::new(4.0, 4.0, 4.0)],
            &[1.0],
            FRAC_PI_4,
            FRAC_PI_2,
        )
        .unwrap();

        let z = 1.0;
        assert_eq!(sheared.shell_of(&Point3::new(2.5, 0.0, z)), Some(1));
        assert_eq!(sheared.shell_of(&Point3::new(3.1, 0.0, z)), None);
        assert_eq!(sheared.shell_of(&Point3::new(-1.1, 0.0, z)), None);
    }

    #[test]
    fn test_unsheared_cube_fills_exactly() {
        // Density 1 over a 10x10x10 cube: the bounding box equals the box,
        // so every one of the 1000 drawn points is kept.
        let box_ = cube(10.0, 1.0);
        let mut rng = StdRng::seed_from_u64(42);
        let points = box_.sample_points(&mut rng);

        assert_eq!(points.len(), 1000);
        for p in &points {
            assert!(p.position.x.abs() <= 5.0);
            assert!(p.position.y.abs() <= 5.0);
            assert!(p.position.z.abs() <= 5.0);
            assert_eq!(p.shell, 1);
        }
    }

    #[test]
    fn test_layer_volumes() {
        let two_layer = ObliqueBox::axis_aligned(
            vec![Vector3::new(2.0, 2.0, 2.0), Vector3::new(2.0, 2.0, 2.0)],
            &[1.0, 0.5],
        )
        .unwrap();
        assert_relative_eq!(two_layer.layer_volume(0).unwrap(), 8.0);
        assert_relative_eq!(two_layer.layer_volume(1).unwrap(), 56.0);
        assert!(two_layer.layer_volume(2).is_none());

        // Shear preserves the true volume.
        let sheared = ObliqueBox::new(
            vec![Vector3::new(2.0, 2.0, 2.0)],
            &[1.0],
            FRAC_PI_4,
            FRAC_PI_2,
        )
        .unwrap();
        assert_relative_eq!(
            sheared.layer_volume(0).unwrap(),
            8.0 * FRAC_PI_4.sin(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_outer_layer_points_avoid_inner_box() {
        let two_layer = ObliqueBox::axis_aligned(
            vec![Vector3::new(2.0, 2.0, 2.0), Vector3::new(2.0, 2.0, 2.0)],
            &[0.0, 1.0],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let points = two_layer.sample_points(&mut rng);

        assert!(!points.is_empty());
        for p in &points {
            assert_eq!(p.shell, 2);
            // Outside the inner 2x2x2 cube, inside the outer 4x4x4 cube.
            let max_coord = p
                .position
                .iter()
                .map(|c| c.abs())
                .fold(f64::NEG_INFINITY, f64::max);
            assert!(max_coord > 1.0);
            assert!(max_coord <= 2.0);
            assert_eq!(two_layer.shell_of(&p.position), Some(2));
        }
    }

    #[test]
    fn test_sheared_points_match_membership() {
        let sheared = ObliqueBox::new(
            vec![Vector3::new(3.0, 3.0, 3.0), Vector3::new(2.0, 2.0, 2.0)],
            &[0.5, 0.5],
            FRAC_PI_4,
            1.2,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let points = sheared.sample_points(&mut rng);

        assert!(!points.is_empty());
        for p in &points {
            assert_eq!(sheared.shell_of(&p.position), Some(p.shell));
        }
    }

    #[test]
    fn test_exclusion_radius_covers_bbox() {
        let box_ = cube(10.0, 1.0);
        // Half diagonal of a 10-cube.
        assert_relative_eq!(box_.exclusion_radius(), 75.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_sampling_reproducible_with_seed() {
        let box_ = cube(4.0, 2.0);
        let mut rng_a = StdRng::seed_from_u64(21);
        let mut rng_b = StdRng::seed_from_u64(21);
        assert_eq!(box_.sample_points(&mut rng_a), box_.sample_points(&mut rng_b));
    }
}
