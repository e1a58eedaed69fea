//! Log-normal sampling of the object population.
//!
//! The population is drawn object by object until the aggregate volume
//! reaches a target. [`RadiusDistribution`] is the pure generator (one
//! [`ShellRadii`] per draw); [`VolumeBudget`] is the stopping rule. The two
//! are composed by [`sample_population`], but each is testable on its own.

use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use tracing::debug;

use crate::error::{PackError, PackResult};
use crate::profile::{LayerProfile, ShellRadii};

/// Per-layer log-normal distributions matching a [`LayerProfile`].
///
/// The profile's arithmetic mean/std of each layer are converted to the
/// parameters of the underlying normal via
/// `sigma = sqrt(ln(1 + (std/mean)^2))` and `mu = ln(mean) - sigma^2 / 2`,
/// so draws reproduce the requested moments.
#[derive(Debug, Clone)]
pub struct RadiusDistribution {
    layers: Vec<LogNormal<f64>>,
    params: Vec<(f64, f64)>,
}

impl RadiusDistribution {
    /// Builds the distribution from a layer profile.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidDistribution`] if any layer's mean is
    /// non-positive or its std is negative, non-finite, or at least as large
    /// as the mean.
    pub fn from_profile(profile: &LayerProfile) -> PackResult<Self> {
        profile.validate()?;

        let mut layers = Vec::with_capacity(profile.layer_count());
        let mut params = Vec::with_capacity(profile.layer_count());
        for (layer, (&mean, &std)) in profile.means.iter().zip(&profile.stds).enumerate() {
            let (mu, sigma) = moments_to_params(mean, std);
            let dist = LogNormal::new(mu, sigma).map_err(|e| PackError::InvalidDistribution {
                layer,
                reason: e.to_string(),
            })?;
            layers.push(dist);
            params.push((mu, sigma));
        }

        Ok(Self { layers, params })
    }

    /// Number of layers per draw.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// The underlying normal's `(mu, sigma)` for one layer.
    #[must_use]
    pub fn layer_parameters(&self, layer: usize) -> Option<(f64, f64)> {
        self.params.get(layer).copied()
    }

    /// Draws one object's per-layer radii.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ShellRadii {
        let layers: Vec<f64> = self.layers.iter().map(|d| d.sample(rng)).collect();
        ShellRadii::from_sampled(layers)
    }
}

/// Converts a layer's arithmetic mean/std to log-normal `(mu, sigma)`.
///
/// Only valid for `mean > 0` and finite `std >= 0`; callers validate first.
fn moments_to_params(mean: f64, std: f64) -> (f64, f64) {
    let ratio = std / mean;
    let sigma_sq = (1.0 + ratio * ratio).ln();
    let mu = mean.ln() - sigma_sq / 2.0;
    (mu, sigma_sq.sqrt())
}

/// Running aggregate-volume accumulator with a stopping target.
///
/// Every offered volume is added to the running total; an offer is committed
/// only if the total stays at or below the target. The first offer that
/// pushes the total beyond the target is rejected, and the budget reports
/// itself met from then on.
#[derive(Debug, Clone, Copy)]
pub struct VolumeBudget {
    target: f64,
    running: f64,
}

impl VolumeBudget {
    /// Creates a budget for the given target volume.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidParameter`] if the target is not positive
    /// and finite.
    pub fn new(target: f64) -> PackResult<Self> {
        if !target.is_finite() || target <= 0.0 {
            return Err(PackError::invalid_parameter(format!(
                "target volume {target} must be positive and finite"
            )));
        }
        Ok(Self {
            target,
            running: 0.0,
        })
    }

    /// Offers one object's volume; returns whether the object is committed.
    pub fn offer(&mut self, volume: f64) -> bool {
        self.running += volume;
        self.running <= self.target
    }

    /// Whether the running total has reached the target.
    #[must_use]
    pub fn is_met(&self) -> bool {
        self.running >= self.target
    }

    /// The target volume.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// The running total of all offered volumes, committed or not.
    #[must_use]
    pub fn accumulated(&self) -> f64 {
        self.running
    }
}

/// Draws objects until their aggregate volume reaches `target_volume`.
///
/// Volumes are the spheres bounded by each draw's outer radius (the sum of
/// its per-layer radii). The committed population's total stays at or below
/// the target; the draw that would overshoot is discarded and ends the
/// sampling, so the running total including that draw is the first to reach
/// the target.
///
/// # Arguments
///
/// * `profile` - Layer means/stds to draw from
/// * `target_volume` - Aggregate volume to reach
/// * `rng` - Random number generator
///
/// # Errors
///
/// Returns [`PackError::InvalidDistribution`] for a bad profile and
/// [`PackError::InvalidParameter`] for a bad target.
///
/// # Example
///
/// ```
/// use onion_pack::{sample_population, LayerProfile};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let profile = LayerProfile::new(vec![10.0, 7.0], vec![1.5, 1.2], vec![0.1, 0.2]).unwrap();
/// let mut rng = StdRng::seed_from_u64(42);
/// let objects = sample_population(&profile, 1.0e6, &mut rng).unwrap();
///
/// let total: f64 = objects.iter().map(onion_pack::ShellRadii::outer_volume).sum();
/// assert!(total <= 1.0e6);
/// assert!(!objects.is_empty());
/// ```
pub fn sample_population<R: Rng>(
    profile: &LayerProfile,
    target_volume: f64,
    rng: &mut R,
) -> PackResult<Vec<ShellRadii>> {
    let distribution = RadiusDistribution::from_profile(profile)?;
    let mut budget = VolumeBudget::new(target_volume)?;
    let mut objects = Vec::new();

    loop {
        let candidate = distribution.sample(rng);
        if budget.offer(candidate.outer_volume()) {
            objects.push(candidate);
        }
        if budget.is_met() {
            break;
        }
    }

    debug!(
        objects = objects.len(),
        committed_volume = objects.iter().map(ShellRadii::outer_volume).sum::<f64>(),
        target_volume,
        "sampled object population"
    );

    Ok(objects)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_profile() -> LayerProfile {
        LayerProfile::new(
            vec![10.0, 7.0, 6.0, 5.0, 4.0],
            vec![1.5, 1.2, 0.5, 0.8, 1.0],
            vec![0.0, 0.05, 0.1, 0.03, 0.2],
        )
        .unwrap()
    }

    #[test]
    fn test_moment_conversion() {
        let profile = make_profile();
        let dist = RadiusDistribution::from_profile(&profile).unwrap();

        let (mu, sigma) = dist.layer_parameters(0).unwrap();
        let expected_sigma_sq = (1.0 + (1.5f64 / 10.0).powi(2)).ln();
        assert_relative_eq!(sigma, expected_sigma_sq.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(mu, 10.0f64.ln() - expected_sigma_sq / 2.0, epsilon = 1e-12);

        assert!(dist.layer_parameters(5).is_none());
    }

    #[test]
    fn test_zero_std_draws_exact_mean() {
        let profile = LayerProfile::new(vec![10.0, 7.0], vec![0.0, 0.0], vec![0.1, 0.1]).unwrap();
        let dist = RadiusDistribution::from_profile(&profile).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let radii = dist.sample(&mut rng);
        assert_relative_eq!(radii.as_slice()[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(radii.as_slice()[1], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let profile = LayerProfile {
            means: vec![10.0],
            stds: vec![10.0],
            densities: vec![0.1],
        };
        assert!(matches!(
            RadiusDistribution::from_profile(&profile),
            Err(PackError::InvalidDistribution { layer: 0, .. })
        ));
    }

    #[test]
    fn test_moment_convergence() {
        // Empirical mean/std over many draws must match the configured
        // moments within a few standard errors.
        let profile = make_profile();
        let dist = RadiusDistribution::from_profile(&profile).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let n = 10_000;
        let mut sums = vec![0.0; profile.layer_count()];
        let mut sq_sums = vec![0.0; profile.layer_count()];
        for _ in 0..n {
            let radii = dist.sample(&mut rng);
            for (k, &r) in radii.as_slice().iter().enumerate() {
                sums[k] += r;
                sq_sums[k] += r * r;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let n_f = n as f64;
        for k in 0..profile.layer_count() {
            let mean = sums[k] / n_f;
            let var = sq_sums[k] / n_f - mean * mean;
            let std = var.sqrt();

            let mean_tol = 6.0 * profile.stds[k] / n_f.sqrt();
            let std_tol = 6.0 * profile.stds[k] / (2.0 * n_f).sqrt();
            assert!(
                (mean - profile.means[k]).abs() < mean_tol,
                "layer {k}: empirical mean {mean} vs target {}",
                profile.means[k]
            );
            assert!(
                (std - profile.stds[k]).abs() < std_tol,
                "layer {k}: empirical std {std} vs target {}",
                profile.stds[k]
            );
        }
    }

    #[test]
    fn test_volume_budget_commits_until_target() {
        let mut budget = VolumeBudget::new(7.0).unwrap();
        assert!(budget.offer(3.0));
        assert!(!budget.is_met());
        assert!(budget.offer(3.0));
        assert!(!budget.is_met());

        // Third offer pushes past the target: rejected, budget met.
        assert!(!budget.offer(3.0));
        assert!(budget.is_met());
        assert_relative_eq!(budget.accumulated(), 9.0);
    }

    #[test]
    fn test_volume_budget_exact_hit() {
        let mut budget = VolumeBudget::new(6.0).unwrap();
        assert!(budget.offer(3.0));
        assert!(budget.offer(3.0));
        assert!(budget.is_met());
    }

    #[test]
    fn test_volume_budget_rejects_bad_target() {
        assert!(VolumeBudget::new(0.0).is_err());
        assert!(VolumeBudget::new(-1.0).is_err());
        assert!(VolumeBudget::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_population_deterministic_count() {
        // With zero stds every object has exactly the same volume, so the
        // committed count is the integer part of target / volume.
        let profile = LayerProfile::new(vec![2.0], vec![0.0], vec![1.0]).unwrap();
        let volume = crate::profile::sphere_volume(2.0);
        let mut rng = StdRng::seed_from_u64(0);

        let objects = sample_population(&profile, 3.5 * volume, &mut rng).unwrap();
        assert_eq!(objects.len(), 3);
    }

    #[test]
    fn test_population_total_at_or_below_target() {
        let profile = make_profile();
        let target = 1.0e7;
        let mut rng = StdRng::seed_from_u64(42);

        let objects = sample_population(&profile, target, &mut rng).unwrap();
        let total: f64 = objects.iter().map(ShellRadii::outer_volume).sum();
        assert!(total <= target);
        assert!(!objects.is_empty());
    }

    #[test]
    fn test_population_reproducible_with_seed() {
        let profile = make_profile();
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);

        let a = sample_population(&profile, 1.0e6, &mut rng_a).unwrap();
        let b = sample_population(&profile, 1.0e6, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }
}
