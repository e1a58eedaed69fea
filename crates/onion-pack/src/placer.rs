//! Separation-constrained center placement.
//!
//! Centers are accepted by batched rejection sampling against a k-d tree of
//! previously accepted centers. The tree stores positions only; per-object
//! exclusion radii live in a parallel arena keyed by the same ids, and the
//! exact distance-minus-radii condition is re-verified against the stored
//! radii whenever radii vary per object.
//!
//! Each batch draws its candidates, runs all nearest-neighbor queries against
//! the read-only tree (in parallel), and only then inserts the survivors, so
//! the tree is never written while queried. A candidate budget bounds the
//! loop; an infeasible request fails with
//! [`PackingInfeasible`](crate::PackError::PackingInfeasible) instead of
//! spinning forever.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{PackError, PackResult};

/// A cubic placement region, the interval `[min, max]` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainBounds {
    min: f64,
    max: f64,
}

impl DomainBounds {
    /// Creates bounds from the per-axis interval `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidParameter`] if the interval is empty or
    /// not finite.
    pub fn new(min: f64, max: f64) -> PackResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(PackError::invalid_parameter(format!(
                "bounds [{min}, {max}] must be a finite non-empty interval"
            )));
        }
        Ok(Self { min, max })
    }

    /// Creates bounds centered on the origin with the given side length.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidParameter`] if the length is not positive
    /// and finite.
    pub fn centered(length: f64) -> PackResult<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(PackError::invalid_parameter(format!(
                "domain length {length} must be positive and finite"
            )));
        }
        Self::new(-length / 2.0, length / 2.0)
    }

    /// Lower bound of each axis.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound of each axis.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Side length of the region.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Bounds pulled in by `margin` on every side, so that a sphere of
    /// radius `margin` centered inside the result stays inside `self`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidParameter`] if the margin is negative,
    /// non-finite, or leaves an empty interval.
    pub fn shrink(&self, margin: f64) -> PackResult<Self> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(PackError::invalid_parameter(format!(
                "shrink margin {margin} must be non-negative and finite"
            )));
        }
        if self.min + margin >= self.max - margin {
            return Err(PackError::invalid_parameter(format!(
                "margin {margin} leaves no room in bounds [{}, {}]",
                self.min, self.max
            )));
        }
        Self::new(self.min + margin, self.max - margin)
    }

    /// Whether the point lies inside the region (inclusive).
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.iter().all(|&c| c >= self.min && c <= self.max)
    }

    /// Draws a uniform random point inside the region.
    pub fn sample_point<R: Rng>(&self, rng: &mut R) -> Point3<f64> {
        Point3::new(
            rng.gen_range(self.min..self.max),
            rng.gen_range(self.min..self.max),
            rng.gen_range(self.min..self.max),
        )
    }
}

/// Tuning knobs for the placement loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementParams {
    /// Candidates drawn per batch.
    pub batch_size: usize,
    /// Total candidate budget; exceeding it fails with
    /// [`PackError::PackingInfeasible`].
    pub max_attempts: usize,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_attempts: 1_000_000,
        }
    }
}

impl PlacementParams {
    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the candidate budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidParameter`] if the batch size or budget
    /// is zero.
    pub fn validate(&self) -> PackResult<()> {
        if self.batch_size == 0 {
            return Err(PackError::invalid_parameter("batch size must be non-zero"));
        }
        if self.max_attempts == 0 {
            return Err(PackError::invalid_parameter(
                "candidate budget must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Accepted centers: positions in a k-d tree, radii in a parallel arena
/// sharing the tree's ids.
struct CenterArena {
    tree: KdTree<f64, 3>,
    radii: Vec<f64>,
    max_radius: f64,
}

impl CenterArena {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: KdTree::new(),
            radii: Vec::with_capacity(capacity),
            max_radius: 0.0,
        }
    }

    fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    fn insert(&mut self, position: &Point3<f64>, radius: f64) {
        #[allow(clippy::cast_possible_truncation)]
        let id = self.radii.len() as u64;
        self.tree.add(&[position.x, position.y, position.z], id);
        self.radii.push(radius);
        self.max_radius = self.max_radius.max(radius);
    }

    /// Squared distance to the nearest accepted center. Caller must ensure
    /// the arena is non-empty.
    fn nearest_sq(&self, point: &Point3<f64>) -> f64 {
        self.tree
            .nearest_one::<SquaredEuclidean>(&[point.x, point.y, point.z])
            .distance
    }

    /// Whether a candidate with the given exclusion radius would violate the
    /// separation invariant against any stored center. The tree prunes by
    /// position; the exact condition is checked against each stored radius.
    fn violates(&self, point: &Point3<f64>, radius: f64) -> bool {
        if self.is_empty() {
            return false;
        }
        let reach = radius + self.max_radius;
        let neighbors = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[point.x, point.y, point.z], reach * reach);
        neighbors.iter().any(|n| {
            #[allow(clippy::cast_possible_truncation)]
            let required = radius + self.radii[n.item as usize];
            n.distance < required * required
        })
    }
}

/// Places `count` centers inside `bounds` with a fixed minimum pairwise
/// distance.
///
/// The bound is taken as already shrunk for the objects being placed (the
/// caller knows the object radius that motivated the margin). Accepted
/// centers are exact: every pair in the result is at least `min_distance`
/// apart, including pairs accepted within the same batch.
///
/// # Arguments
///
/// * `count` - Number of centers to place
/// * `bounds` - Placement region, one interval for all axes
/// * `min_distance` - Minimum distance between any two centers
/// * `params` - Batch size and candidate budget
/// * `rng` - Random number generator
///
/// # Errors
///
/// Returns [`PackError::PackingInfeasible`] if the budget runs out first,
/// with the count placed so far, and [`PackError::InvalidParameter`] for
/// invalid parameters.
///
/// # Example
///
/// ```
/// use onion_pack::{place_centers, DomainBounds, PlacementParams};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let bounds = DomainBounds::new(-50.0, 50.0).unwrap();
/// let mut rng = StdRng::seed_from_u64(42);
/// let centers = place_centers(20, &bounds, 10.0, &PlacementParams::default(), &mut rng).unwrap();
///
/// assert_eq!(centers.len(), 20);
/// for (i, a) in centers.iter().enumerate() {
///     for b in &centers[i + 1..] {
///         assert!((a - b).norm() >= 10.0);
///     }
/// }
/// ```
pub fn place_centers<R: Rng>(
    count: usize,
    bounds: &DomainBounds,
    min_distance: f64,
    params: &PlacementParams,
    rng: &mut R,
) -> PackResult<Vec<Point3<f64>>> {
    params.validate()?;
    if !min_distance.is_finite() || min_distance < 0.0 {
        return Err(PackError::invalid_parameter(format!(
            "minimum distance {min_distance} must be non-negative and finite"
        )));
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let min_sq = min_distance * min_distance;
    let mut arena = CenterArena::with_capacity(count);
    let mut accepted: Vec<Point3<f64>> = Vec::with_capacity(count);
    let mut attempts = 0usize;
    let mut warned = false;

    while accepted.len() < count {
        if attempts >= params.max_attempts {
            return Err(PackError::PackingInfeasible {
                requested: count,
                placed: accepted.len(),
                attempts,
            });
        }
        if !warned && attempts >= params.max_attempts - params.max_attempts / 10 {
            warn!(
                attempts,
                max_attempts = params.max_attempts,
                placed = accepted.len(),
                requested = count,
                "placement budget nearly exhausted"
            );
            warned = true;
        }

        let batch_size = params
            .batch_size
            .min(count - accepted.len())
            .min(params.max_attempts - attempts);
        let candidates: Vec<Point3<f64>> =
            (0..batch_size).map(|_| bounds.sample_point(rng)).collect();
        attempts += batch_size;

        // All queries run against the tree state left by previous batches;
        // inserts happen after the whole batch is decided.
        let survivors: Vec<Point3<f64>> = if arena.is_empty() {
            candidates
        } else {
            candidates
                .par_iter()
                .filter(|p| arena.nearest_sq(p) >= min_sq)
                .copied()
                .collect()
        };

        // Survivors were only checked against earlier batches; enforce the
        // invariant inside the batch as well.
        let mut batch_accepted: Vec<Point3<f64>> = Vec::new();
        'candidate: for p in survivors {
            for q in &batch_accepted {
                if (p - q).norm_squared() < min_sq {
                    continue 'candidate;
                }
            }
            batch_accepted.push(p);
            if accepted.len() + batch_accepted.len() == count {
                break;
            }
        }

        for p in &batch_accepted {
            arena.insert(p, min_distance / 2.0);
        }
        accepted.extend(batch_accepted);

        debug!(
            placed = accepted.len(),
            requested = count,
            attempts,
            "placement batch complete"
        );
    }

    Ok(accepted)
}

/// Places one center per entry of `radii` inside `bounds`, separating every
/// pair `i != j` by at least `radii[i] + radii[j]`.
///
/// Objects are placed in input order; the result is index-aligned with
/// `radii`. Each object draws inside the bound shrunk by its own radius, so
/// its exclusion sphere stays inside the domain.
///
/// # Errors
///
/// Returns [`PackError::PackingInfeasible`] if the candidate budget runs out,
/// [`PackError::DegenerateGeometry`] for a non-positive radius, and
/// [`PackError::InvalidParameter`] if an object cannot fit the bounds at all.
pub fn place_centers_varying<R: Rng>(
    radii: &[f64],
    bounds: &DomainBounds,
    params: &PlacementParams,
    rng: &mut R,
) -> PackResult<Vec<Point3<f64>>> {
    params.validate()?;
    for (i, &r) in radii.iter().enumerate() {
        if !r.is_finite() || r <= 0.0 {
            return Err(PackError::degenerate(format!(
                "object {i} exclusion radius {r} must be positive and finite"
            )));
        }
    }

    let mut arena = CenterArena::with_capacity(radii.len());
    let mut centers: Vec<Point3<f64>> = Vec::with_capacity(radii.len());
    let mut attempts = 0usize;
    let mut warned = false;

    for &radius in radii {
        let shrunk = bounds.shrink(radius)?;

        let center = loop {
            if attempts >= params.max_attempts {
                return Err(PackError::PackingInfeasible {
                    requested: radii.len(),
                    placed: centers.len(),
                    attempts,
                });
            }
            if !warned && attempts >= params.max_attempts - params.max_attempts / 10 {
                warn!(
                    attempts,
                    max_attempts = params.max_attempts,
                    placed = centers.len(),
                    requested = radii.len(),
                    "placement budget nearly exhausted"
                );
                warned = true;
            }

            let batch_size = params.batch_size.min(params.max_attempts - attempts);
            let candidates: Vec<Point3<f64>> =
                (0..batch_size).map(|_| shrunk.sample_point(rng)).collect();
            attempts += batch_size;

            let verdicts: Vec<bool> = candidates
                .par_iter()
                .map(|p| !arena.violates(p, radius))
                .collect();
            if let Some(first) = verdicts.iter().position(|&ok| ok) {
                break candidates[first];
            }
        };

        arena.insert(&center, radius);
        centers.push(center);
    }

    debug!(
        placed = centers.len(),
        attempts, "variable-radius placement complete"
    );

    Ok(centers)
}
