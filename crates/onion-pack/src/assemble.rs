//! Object assembly and the one-shot generation pipeline.
//!
//! [`assemble`] turns placed objects into one global point cloud.
//! [`generate`] runs the whole flow from a [`GeneratorConfig`]: sample the
//! population, build one shell geometry per object, place centers, sample
//! and translate every object's points.

use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::cloud::LabeledCloud;
use crate::config::{ExclusionMode, GeneratorConfig, ShapeKind};
use crate::error::PackResult;
use crate::placer::{place_centers, place_centers_varying};
use crate::sampler::sample_population;
use crate::shell::{ObliqueBox, Onion, ShellShape};

/// One object ready for assembly: its shell geometry and its center.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSpec {
    /// The object's shell geometry.
    pub shape: ShellShape,
    /// The object's center in the global frame.
    pub center: Point3<f64>,
}

impl ObjectSpec {
    /// Creates an object spec.
    #[must_use]
    pub const fn new(shape: ShellShape, center: Point3<f64>) -> Self {
        Self { shape, center }
    }
}

/// Samples every object's points and concatenates them, translated to each
/// object's center, in object order.
#[must_use]
pub fn assemble<R: Rng>(objects: &[ObjectSpec], rng: &mut R) -> LabeledCloud {
    let mut cloud = LabeledCloud::new();
    for (index, object) in objects.iter().enumerate() {
        let local = object.shape.sample_points(rng);
        debug!(object = index, points = local.len(), "sampled object points");
        cloud.extend_translated(local, object.center);
    }
    info!(
        objects = objects.len(),
        points = cloud.len(),
        "assembled point cloud"
    );
    cloud
}

/// Runs the full pipeline with an RNG built from the config's seed.
///
/// # Errors
///
/// Propagates the first failure: invalid config, invalid distribution,
/// degenerate geometry, or an exhausted placement budget.
///
/// # Example
///
/// ```
/// use onion_pack::{generate, GeneratorConfig, LayerProfile};
///
/// let profile = LayerProfile::new(vec![2.0, 1.0], vec![0.0, 0.0], vec![0.5, 0.5]).unwrap();
/// let config = GeneratorConfig::new(profile, 50.0, 0.02).with_seed(42);
/// let cloud = generate(&config).unwrap();
/// assert!(!cloud.is_empty());
/// ```
pub fn generate(config: &GeneratorConfig) -> PackResult<LabeledCloud> {
    match config.seed {
        Some(seed) => generate_with_rng(config, &mut StdRng::seed_from_u64(seed)),
        None => generate_with_rng(config, &mut rand::thread_rng()),
    }
}

/// Runs the full pipeline with a caller-supplied RNG.
///
/// # Errors
///
/// See [`generate`].
pub fn generate_with_rng<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> PackResult<LabeledCloud> {
    config.validate()?;

    let target = config.target_volume();
    let population = sample_population(&config.profile, target, rng)?;
    info!(
        objects = population.len(),
        target_volume = target,
        shape = %config.shape,
        exclusion = %config.exclusion,
        "population sampled"
    );

    let mut shapes: Vec<ShellShape> = Vec::with_capacity(population.len());
    for radii in &population {
        let shape = match config.shape {
            ShapeKind::Onion => Onion::new(radii, &config.profile.densities)?.into(),
            ShapeKind::ObliqueBox => {
                ObliqueBox::isotropic(radii, &config.profile.densities, config.theta, config.phi)?
                    .into()
            }
        };
        shapes.push(shape);
    }
    let radii: Vec<f64> = shapes.iter().map(ShellShape::exclusion_radius).collect();

    let bounds = config.bounds()?;
    let centers = match config.exclusion {
        ExclusionMode::MaxRadius => {
            let max_radius = radii.iter().fold(0.0f64, |acc, &r| acc.max(r));
            let shrunk = bounds.shrink(max_radius)?;
            place_centers(
                shapes.len(),
                &shrunk,
                2.0 * max_radius,
                &config.placement,
                rng,
            )?
        }
        ExclusionMode::PerObject => place_centers_varying(&radii, &bounds, &config.placement, rng)?,
    };

    let objects: Vec<ObjectSpec> = shapes
        .into_iter()
        .zip(centers)
        .map(|(shape, center)| ObjectSpec::new(shape, center))
        .collect();

    Ok(assemble(&objects, rng))
}
