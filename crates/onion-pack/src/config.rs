//! Configuration for the one-shot generation pipeline.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PackError, PackResult};
use crate::placer::{DomainBounds, PlacementParams};
use crate::profile::LayerProfile;
use crate::shell::oblique_shear_terms;

/// Which shell geometry the pipeline builds for each sampled object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    /// Concentric spherical shells.
    Onion,
    /// Nested oblique rectangular shells with isotropic per-layer thickness.
    ObliqueBox,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Onion => write!(f, "onion"),
            Self::ObliqueBox => write!(f, "oblique-box"),
        }
    }
}

/// How center separation margins are derived from the sampled objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExclusionMode {
    /// One fixed margin of twice the largest exclusion radius, placed in
    /// the bound shrunk by that radius.
    MaxRadius,
    /// Per-object margins of the two objects' summed exclusion radii.
    PerObject,
}

impl fmt::Display for ExclusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxRadius => write!(f, "max-radius"),
            Self::PerObject => write!(f, "per-object"),
        }
    }
}

/// Everything the generation pipeline needs, validated up front.
///
/// # Example
///
/// ```
/// use onion_pack::GeneratorConfig;
///
/// let config = GeneratorConfig::reference().with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.target_volume(), 0.15 * 800.0f64.powi(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Per-layer means, stds, and densities.
    pub profile: LayerProfile,
    /// Side length of the cubic domain, centered on the origin.
    pub domain_length: f64,
    /// Target ratio of aggregate object volume to domain volume, in (0, 1].
    pub volume_fraction: f64,
    /// Shell geometry built for each object.
    pub shape: ShapeKind,
    /// Shear angle of the x-faces (oblique boxes only), default π/2.
    pub theta: f64,
    /// Shear angle of the y-faces (oblique boxes only), default π/2.
    pub phi: f64,
    /// How placement margins are derived.
    pub exclusion: ExclusionMode,
    /// Batch size and candidate budget for placement.
    pub placement: PlacementParams,
    /// Seed for reproducible runs; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    /// Creates a config with the given population targets and defaults
    /// everywhere else: onions, no shear, fixed-margin placement, no seed.
    #[must_use]
    pub fn new(profile: LayerProfile, domain_length: f64, volume_fraction: f64) -> Self {
        Self {
            profile,
            domain_length,
            volume_fraction,
            shape: ShapeKind::Onion,
            theta: std::f64::consts::FRAC_PI_2,
            phi: std::f64::consts::FRAC_PI_2,
            exclusion: ExclusionMode::MaxRadius,
            placement: PlacementParams::default(),
            seed: None,
        }
    }

    /// The five-layer onion population the crate is validated against:
    /// an 800-unit domain filled to 15% volume fraction.
    #[must_use]
    pub fn reference() -> Self {
        let profile = LayerProfile {
            means: vec![10.0, 7.0, 6.0, 5.0, 4.0],
            stds: vec![1.5, 1.2, 0.5, 0.8, 1.0],
            densities: vec![0.0, 0.05, 0.1, 0.03, 0.2],
        };
        Self::new(profile, 800.0, 0.15)
    }

    /// Sets the shell geometry kind.
    #[must_use]
    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.shape = shape;
        self
    }

    /// Sets both shear angles.
    #[must_use]
    pub fn with_shear(mut self, theta: f64, phi: f64) -> Self {
        self.theta = theta;
        self.phi = phi;
        self
    }

    /// Sets the exclusion mode.
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: ExclusionMode) -> Self {
        self.exclusion = exclusion;
        self
    }

    /// Sets the placement parameters.
    #[must_use]
    pub fn with_placement(mut self, placement: PlacementParams) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The aggregate object volume the sampler must reach.
    #[must_use]
    pub fn target_volume(&self) -> f64 {
        self.volume_fraction * self.domain_length.powi(3)
    }

    /// The domain as placement bounds, centered on the origin.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidParameter`] for a non-positive length.
    pub fn bounds(&self) -> PackResult<DomainBounds> {
        DomainBounds::centered(self.domain_length)
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the error of the first violated invariant: profile, domain
    /// length, volume fraction, shear angles (oblique boxes only), or
    /// placement parameters.
    pub fn validate(&self) -> PackResult<()> {
        self.profile.validate()?;
        if !self.domain_length.is_finite() || self.domain_length <= 0.0 {
            return Err(PackError::invalid_parameter(format!(
                "domain length {} must be positive and finite",
                self.domain_length
            )));
        }
        if !self.volume_fraction.is_finite()
            || self.volume_fraction <= 0.0
            || self.volume_fraction > 1.0
        {
            return Err(PackError::invalid_parameter(format!(
                "volume fraction {} must be in (0, 1]",
                self.volume_fraction
            )));
        }
        if self.shape == ShapeKind::ObliqueBox {
            oblique_shear_terms(self.theta, "theta")?;
            oblique_shear_terms(self.phi, "phi")?;
        }
        self.placement.validate()?;
        Ok(())
    }
}
