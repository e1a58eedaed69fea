//! Shell geometries: which shell a point falls in, and per-shell sampling.
//!
//! Both variants answer the same two questions through [`ShellShape`]:
//! `shell_of` maps a point (local to the object's center) to its 1-based
//! shell label, and `sample_points` emits each layer's density-governed
//! point budget. [`Onion`] nests spherical annuli; [`ObliqueBox`] nests
//! sheared rectangular shells.

mod oblique;
mod onion;

pub use oblique::ObliqueBox;
pub(crate) use oblique::shear_terms as oblique_shear_terms;
pub use onion::Onion;

use nalgebra::Point3;
use rand::Rng;

use crate::cloud::LabeledPoint;

/// One object's shell geometry, selected per object.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellShape {
    /// Concentric spherical shells.
    Onion(Onion),
    /// Nested oblique rectangular shells.
    Oblique(ObliqueBox),
}

impl ShellShape {
    /// The 1-based shell label of a point local to the object's center, or
    /// `None` outside the object.
    #[must_use]
    pub fn shell_of(&self, point: &Point3<f64>) -> Option<u32> {
        match self {
            Self::Onion(onion) => onion.shell_of(point),
            Self::Oblique(oblique) => oblique.shell_of(point),
        }
    }

    /// Samples every layer's point budget, local to the object's center.
    pub fn sample_points<R: Rng>(&self, rng: &mut R) -> Vec<LabeledPoint> {
        match self {
            Self::Onion(onion) => onion.sample_points(rng),
            Self::Oblique(oblique) => oblique.sample_points(rng),
        }
    }

    /// Minimum center-to-center distance this object requires from any
    /// other object's surface-touching sphere.
    #[must_use]
    pub fn exclusion_radius(&self) -> f64 {
        match self {
            Self::Onion(onion) => onion.outer_radius(),
            Self::Oblique(oblique) => oblique.exclusion_radius(),
        }
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        match self {
            Self::Onion(onion) => onion.layer_count(),
            Self::Oblique(oblique) => oblique.layer_count(),
        }
    }
}

impl From<Onion> for ShellShape {
    fn from(onion: Onion) -> Self {
        Self::Onion(onion)
    }
}

impl From<ObliqueBox> for ShellShape {
    fn from(oblique: ObliqueBox) -> Self {
        Self::Oblique(oblique)
    }
}
