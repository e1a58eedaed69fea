//! Synthetic point clouds of packed multi-shell objects.
//!
//! This crate builds labeled 3D point clouds to serve as initial
//! configurations for particle simulations. A population of layered objects
//! is drawn from per-layer log-normal thickness distributions until an
//! aggregate volume target is met, packed into a cubic domain with a minimum
//! separation between centers, and filled with uniformly sampled points
//! labeled by shell:
//!
//! - [`LayerProfile`] - Per-layer thickness statistics and point densities
//! - [`sample_population`] - Log-normal size draws against a volume budget
//! - [`place_centers`] / [`place_centers_varying`] - Separation-constrained
//!   center placement backed by a k-d tree
//! - [`Onion`] / [`ObliqueBox`] - Concentric-shell geometries with per-layer
//!   uniform point sampling
//! - [`generate`] - The whole pipeline driven by a [`GeneratorConfig`]
//!
//! # Conventions
//!
//! All lengths share one arbitrary unit; nothing in the crate assumes a
//! particular scale. The cubic domain is centered at the origin and spans
//! `[-L/2, L/2]` on each axis. Shell labels are 1-based and count from the
//! innermost layer outward, matching particle-type conventions in simulation
//! dump formats.
//!
//! # Quick Start
//!
//! ```
//! use onion_pack::{generate, GeneratorConfig, LayerProfile};
//!
//! // Two-layer onions: a hollow core and a populated outer shell.
//! let profile = LayerProfile::new(
//!     vec![2.0, 1.0], // layer thickness means, innermost first
//!     vec![0.2, 0.1], // layer thickness standard deviations
//!     vec![0.0, 0.4], // points per unit volume
//! )
//! .unwrap();
//! let config = GeneratorConfig::new(profile, 60.0, 0.03).with_seed(7);
//!
//! let cloud = generate(&config).unwrap();
//! assert!(!cloud.is_empty());
//! assert!(cloud.iter().all(|p| p.shell == 2));
//! ```
//!
//! # Lower-Level Pipeline
//!
//! The pipeline stages are usable on their own when the one-shot entry point
//! is too coarse:
//!
//! ```
//! use onion_pack::{
//!     place_centers, sample_population, DomainBounds, LayerProfile, PlacementParams,
//! };
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let profile = LayerProfile::new(vec![3.0], vec![0.5], vec![0.1]).unwrap();
//! let objects = sample_population(&profile, 2.0e4, &mut rng).unwrap();
//!
//! // Fixed-margin placement: shrink the bound by the largest outer radius
//! // and keep centers at least one diameter apart.
//! let margin = objects.iter().map(|o| o.outer_radius()).fold(0.0_f64, f64::max);
//! let bounds = DomainBounds::centered(100.0).unwrap().shrink(margin).unwrap();
//! let centers = place_centers(
//!     objects.len(),
//!     &bounds,
//!     2.0 * margin,
//!     &PlacementParams::default(),
//!     &mut rng,
//! )
//! .unwrap();
//! assert_eq!(centers.len(), objects.len());
//! ```
//!
//! # Shell Geometry
//!
//! ```
//! use onion_pack::{Onion, Point3, ShellRadii};
//!
//! let radii = ShellRadii::new(vec![5.0, 3.0]).unwrap();
//! let onion = Onion::new(&radii, &[0.2, 0.1]).unwrap();
//!
//! // Labels count from the innermost layer; a point on a layer boundary
//! // belongs to the outer layer.
//! assert_eq!(onion.shell_of(&Point3::new(2.0, 0.0, 0.0)), Some(1));
//! assert_eq!(onion.shell_of(&Point3::new(5.0, 0.0, 0.0)), Some(2));
//! assert_eq!(onion.shell_of(&Point3::new(9.0, 0.0, 0.0)), None);
//! ```
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`profile`] | Layer statistics and sampled shell radii |
//! | [`sampler`] | Log-normal population sampling against a volume budget |
//! | [`placer`] | Separation-constrained center placement |
//! | [`shell`] | Onion and oblique-box shell geometries |
//! | [`cloud`] | Labeled points and point clouds |
//! | [`config`] | Generator configuration and presets |
//! | [`assemble`] | Object assembly and the end-to-end pipeline |
//! | [`error`] | Error types |

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod assemble;
pub mod cloud;
pub mod config;
pub mod error;
pub mod placer;
pub mod profile;
pub mod sampler;
pub mod shell;

// Re-export main types at crate root for convenience
pub use assemble::{assemble, generate, generate_with_rng, ObjectSpec};
pub use cloud::{LabeledCloud, LabeledPoint};
pub use config::{ExclusionMode, GeneratorConfig, ShapeKind};
pub use error::{PackError, PackResult};
pub use placer::{place_centers, place_centers_varying, DomainBounds, PlacementParams};
pub use profile::{sphere_volume, LayerProfile, ShellRadii};
pub use sampler::{sample_population, RadiusDistribution, VolumeBudget};
pub use shell::{ObliqueBox, Onion, ShellShape};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
