//! Output writers for packed multi-shell point clouds.
//!
//! This crate serializes the [`LabeledCloud`] produced by `onion-pack` into
//! the two plain-text artifacts downstream tooling consumes:
//!
//! - [`save_coords`] - whitespace table with an `X Y Z shell` header
//! - [`save_dump`] - LAMMPS-style dump snapshot (OVITO-compatible)
//! - [`write_cloud`] - extension-based dispatch over both
//!
//! A matching [`load_coords`] reads coordinate tables back, including the
//! historical variant that stored shell labels as floats.
//!
//! # Example
//!
//! ```no_run
//! use onion_dump::write_cloud;
//! use onion_pack::{generate, GeneratorConfig};
//!
//! let config = GeneratorConfig::reference();
//! let cloud = generate(&config).unwrap();
//! write_cloud(&cloud, config.domain_length, "onion.dump").unwrap();
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod writer;

pub use error::{DumpError, DumpResult};
pub use writer::{load_coords, save_coords, save_dump, write_cloud, DumpFormat};

// Re-export the cloud types for convenience
pub use onion_pack::{LabeledCloud, LabeledPoint};
