//! Point cloud file writers.
//!
//! Supports two plain-text outputs:
//! - **Coords** - whitespace-separated table with an `X Y Z shell` header
//! - **LAMMPS dump** - snapshot with the fixed nine-line dump header, readable
//!   by OVITO and other LAMMPS-aware tooling
//!
//! # Example
//!
//! ```no_run
//! use onion_dump::write_cloud;
//! use onion_pack::LabeledCloud;
//!
//! let cloud = LabeledCloud::new();
//! write_cloud(&cloud, 800.0, "onion.dump").unwrap();
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{DumpError, DumpResult};
use onion_pack::{LabeledCloud, LabeledPoint};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// Coordinate table with an `X Y Z shell` header line.
    Coords,
    /// LAMMPS-style dump snapshot.
    LammpsDump,
}

impl DumpFormat {
    /// Detects the format from a file extension.
    ///
    /// # Example
    ///
    /// ```
    /// use onion_dump::DumpFormat;
    ///
    /// assert_eq!(DumpFormat::from_extension("txt"), Some(DumpFormat::Coords));
    /// assert_eq!(DumpFormat::from_extension("dump"), Some(DumpFormat::LammpsDump));
    /// assert_eq!(DumpFormat::from_extension("obj"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "xyz" => Some(Self::Coords),
            "dump" | "lammpstrj" => Some(Self::LammpsDump),
            _ => None,
        }
    }

    /// Detects the format from a file path.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Writes a cloud to a path, picking the format from the extension.
///
/// `box_length` is the periodic box side used by the dump header; the
/// coordinate table ignores it.
///
/// # Errors
///
/// Returns [`DumpError::UnsupportedFormat`] for an unrecognized extension, or
/// an I/O error if the file cannot be written.
pub fn write_cloud<P: AsRef<Path>>(
    cloud: &LabeledCloud,
    box_length: f64,
    path: P,
) -> DumpResult<()> {
    let path = path.as_ref();
    let format = DumpFormat::from_path(path).ok_or_else(|| DumpError::UnsupportedFormat {
        format: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    })?;

    match format {
        DumpFormat::Coords => save_coords(cloud, path),
        DumpFormat::LammpsDump => save_dump(cloud, box_length, path),
    }
}

/// Writes the `X Y Z shell` coordinate table.
///
/// Coordinates carry six decimal places; the shell label is an integer.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_coords<P: AsRef<Path>>(cloud: &LabeledCloud, path: P) -> DumpResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "X Y Z shell")?;
    for point in &cloud.points {
        writeln!(
            writer,
            "{:.6} {:.6} {:.6} {}",
            point.position.x, point.position.y, point.position.z, point.shell
        )?;
    }

    info!(
        path = %path.display(),
        points = cloud.len(),
        "wrote coordinate table"
    );
    Ok(())
}

/// Writes a LAMMPS-style dump snapshot.
///
/// The header is the fixed nine-line form: timestep, atom count, periodic box
/// bounds at `±box_length/2` on each axis, and the `id type x y z` column
/// line. Atom ids are 1-based in cloud order and the type column carries the
/// shell label.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_dump<P: AsRef<Path>>(
    cloud: &LabeledCloud,
    box_length: f64,
    path: P,
) -> DumpResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let half = box_length / 2.0;

    writeln!(writer, "ITEM: TIMESTEP")?;
    writeln!(writer, "0")?;
    writeln!(writer, "ITEM: NUMBER OF ATOMS")?;
    writeln!(writer, "{}", cloud.len())?;
    writeln!(writer, "ITEM: BOX BOUNDS pp pp pp")?;
    for _ in 0..3 {
        writeln!(writer, "{} {}", -half, half)?;
    }
    writeln!(writer, "ITEM: ATOMS id type x y z")?;

    for (id, point) in cloud.iter().enumerate() {
        writeln!(
            writer,
            "{} {} {:.6} {:.6} {:.6}",
            id + 1,
            point.shell,
            point.position.x,
            point.position.y,
            point.position.z
        )?;
    }

    info!(
        path = %path.display(),
        points = cloud.len(),
        box_length,
        "wrote dump snapshot"
    );
    Ok(())
}

/// Loads a coordinate table written by [`save_coords`].
///
/// Header, comment, and empty lines are skipped. Shell labels written as
/// floats (the historical table form) round to the nearest integer.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a data row is malformed.
pub fn load_coords<P: AsRef<Path>>(path: P) -> DumpResult<LabeledCloud> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut cloud = LabeledCloud::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        // Skip empty lines, comments, and the column-header line.
        if line.is_empty() || line.starts_with('#') || line.starts_with(|c: char| c.is_alphabetic())
        {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(DumpError::invalid_data(format!(
                "expected 4 columns, got {}: {line}",
                parts.len()
            )));
        }

        let mut values = [0.0_f64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.parse::<f64>().map_err(|_| {
                DumpError::invalid_data(format!("unparseable value: {part}"))
            })?;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let shell = values[3].round().max(0.0) as u32;
        cloud.push(LabeledPoint::from_coords(
            values[0], values[1], values[2], shell,
        ));
    }

    Ok(cloud)
}
