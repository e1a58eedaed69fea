//! Labeled point cloud containers.

use nalgebra::{Point3, Vector3};

/// A single point with its shell label.
///
/// Labels are 1-based shell indices local to the emitting object; label 1 is
/// the innermost layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledPoint {
    /// Position, local to the object during generation, global after
    /// assembly.
    pub position: Point3<f64>,
    /// 1-based shell label.
    pub shell: u32,
}

impl LabeledPoint {
    /// Creates a labeled point.
    #[must_use]
    pub const fn new(position: Point3<f64>, shell: u32) -> Self {
        Self { position, shell }
    }

    /// Creates a labeled point from raw coordinates.
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64, shell: u32) -> Self {
        Self::new(Point3::new(x, y, z), shell)
    }

    /// Returns the point translated by the given offset.
    #[must_use]
    pub fn translated(self, offset: Vector3<f64>) -> Self {
        Self {
            position: self.position + offset,
            shell: self.shell,
        }
    }
}

/// An append-only sequence of labeled points.
///
/// The terminal artifact of the assembly pipeline, handed to a writer in
/// emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledCloud {
    /// Points in emission order.
    pub points: Vec<LabeledPoint>,
}

impl LabeledCloud {
    /// Creates an empty cloud.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates an empty cloud with reserved capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a single point.
    pub fn push(&mut self, point: LabeledPoint) {
        self.points.push(point);
    }

    /// Appends an object's local points translated into the global frame.
    pub fn extend_translated<I>(&mut self, local: I, center: Point3<f64>)
    where
        I: IntoIterator<Item = LabeledPoint>,
    {
        let offset = center.coords;
        self.points
            .extend(local.into_iter().map(|p| p.translated(offset)));
    }

    /// Iterates over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, LabeledPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a LabeledCloud {
    type Item = &'a LabeledPoint;
    type IntoIter = std::slice::Iter<'a, LabeledPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_labeled_point_translated() {
        let p = LabeledPoint::from_coords(1.0, 2.0, 3.0, 4);
        let moved = p.translated(Vector3::new(10.0, 0.0, -3.0));
        assert_relative_eq!(moved.position.x, 11.0);
        assert_relative_eq!(moved.position.y, 2.0);
        assert_relative_eq!(moved.position.z, 0.0);
        assert_eq!(moved.shell, 4);
    }

    #[test]
    fn test_cloud_push_and_len() {
        let mut cloud = LabeledCloud::new();
        assert!(cloud.is_empty());

        cloud.push(LabeledPoint::from_coords(0.0, 0.0, 0.0, 1));
        cloud.push(LabeledPoint::from_coords(1.0, 0.0, 0.0, 2));
        assert_eq!(cloud.len(), 2);
        assert!(!cloud.is_empty());
    }

    #[test]
    fn test_extend_translated() {
        let mut cloud = LabeledCloud::new();
        let local = vec![
            LabeledPoint::from_coords(1.0, 0.0, 0.0, 1),
            LabeledPoint::from_coords(0.0, 1.0, 0.0, 2),
        ];
        cloud.extend_translated(local, Point3::new(100.0, 200.0, 300.0));

        assert_eq!(cloud.len(), 2);
        assert_relative_eq!(cloud.points[0].position.x, 101.0);
        assert_relative_eq!(cloud.points[0].position.y, 200.0);
        assert_relative_eq!(cloud.points[1].position.y, 201.0);
        assert_eq!(cloud.points[0].shell, 1);
        assert_eq!(cloud.points[1].shell, 2);
    }

    #[test]
    fn test_cloud_iter_order() {
        let mut cloud = LabeledCloud::with_capacity(3);
        for i in 0..3u32 {
            cloud.push(LabeledPoint::from_coords(f64::from(i), 0.0, 0.0, i + 1));
        }
        let shells: Vec<u32> = cloud.iter().map(|p| p.shell).collect();
        assert_eq!(shells, vec![1, 2, 3]);
    }
}
