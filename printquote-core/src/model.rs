//! Parsed model geometry: vertex set, bounding dimensions and enclosed volume

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::{Mesh, Triangle, Vertex};

/// Round to a fixed number of decimal places, halves away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Bounding box spans along each axis, in millimeters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Dimensions {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned extremes of a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    /// Compute the extremes of a point set, `None` when it is empty.
    pub fn of(points: &[Point3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            bounds.min = bounds.min.inf(p);
            bounds.max = bounds.max.sup(p);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Spans rounded to two decimals.
    pub fn dimensions(&self) -> Dimensions {
        let span = self.max - self.min;
        Dimensions::new(round_to(span.x, 2), round_to(span.y, 2), round_to(span.z, 2))
    }
}

/// Sum of `v1 · (v2 × v3) / 6` over consecutive vertex triples.
///
/// Trailing points that do not complete a triangle are ignored.
pub fn signed_volume(points: &[Point3<f64>]) -> f64 {
    points
        .chunks_exact(3)
        .map(|t| t[0].coords.dot(&t[1].coords.cross(&t[2].coords)) / 6.0)
        .sum()
}

/// Flattened triangle list, three points per triangle in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexSet {
    points: Vec<Point3<f64>>,
}

impl VertexSet {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.points.len() / 3
    }

    /// Iterate over triangles as point triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.points.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Translate every point by `offset`.
    fn translate(&mut self, offset: &Vector3<f64>) {
        for p in &mut self.points {
            *p += *offset;
        }
    }

    /// Largest distance of any point from the origin.
    pub fn bounding_radius(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, f64::max)
    }

    /// Build a renderable mesh, normals taken from each triangle's winding.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::with_capacity(self.triangle_count());
        for [a, b, c] in self.triangles() {
            let normal = Triangle::face_normal(&a.cast(), &b.cast(), &c.cast());
            let vertex = |p: Point3<f64>| Vertex::from_point(p.cast(), normal);
            mesh.add_triangle(Triangle::new(vertex(a), vertex(b), vertex(c)));
        }
        mesh
    }
}

/// Geometry summary of a parsed model, detached from its vertices
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub dimensions: Dimensions,
    /// Enclosed volume in cubic millimeters, rounded to an integer
    pub volume: f64,
    pub triangle_count: usize,
}

/// Result of a successful parse: centered vertices, dimensions and volume
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedModel {
    vertices: VertexSet,
    summary: ModelSummary,
}

impl ParsedModel {
    /// Derive dimensions and volume from a flat point list, then center it.
    ///
    /// Dimensions come from the un-centered extremes; the volume is
    /// translation invariant but is also taken before centering so both
    /// measurements describe the same input.
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        let bounds = Bounds::of(&points);
        let dimensions = bounds.map(|b| b.dimensions()).unwrap_or_default();
        let volume = signed_volume(&points).abs().round();

        let mut vertices = VertexSet::new(points);
        if let Some(bounds) = bounds {
            vertices.translate(&-bounds.center().coords);
        }

        Self {
            summary: ModelSummary {
                dimensions,
                volume,
                triangle_count: vertices.triangle_count(),
            },
            vertices,
        }
    }

    /// Vertices translated so the bounding box center sits at the origin.
    pub fn vertices(&self) -> &VertexSet {
        &self.vertices
    }

    pub fn dimensions(&self) -> Dimensions {
        self.summary.dimensions
    }

    pub fn volume(&self) -> f64 {
        self.summary.volume
    }

    pub fn triangle_count(&self) -> usize {
        self.summary.triangle_count
    }

    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_points(size: f64, origin: Vector3<f64>) -> Vec<Point3<f64>> {
        Mesh::cube(size as f32)
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position.cast::<f64>() + origin))
            .collect()
    }

    #[test]
    fn test_round_to() {
        assert_relative_eq!(round_to(1.23456, 2), 1.23);
        assert_relative_eq!(round_to(1.235001, 2), 1.24);
        assert_relative_eq!(round_to(12.34, 1), 12.3);
    }

    #[test]
    fn test_empty_point_set() {
        let model = ParsedModel::from_points(Vec::new());
        assert_eq!(model.dimensions(), Dimensions::default());
        assert_eq!(model.volume(), 0.0);
        assert_eq!(model.triangle_count(), 0);
        assert!(model.is_empty());
    }

    #[test]
    fn test_flat_triangle_has_no_volume() {
        let model = ParsedModel::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        assert_eq!(model.volume(), 0.0);
        assert_eq!(model.dimensions(), Dimensions::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_cube_volume_is_translation_invariant() {
        let at_origin = ParsedModel::from_points(cube_points(10.0, Vector3::zeros()));
        let shifted = ParsedModel::from_points(cube_points(10.0, Vector3::new(40.0, -7.5, 3.0)));
        assert_eq!(at_origin.volume(), 1000.0);
        assert_eq!(shifted.volume(), 1000.0);
        assert_eq!(shifted.dimensions(), Dimensions::new(10.0, 10.0, 10.0));
        assert_eq!(shifted.triangle_count(), 12);
    }

    #[test]
    fn test_centering_moves_box_center_to_origin() {
        let model = ParsedModel::from_points(cube_points(10.0, Vector3::new(100.0, 50.0, 5.0)));
        let bounds = Bounds::of(model.vertices().points()).unwrap();
        assert_relative_eq!(bounds.center().coords.norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.x, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_centering_uses_box_not_vertex_centroid() {
        // Three points crowd the low corner; the box center is still (5, 5, 0).
        let model = ParsedModel::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
        ]);
        assert_eq!(model.vertices().points()[0], Point3::new(-5.0, -5.0, 0.0));
        assert_eq!(model.vertices().points()[2], Point3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn test_inverted_winding_still_positive() {
        let mut points = cube_points(2.0, Vector3::zeros());
        for tri in points.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        assert_relative_eq!(signed_volume(&points), -8.0, epsilon = 1e-6);
        assert_eq!(ParsedModel::from_points(points).volume(), 8.0);
    }

    #[test]
    fn test_bounding_radius_and_mesh() {
        let model = ParsedModel::from_points(cube_points(2.0, Vector3::zeros()));
        assert_relative_eq!(model.vertices().bounding_radius(), 3f64.sqrt(), epsilon = 1e-6);
        let mesh = model.vertices().to_mesh();
        assert_eq!(mesh.triangles.len(), 12);
    }
}
