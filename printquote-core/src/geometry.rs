//! Renderable mesh primitives handed to the viewport

use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn from_point(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = &self.vertices;
        Self::face_normal(&v0.position, &v1.position, &v2.position)
    }

    /// Unit normal from counter-clockwise winding; zero for degenerate triangles.
    pub fn face_normal(v0: &Point3<f32>, v1: &Point3<f32>, v2: &Point3<f32>) -> Vector3<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// Cube corners are indexed by sign bits: x = 1, y = 2, z = 4.
/// Two counter-clockwise triangles per face: +z, -z, +y, -y, +x, -x.
const CUBE_FACES: [[usize; 3]; 12] = [
    [4, 5, 7],
    [4, 7, 6],
    [0, 2, 3],
    [0, 3, 1],
    [2, 6, 7],
    [2, 7, 3],
    [0, 1, 5],
    [0, 5, 4],
    [1, 3, 7],
    [1, 7, 5],
    [0, 4, 6],
    [0, 6, 2],
];

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Create a closed cube centered on the origin, wound outward
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let corner = |i: usize| {
            let sign = |bit: usize| if i & bit == 0 { -half } else { half };
            Point3::new(sign(1), sign(2), sign(4))
        };

        let mut mesh = Self::with_capacity(CUBE_FACES.len());
        for [a, b, c] in CUBE_FACES {
            let (p0, p1, p2) = (corner(a), corner(b), corner(c));
            let normal = Triangle::face_normal(&p0, &p1, &p2);
            mesh.add_triangle(Triangle::new(
                Vertex::from_point(p0, normal),
                Vertex::from_point(p1, normal),
                Vertex::from_point(p2, normal),
            ));
        }
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.len(), 12);
        for triangle in &cube.triangles {
            let centroid = triangle
                .vertices
                .iter()
                .fold(Vector3::zeros(), |acc, v| acc + v.position.coords)
                / 3.0;
            assert!(triangle.calculate_normal().dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_cube_is_closed_and_sized() {
        let cube = Mesh::cube(3.0);
        // divergence theorem: sum of p0 . (p1 x p2) / 6 over an outward closed surface
        let volume: f32 = cube
            .triangles
            .iter()
            .map(|t| {
                let [a, b, c] = &t.vertices;
                a.position.coords.dot(&b.position.coords.cross(&c.position.coords)) / 6.0
            })
            .sum();
        assert_relative_eq!(volume, 27.0, epsilon = 1e-4);

        for triangle in &cube.triangles {
            for vertex in &triangle.vertices {
                assert_relative_eq!(vertex.normal.norm(), 1.0, epsilon = 1e-6);
                assert_relative_eq!(vertex.position.coords.abs().max(), 1.5);
            }
            let normal = triangle.vertices[0].normal;
            // axis-aligned: exactly one non-zero component
            assert_eq!(normal.iter().filter(|c| c.abs() > 0.5).count(), 1);
        }
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let normal = Triangle::face_normal(&p, &p, &Point3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(normal.norm(), 0.0);
    }
}
