//! Model rotation state and model matrices for the viewport

use nalgebra::{Matrix4, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Rotation about the vertical axis
    pub fn yaw(&self) -> f32 {
        self.y
    }

    /// Rotation about the horizontal axis
    pub fn pitch(&self) -> f32 {
        self.x
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Euler XYZ: yaw is applied in the pitched frame
        rx * ry * rz
    }

    /// Rotation followed by a uniform scale about the origin
    pub fn model_matrix(rotation: &RotationState, scale: f32) -> Matrix4<f32> {
        Self::rotation_matrix(rotation) * Matrix4::new_scaling(scale)
    }
}
