//! Core types used throughout the simulation

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a simulated object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Rotation whose forward axis points along `direction`.
    ///
    /// Returns identity for a zero-length direction.
    pub fn look_rotation(direction: Vec3) -> Quat {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        Quat::from_rotation_arc(Vec3::NEG_Z, dir)
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Turn to face a target position
    pub fn look_at(&mut self, target: Vec3) {
        let direction = target - self.position;
        if direction.length_squared() > f32::EPSILON {
            self.rotation = Self::look_rotation(direction);
        }
    }
}

/// RGBA color with floating point components (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Create a color from RGB values (alpha = 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_rotation_faces_direction() {
        let rotation = Transform::look_rotation(Vec3::X);
        let transform = Transform::from_position_rotation(Vec3::ZERO, rotation);
        assert!(transform.forward().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_look_rotation_zero_is_identity() {
        assert_eq!(Transform::look_rotation(Vec3::ZERO), Quat::IDENTITY);
    }

    #[test]
    fn test_look_at_ignores_own_position() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        transform.look_at(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(transform.rotation, Quat::IDENTITY);

        transform.look_at(Vec3::new(1.0, 0.0, 5.0));
        assert!(transform.forward().abs_diff_eq(Vec3::Z, 1e-5));
    }
}
