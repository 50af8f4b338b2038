//! Position, Euler rotation and scale with cached rotation bases

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Basis, Vec3};

/// Object placement in the world.
///
/// Rotation is private so the cached bases can never go stale: every
/// mutation goes through `set_rotation`/`rotate_by`, which wrap the angles
/// into [0, 360) and rebuild both bases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransformDesc", into = "TransformDesc")]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    rotation: Vec3,
    basis: Basis,
    inv_basis: Basis,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let mut t = Self {
            position,
            scale,
            rotation: Vec3::ZERO,
            basis: Basis::IDENTITY,
            inv_basis: Basis::IDENTITY,
        };
        t.set_rotation(rotation);
        t
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO, Vec3::ONE)
    }

    /// Rotation as (pitch, yaw, roll) in degrees, each in [0, 360)
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Object-to-world rotation
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// World-to-object rotation
    pub fn inv_basis(&self) -> &Basis {
        &self.inv_basis
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation.modulo(360.0);
        self.basis = Basis::from_euler(self.rotation);
        self.inv_basis = self.basis.transpose();
    }

    pub fn rotate_by(&mut self, delta: Vec3) {
        self.set_rotation(self.rotation + delta);
    }

    pub fn move_by(&mut self, delta: Vec3) {
        self.position = self.position + delta;
    }

    /// Rotate a direction into world space (no scale, no translation)
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        self.basis.rotate(v)
    }

    /// Local point to world: scale, rotate, then translate
    pub fn transform(&self, v: Vec3) -> Vec3 {
        self.basis.rotate(v.multiply(self.scale)) + self.position
    }

    /// World point into this transform's rotated frame (for cameras)
    pub fn to_view(&self, v: Vec3) -> Vec3 {
        self.inv_basis.rotate(v - self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Serialized form; bases are derived on load
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct TransformDesc {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl From<TransformDesc> for Transform {
    fn from(d: TransformDesc) -> Self {
        Transform::new(d.position, d.rotation, d.scale)
    }
}

impl From<Transform> for TransformDesc {
    fn from(t: Transform) -> Self {
        Self {
            position: t.position,
            rotation: t.rotation,
            scale: t.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-4
    }

    #[test]
    fn test_rotation_wraps() {
        let mut t = Transform::new(Vec3::ZERO, Vec3::new(350.0, -30.0, 720.0), Vec3::ONE);
        assert!(approx(t.rotation(), Vec3::new(350.0, 330.0, 0.0)));
        t.rotate_by(Vec3::new(20.0, 0.0, 0.0));
        assert!(approx(t.rotation(), Vec3::new(10.0, 330.0, 0.0)));
    }

    fn approx_basis(a: &Basis, b: &Basis) -> bool {
        approx(a.i, b.i) && approx(a.j, b.j) && approx(a.k, b.k)
    }

    #[test]
    fn test_bases_follow_rotation() {
        let mut t = Transform::default();
        t.rotate_by(Vec3::new(0.0, 90.0, 0.0));
        assert!(approx_basis(t.basis(), &Basis::from_euler(Vec3::new(0.0, 90.0, 0.0))));
        assert!(approx_basis(t.inv_basis(), &t.basis().transpose()));
        assert!(approx(t.inv_basis().rotate(t.basis().rotate(Vec3::X)), Vec3::X));
    }

    #[test]
    fn test_transform_scales_rotates_translates() {
        let t = Transform::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 90.0, 0.0), Vec3::splat(2.0));
        let p = t.transform(Vec3::X);
        assert!(approx(p, Vec3::new(0.0, 0.0, 12.0)));
        assert!(approx(t.rotate(Vec3::X), Vec3::Z));
        assert!(approx(t.to_view(p), Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ron_round_trip_rebuilds_basis() {
        let t: Transform = ron::from_str("(position: (x: 1.0, y: 2.0, z: 3.0), rotation: (x: 0.0, y: 450.0, z: 0.0))").unwrap();
        assert!(approx(t.rotation(), Vec3::new(0.0, 90.0, 0.0)));
        assert_eq!(t.scale, Vec3::ONE);
        assert!(approx(t.rotate(Vec3::Z), Vec3::new(-1.0, 0.0, 0.0)));
    }
}
