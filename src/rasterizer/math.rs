//! Vector math for 3D rendering
//!
//! Angles are in degrees. Trigonometry runs in f64 and is narrowed to f32.

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Screen-space triangles with less total area than this are treated as degenerate
const DEGENERATE_AREA: f32 = 1e-7;

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Unpack a 0xRRGGBB color into the 0..1 range
    pub fn from_rgb(rgb: u32) -> Self {
        Vec3 {
            x: ((rgb >> 16) & 0xff) as f32 / 255.0,
            y: ((rgb >> 8) & 0xff) as f32 / 255.0,
            z: (rgb & 0xff) as f32 / 255.0,
        }
    }

    /// Build a color from hue in degrees, saturation and value in percent
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let s = saturation / 100.0;
        let v = value / 100.0;

        let c = v * s;
        let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match hue {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Vec3::new(r + m, g + m, b + m)
    }

    /// Pack into 0xRRGGBB, clamping each channel to 0..1
    pub fn to_rgb(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
        (channel(self.x) << 16) | (channel(self.y) << 8) | channel(self.z)
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        self.scale(1.0 / l)
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Component-wise product
    pub fn multiply(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    /// Component-wise reciprocal
    pub fn inverse(self) -> Vec3 {
        Vec3 {
            x: 1.0 / self.x,
            y: 1.0 / self.y,
            z: 1.0 / self.z,
        }
    }

    /// Wrap each component into [0, m)
    pub fn modulo(self, m: f32) -> Vec3 {
        Vec3 {
            x: self.x.rem_euclid(m),
            y: self.y.rem_euclid(m),
            z: self.z.rem_euclid(m),
        }
    }

    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }

    pub fn min_component(self) -> f32 {
        self.x.min(self.y).min(self.z)
    }

    pub fn to_2d(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// 2D Vector (screen positions and texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec2 {
        let l = self.len();
        if l == 0.0 {
            return Vec2::ZERO;
        }
        self.scale(1.0 / l)
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }

    pub fn multiply(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x * other.x, self.y * other.y)
    }

    pub fn inverse(self) -> Vec2 {
        Vec2::new(1.0 / self.x, 1.0 / self.y)
    }

    /// Wrap each component into [0, m)
    pub fn modulo(self, m: f32) -> Vec2 {
        Vec2::new(self.x.rem_euclid(m), self.y.rem_euclid(m))
    }

    /// Clockwise quarter turn
    pub fn rotate90(self) -> Vec2 {
        Vec2::new(self.y, -self.x)
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }

    pub fn to_3d(self, z: f32) -> Vec3 {
        Vec3::new(self.x, self.y, z)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        self.scale(s)
    }
}

/// Three basis vectors (the columns of a 3x3 rotation matrix)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub i: Vec3,
    pub j: Vec3,
    pub k: Vec3,
}

impl Basis {
    pub const IDENTITY: Basis = Basis { i: Vec3::X, j: Vec3::Y, k: Vec3::Z };

    pub const fn new(i: Vec3, j: Vec3, k: Vec3) -> Self {
        Self { i, j, k }
    }

    /// Build the object-to-world rotation for (pitch, yaw, roll) in degrees.
    ///
    /// Pitch is applied first, then yaw, then roll: each stage's basis
    /// vectors are expressed through the previously composed basis.
    pub fn from_euler(rotation: Vec3) -> Self {
        let (s_pitch, c_pitch) = sin_cos_deg(rotation.x);
        let pitch = Basis::new(
            Vec3::X,
            Vec3::new(0.0, c_pitch, -s_pitch),
            Vec3::new(0.0, s_pitch, c_pitch),
        );

        let (s_yaw, c_yaw) = sin_cos_deg(rotation.y);
        let yaw = Basis::new(
            Vec3::new(c_yaw, 0.0, s_yaw),
            Vec3::Y,
            Vec3::new(-s_yaw, 0.0, c_yaw),
        );

        let (s_roll, c_roll) = sin_cos_deg(rotation.z);
        let roll = Basis::new(
            Vec3::new(c_roll, s_roll, 0.0),
            Vec3::new(-s_roll, c_roll, 0.0),
            Vec3::Z,
        );

        let pitch_yaw = Basis::new(yaw.rotate(pitch.i), yaw.rotate(pitch.j), yaw.rotate(pitch.k));
        Basis::new(
            pitch_yaw.rotate(roll.i),
            pitch_yaw.rotate(roll.j),
            pitch_yaw.rotate(roll.k),
        )
    }

    /// Transpose; for an orthonormal basis this is the inverse rotation
    pub fn transpose(self) -> Basis {
        Basis::new(
            Vec3::new(self.i.x, self.j.x, self.k.x),
            Vec3::new(self.i.y, self.j.y, self.k.y),
            Vec3::new(self.i.z, self.j.z, self.k.z),
        )
    }

    /// `v.x * i + v.y * j + v.z * k`
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        self.i * v.x + self.j * v.y + self.k * v.z
    }
}

impl Default for Basis {
    fn default() -> Self {
        Basis::IDENTITY
    }
}

fn sin_cos_deg(degrees: f32) -> (f32, f32) {
    let (s, c) = (degrees as f64 * DEG_TO_RAD).sin_cos();
    (s as f32, c as f32)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Signed area of triangle (a, b, c); the sign encodes winding
pub fn signed_tri_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c - a).dot((b - a).rotate90()) / 2.0
}

/// Point-in-triangle test using the three sub-triangle areas.
///
/// Returns the barycentric weights of `p` (summing to 1) when `p` lies
/// inside or on the edge of the triangle, `None` when it is outside or the
/// triangle is degenerate.
pub fn point_in_triangle(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> Option<Vec3> {
    let area_abp = signed_tri_area(a, b, p);
    let area_bcp = signed_tri_area(b, c, p);
    let area_cap = signed_tri_area(c, a, p);

    let total = area_abp + area_bcp + area_cap;
    if total.abs() <= DEGENERATE_AREA {
        return None;
    }

    let all_positive = area_abp >= 0.0 && area_bcp >= 0.0 && area_cap >= 0.0;
    let all_negative = area_abp <= 0.0 && area_bcp <= 0.0 && area_cap <= 0.0;
    if !(all_positive || all_negative) {
        return None;
    }

    let inv_total = 1.0 / total;
    Some(Vec3::new(area_bcp * inv_total, area_cap * inv_total, area_abp * inv_total))
}

/// Focal length in pixels for a vertical field of view in degrees
pub fn conversion_scale(screen_height: usize, fov: f32) -> f32 {
    let half_fov = fov as f64 * DEG_TO_RAD * 0.5;
    (screen_height as f64 / (2.0 * half_fov.tan())) as f32
}

/// Project a view-space point to screen space, keeping view depth in z
pub fn project(v: Vec3, screen_center: Vec2, conversion: f32) -> Vec3 {
    let offset = Vec2::new(-v.x, -v.y) * (conversion / v.z);
    let screen = screen_center + offset;
    Vec3::new(screen.x, screen.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-5
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let c = Vec3::X.cross(Vec3::Y);
        assert!(approx(c, Vec3::Z));
    }

    #[test]
    fn test_normalize_is_unit() {
        let n = Vec3::new(3.0, 4.0, 12.0).normalize();
        assert!((n.len() - 1.0).abs() < 1e-6);
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn test_modulo_wraps_negative() {
        let v = Vec2::new(-0.25, 2.5).modulo(1.0);
        assert!((v.x - 0.75).abs() < 1e-6);
        assert!((v.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_conversion() {
        let c = Vec3::from_rgb(0x3366cc);
        assert!((c.x - 0.2).abs() < 1e-6);
        assert_eq!(c.to_rgb(), 0x3366cc);
        assert_eq!(Vec3::new(2.0, -1.0, 0.5).to_rgb(), 0xff0080);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Vec3::from_hsv(0.0, 100.0, 100.0).to_rgb(), 0xff0000);
        assert_eq!(Vec3::from_hsv(120.0, 100.0, 100.0).to_rgb(), 0x00ff00);
        assert_eq!(Vec3::from_hsv(-120.0, 100.0, 100.0).to_rgb(), 0x0000ff);
    }

    #[test]
    fn test_identity_basis() {
        let b = Basis::from_euler(Vec3::ZERO);
        assert!(approx(b.i, Vec3::X) && approx(b.j, Vec3::Y) && approx(b.k, Vec3::Z));
    }

    #[test]
    fn test_yaw_turns_forward_towards_minus_x() {
        let b = Basis::from_euler(Vec3::new(0.0, 90.0, 0.0));
        assert!(approx(b.rotate(Vec3::Z), Vec3::new(-1.0, 0.0, 0.0)));
        assert!(approx(b.rotate(Vec3::X), Vec3::Z));
    }

    #[test]
    fn test_basis_is_orthonormal_and_transpose_inverts() {
        let b = Basis::from_euler(Vec3::new(33.0, 127.0, 301.0));
        for v in [b.i, b.j, b.k] {
            assert!((v.len() - 1.0).abs() < 1e-5);
        }
        assert!(b.i.dot(b.j).abs() < 1e-5);
        assert!(b.j.dot(b.k).abs() < 1e-5);

        let p = Vec3::new(1.5, -2.0, 7.25);
        let back = b.transpose().rotate(b.rotate(p));
        assert!(approx(back, p));
    }

    #[test]
    fn test_point_in_triangle_weights() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let c = Vec2::new(5.0, 10.0);

        let w = point_in_triangle(a, b, c, Vec2::new(5.0, 3.0)).unwrap();
        assert!((w.x + w.y + w.z - 1.0).abs() < 1e-5);
        assert!(w.x >= 0.0 && w.y >= 0.0 && w.z >= 0.0);

        // Same answer regardless of winding
        let w2 = point_in_triangle(a, c, b, Vec2::new(5.0, 3.0)).unwrap();
        assert!((w.x - w2.x).abs() < 1e-5);
        assert!((w.y - w2.z).abs() < 1e-5);

        assert!(point_in_triangle(a, b, c, Vec2::new(-1.0, 3.0)).is_none());
    }

    #[test]
    fn test_vertex_gets_unit_weight() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(8.0, 2.0);
        let c = Vec2::new(3.0, 9.0);
        let w = point_in_triangle(a, b, c, b).unwrap();
        assert!(approx(w, Vec3::Y));
    }

    #[test]
    fn test_degenerate_triangle_rejected() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(5.0, 5.0);
        let c = Vec2::new(10.0, 10.0);
        assert!(point_in_triangle(a, b, c, Vec2::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_project_center_and_fov() {
        let conv = conversion_scale(100, 90.0);
        assert!((conv - 50.0).abs() < 1e-3);

        let center = Vec2::new(50.0, 50.0);
        let p = project(Vec3::new(0.0, 0.0, 10.0), center, conv);
        assert!(approx(p, Vec3::new(50.0, 50.0, 10.0)));

        // +x and +y in view space move left and up on screen
        let q = project(Vec3::new(1.0, 1.0, 10.0), center, conv);
        assert!((q.x - 45.0).abs() < 1e-4 && (q.y - 45.0).abs() < 1e-4);
    }
}
