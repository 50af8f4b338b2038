//! Near-plane clipping in view space
//!
//! Clipping re-triangulates the part of a triangle in front of the near
//! plane. Every emitted vertex carries a weight vector expressing it as a
//! blend of the *original* triangle's vertices, interpolated with the same
//! fraction as its position, so attributes stay exact after clipping.

use super::math::Vec3;

/// Weight vectors of an unclipped triangle's own vertices
pub const STANDARD_WEIGHTS: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

/// A view-space triangle plus per-vertex weights into its source triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedTriangle {
    pub positions: [Vec3; 3],
    pub weights: [Vec3; 3],
}

/// Zero, one or two triangles left after clipping
#[derive(Debug, Clone, Copy)]
pub struct ClipOutput {
    triangles: [ClippedTriangle; 2],
    len: usize,
}

impl ClipOutput {
    const EMPTY: ClippedTriangle = ClippedTriangle {
        positions: [Vec3::ZERO; 3],
        weights: STANDARD_WEIGHTS,
    };

    fn none() -> Self {
        Self { triangles: [Self::EMPTY; 2], len: 0 }
    }

    fn one(t: ClippedTriangle) -> Self {
        Self { triangles: [t, Self::EMPTY], len: 1 }
    }

    fn two(a: ClippedTriangle, b: ClippedTriangle) -> Self {
        Self { triangles: [a, b], len: 2 }
    }

    pub fn as_slice(&self) -> &[ClippedTriangle] {
        &self.triangles[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Clip a view-space triangle against the plane `z = near`.
///
/// A vertex is clipped when `z <= near`. Winding order of the survivors is
/// kept: with one clipped vertex P the result is (A, B, B') and (A, A', B')
/// where A and B follow P in winding order and A', B' lie on P->A and P->B.
pub fn clip_near(tri: [Vec3; 3], near: f32) -> ClipOutput {
    let clipped = [tri[0].z <= near, tri[1].z <= near, tri[2].z <= near];
    let clip_count = clipped.iter().filter(|&&c| c).count();

    match clip_count {
        0 => ClipOutput::one(ClippedTriangle {
            positions: tri,
            weights: STANDARD_WEIGHTS,
        }),
        1 => {
            let clip_i = clipped.iter().position(|&c| c).unwrap_or(0);
            let next_i = (clip_i + 1) % 3;
            let prev_i = (clip_i + 2) % 3;
            let p = tri[clip_i];
            let a = tri[next_i];
            let b = tri[prev_i];

            let frac_a = (near - p.z) / (a.z - p.z);
            let frac_b = (near - p.z) / (b.z - p.z);
            let clip_a = p.lerp(a, frac_a);
            let clip_b = p.lerp(b, frac_b);

            let w = STANDARD_WEIGHTS;
            let weight_a = w[clip_i].lerp(w[next_i], frac_a);
            let weight_b = w[clip_i].lerp(w[prev_i], frac_b);

            ClipOutput::two(
                ClippedTriangle {
                    positions: [a, b, clip_b],
                    weights: [w[next_i], w[prev_i], weight_b],
                },
                ClippedTriangle {
                    positions: [a, clip_a, clip_b],
                    weights: [w[next_i], weight_a, weight_b],
                },
            )
        }
        2 => {
            let keep_i = clipped.iter().position(|&c| !c).unwrap_or(0);
            let clip_ia = (keep_i + 1) % 3;
            let clip_ib = (keep_i + 2) % 3;
            let p = tri[keep_i];

            let frac_x = (near - p.z) / (tri[clip_ia].z - p.z);
            let frac_y = (near - p.z) / (tri[clip_ib].z - p.z);
            let clip_x = p.lerp(tri[clip_ia], frac_x);
            let clip_y = p.lerp(tri[clip_ib], frac_y);

            let w = STANDARD_WEIGHTS;
            ClipOutput::one(ClippedTriangle {
                positions: [p, clip_x, clip_y],
                weights: [
                    w[keep_i],
                    w[keep_i].lerp(w[clip_ia], frac_x),
                    w[keep_i].lerp(w[clip_ib], frac_y),
                ],
            })
        }
        _ => ClipOutput::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEAR: f32 = 0.01;

    fn area(t: &[Vec3; 3]) -> f32 {
        (t[1] - t[0]).cross(t[2] - t[0]).len() * 0.5
    }

    /// Rebuild a position from source vertices and weights
    fn blend(src: &[Vec3; 3], w: Vec3) -> Vec3 {
        src[0] * w.x + src[1] * w.y + src[2] * w.z
    }

    #[test]
    fn test_unclipped_passes_through() {
        let tri = [Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 5.0), Vec3::new(0.0, 1.0, 6.0)];
        let out = clip_near(tri, NEAR);
        assert_eq!(out.len(), 1);
        assert_eq!(out.as_slice()[0].positions, tri);
        assert_eq!(out.as_slice()[0].weights, STANDARD_WEIGHTS);
    }

    #[test]
    fn test_fully_behind_is_dropped() {
        let tri = [Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, NEAR), Vec3::new(0.0, 1.0, -3.0)];
        assert!(clip_near(tri, NEAR).is_empty());
    }

    #[test]
    fn test_one_clipped_vertex_splits_in_two() {
        let tri = [Vec3::new(0.0, 0.0, -2.0), Vec3::new(2.0, 0.0, 4.0), Vec3::new(0.0, 3.0, 6.0)];
        let out = clip_near(tri, NEAR);
        assert_eq!(out.len(), 2);

        for t in out.as_slice() {
            for (pos, w) in t.positions.iter().zip(t.weights.iter()) {
                assert!(pos.z >= NEAR - 1e-5);
                assert!((w.x + w.y + w.z - 1.0).abs() < 1e-5);
                // Weights reproduce the position from the source triangle
                assert!((blend(&tri, *w) - *pos).len() < 1e-4);
            }
        }
    }

    #[test]
    fn test_one_clipped_vertex_preserves_area() {
        let tri = [Vec3::new(-1.0, -1.0, 3.0), Vec3::new(1.0, -1.0, -1.0), Vec3::new(0.0, 2.0, 5.0)];
        let out = clip_near(tri, NEAR);
        assert_eq!(out.len(), 2);

        // The cut-off corner at the clipped vertex
        let p = tri[1];
        let cut_a = p.lerp(tri[2], (NEAR - p.z) / (tri[2].z - p.z));
        let cut_b = p.lerp(tri[0], (NEAR - p.z) / (tri[0].z - p.z));
        let corner = area(&[p, cut_a, cut_b]);

        let kept: f32 = out.as_slice().iter().map(|t| area(&t.positions)).sum();
        assert!((kept + corner - area(&tri)).abs() < 1e-4);
    }

    #[test]
    fn test_two_clipped_vertices_keep_one_triangle() {
        let tri = [Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 2.0, 8.0), Vec3::new(2.0, 0.0, -3.0)];
        let out = clip_near(tri, NEAR);
        assert_eq!(out.len(), 1);

        let t = out.as_slice()[0];
        assert_eq!(t.positions[0], tri[1]);
        assert_eq!(t.weights[0], Vec3::Y);
        assert!((t.positions[1].z - NEAR).abs() < 1e-5);
        assert!((t.positions[2].z - NEAR).abs() < 1e-5);
        for (pos, w) in t.positions.iter().zip(t.weights.iter()) {
            assert!((blend(&tri, *w) - *pos).len() < 1e-4);
        }
    }
}
