//! Built-in shaders: the regular unlit/lit pair plus debug visualizations

use super::{Fragment, FragmentData, Shader};
use crate::rasterizer::Vec3;

/// Texture color only
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlitShader;

impl Shader for UnlitShader {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment {
        Fragment::Color(frag.sample())
    }

    fn name(&self) -> &'static str {
        "unlit"
    }
}

/// Texture color scaled by the sun/ambient light intensity
#[derive(Debug, Clone, Copy, Default)]
pub struct LitShader;

impl Shader for LitShader {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment {
        Fragment::Color(frag.sample() * frag.light_intensity())
    }

    fn name(&self) -> &'static str {
        "lit"
    }
}

/// Grey ramp over linear depth; beyond `max_depth` shows a pale cyan
#[derive(Debug, Clone, Copy)]
pub struct DepthShader {
    pub max_depth: f32,
}

impl Default for DepthShader {
    fn default() -> Self {
        Self { max_depth: 50.0 }
    }
}

impl Shader for DepthShader {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment {
        let d = frag.depth / self.max_depth;
        if d > 1.0 {
            return Fragment::Color(Vec3::new(0.75, 1.0, 1.0));
        }
        Fragment::Color(Vec3::splat(d))
    }

    fn name(&self) -> &'static str {
        "depth"
    }
}

/// World normal remapped from [-1, 1] to [0, 1]
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalsShader;

impl Shader for NormalsShader {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment {
        Fragment::Color((frag.world_normal + Vec3::ONE) * 0.5)
    }

    fn name(&self) -> &'static str {
        "normals"
    }
}

/// Light edges where the smallest barycentric weight is under `threshold`
#[derive(Debug, Clone, Copy)]
pub struct WireframeShader {
    pub threshold: f32,
    pub wire: Vec3,
    pub background: Vec3,
}

impl Default for WireframeShader {
    fn default() -> Self {
        Self {
            threshold: 0.025,
            wire: Vec3::splat(0.8),
            background: Vec3::splat(0.15),
        }
    }
}

impl Shader for WireframeShader {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment {
        if frag.weights.min_component() < self.threshold {
            Fragment::Color(self.wire)
        } else {
            Fragment::Color(self.background)
        }
    }

    fn name(&self) -> &'static str {
        "wireframe"
    }
}

/// Texture UV as red/green
#[derive(Debug, Clone, Copy, Default)]
pub struct UvShader;

impl Shader for UvShader {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment {
        Fragment::Color(frag.tex_uv.to_3d(0.0))
    }

    fn name(&self) -> &'static str {
        "uv"
    }
}

/// Masked ring over the first two weights, colored by screen position and
/// dimmed with distance. The ring radius pulses with environment time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugShader;

impl Shader for DebugShader {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment {
        let pulse = 0.05 * (frag.environment.time * 2.0).sin();
        let (inner, outer) = (0.35 + pulse, 0.65 + pulse);

        let l = frag.weights.to_2d().len();
        if l < inner || l > outer {
            return Fragment::Discard;
        }
        Fragment::Color(frag.screen_uv.to_3d(1.0) * (4.0 / frag.depth).min(1.0))
    }

    fn name(&self) -> &'static str {
        "debug"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Texture, Vec2};
    use crate::scene::{Environment, Material};
    use crate::shader::ShaderKind;

    struct Fixture {
        material: Material,
        texture: Texture,
        env: Environment,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                material: Material::default(),
                texture: Texture::solid(2, 2, 0x808080),
                env: Environment::new(Vec2::new(0.0, 0.0), 0.25),
            }
        }

        fn frag(&self, weights: Vec3, normal: Vec3, depth: f32) -> FragmentData<'_> {
            FragmentData {
                screen_uv: Vec2::new(0.5, 0.25),
                weights,
                material: &self.material,
                tri_uvs: [Vec2::ZERO; 3],
                tex_uv: Vec2::new(0.3, 0.7),
                texture: &self.texture,
                world_normal: normal,
                world_position: Vec3::ZERO,
                depth,
                object: 0,
                triangle: 0,
                environment: &self.env,
            }
        }
    }

    #[test]
    fn test_unlit_samples_texture() {
        let fx = Fixture::new();
        let out = UnlitShader.fragment(&fx.frag(Vec3::X, Vec3::Z, 1.0));
        assert_eq!(out, Fragment::Color(Vec3::from_rgb(0x808080)));
    }

    #[test]
    fn test_lit_uses_sun_and_ambient() {
        let fx = Fixture::new();
        let base = Vec3::from_rgb(0x808080).x;
        // Sun at zero angles points down +z
        let facing = LitShader.fragment(&fx.frag(Vec3::X, Vec3::Z, 1.0));
        let away = LitShader.fragment(&fx.frag(Vec3::X, -Vec3::Z, 1.0));
        match (facing, away) {
            (Fragment::Color(f), Fragment::Color(a)) => {
                assert!((f.x - base).abs() < 1e-5);
                assert!((a.x - base * 0.25).abs() < 1e-5);
            }
            _ => panic!("lit shader never discards"),
        }
    }

    #[test]
    fn test_depth_shader_ramp() {
        let fx = Fixture::new();
        let s = DepthShader::default();
        assert_eq!(s.fragment(&fx.frag(Vec3::X, Vec3::Z, 25.0)), Fragment::Color(Vec3::splat(0.5)));
        assert_eq!(s.fragment(&fx.frag(Vec3::X, Vec3::Z, 60.0)), Fragment::Color(Vec3::new(0.75, 1.0, 1.0)));
    }

    #[test]
    fn test_wireframe_edges() {
        let fx = Fixture::new();
        let s = WireframeShader::default();
        let edge = s.fragment(&fx.frag(Vec3::new(0.5, 0.49, 0.01), Vec3::Z, 1.0));
        let inside = s.fragment(&fx.frag(Vec3::splat(1.0 / 3.0), Vec3::Z, 1.0));
        assert_eq!(edge, Fragment::Color(s.wire));
        assert_eq!(inside, Fragment::Color(s.background));
    }

    #[test]
    fn test_normals_and_uv() {
        let fx = Fixture::new();
        let n = NormalsShader.fragment(&fx.frag(Vec3::X, Vec3::new(0.0, 1.0, -1.0), 1.0));
        assert_eq!(n, Fragment::Color(Vec3::new(0.5, 1.0, 0.0)));
        let uv = UvShader.fragment(&fx.frag(Vec3::X, Vec3::Z, 1.0));
        assert_eq!(uv, Fragment::Color(Vec3::new(0.3, 0.7, 0.0)));
    }

    #[test]
    fn test_debug_masks_outside_ring() {
        let fx = Fixture::new();
        assert_eq!(DebugShader.fragment(&fx.frag(Vec3::X, Vec3::Z, 1.0)), Fragment::Discard);
        let ring = DebugShader.fragment(&fx.frag(Vec3::new(0.35, 0.35, 0.3), Vec3::Z, 8.0));
        assert_eq!(ring, Fragment::Color(Vec3::new(0.25, 0.125, 0.5)));
    }

    #[test]
    fn test_sentinel_converts_to_discard() {
        assert_eq!(Fragment::from(crate::shader::DISCARD_SENTINEL), Fragment::Discard);
        assert_eq!(Fragment::from(Vec3::ONE), Fragment::Color(Vec3::ONE));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [ShaderKind::Unlit, ShaderKind::Lit, ShaderKind::Depth, ShaderKind::Uv] {
            let shader = kind.build();
            assert_eq!(ShaderKind::from_name(shader.name()), Some(kind));
        }
        assert_eq!(ShaderKind::from_name("nope"), None);
    }
}
