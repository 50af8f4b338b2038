//! Programmable fragment stage
//!
//! A shader turns one covered pixel's interpolated attributes into either a
//! color or a discard. Shaders only read their `FragmentData`; they never
//! touch scene state.

mod builtin;

pub use builtin::*;

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Texture, Vec2, Vec3};
use crate::scene::{Environment, Material};

/// Legacy "do not write" return value: any color with a negative red channel
pub const DISCARD_SENTINEL: Vec3 = Vec3::new(-1.0, 0.0, 0.0);

/// Result of shading one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fragment {
    /// Color in [0, 1]^3
    Color(Vec3),
    /// Leave color and depth untouched
    Discard,
}

impl From<Vec3> for Fragment {
    /// Colors with a negative x component are discards
    fn from(color: Vec3) -> Self {
        if color.x < 0.0 {
            Fragment::Discard
        } else {
            Fragment::Color(color)
        }
    }
}

/// Per-pixel inputs handed to a shader
#[derive(Debug, Clone, Copy)]
pub struct FragmentData<'a> {
    /// Pixel position divided by the resolution
    pub screen_uv: Vec2,
    /// Perspective-correct weights of the source triangle's vertices
    pub weights: Vec3,
    pub material: &'a Material,
    /// UVs of the source triangle's vertices
    pub tri_uvs: [Vec2; 3],
    /// Interpolated UV after the material's tiling
    pub tex_uv: Vec2,
    pub texture: &'a Texture,
    pub world_normal: Vec3,
    pub world_position: Vec3,
    /// Linear view-space depth
    pub depth: f32,
    /// Index of the object in the render context
    pub object: usize,
    /// Triangle index within the object's model
    pub triangle: usize,
    pub environment: &'a Environment,
}

impl FragmentData<'_> {
    /// Nearest texel of the fragment's texture at its UV
    pub fn sample(&self) -> Vec3 {
        self.texture.sample(self.tex_uv)
    }

    /// Sun term for the world normal, floored by the ambient level
    pub fn light_intensity(&self) -> f32 {
        self.environment.light_intensity(self.world_normal)
    }
}

/// A fragment shader
pub trait Shader: Debug + Send + Sync {
    fn fragment(&self, frag: &FragmentData<'_>) -> Fragment;

    fn name(&self) -> &'static str;
}

/// Serializable selector for the built-in shaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShaderKind {
    Unlit,
    Lit,
    Depth,
    Normals,
    Wireframe,
    Uv,
    Debug,
}

impl ShaderKind {
    pub fn build(self) -> Arc<dyn Shader> {
        match self {
            ShaderKind::Unlit => Arc::new(UnlitShader),
            ShaderKind::Lit => Arc::new(LitShader),
            ShaderKind::Depth => Arc::new(DepthShader::default()),
            ShaderKind::Normals => Arc::new(NormalsShader),
            ShaderKind::Wireframe => Arc::new(WireframeShader::default()),
            ShaderKind::Uv => Arc::new(UvShader),
            ShaderKind::Debug => Arc::new(DebugShader),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "unlit" => ShaderKind::Unlit,
            "lit" => ShaderKind::Lit,
            "depth" => ShaderKind::Depth,
            "normals" => ShaderKind::Normals,
            "wireframe" => ShaderKind::Wireframe,
            "uv" => ShaderKind::Uv,
            "debug" => ShaderKind::Debug,
            _ => return None,
        };
        Some(kind)
    }
}
