//! Shader + texture + UV tiling bundles

use std::sync::{Arc, OnceLock};

use crate::rasterizer::{Texture, Vec2};
use crate::shader::{Shader, UnlitShader};

/// How a surface is shaded
#[derive(Debug, Clone)]
pub struct Material {
    pub shader: Arc<dyn Shader>,
    pub texture: Option<Arc<Texture>>,
    /// UV tiling applied before sampling
    pub uv_scale: Vec2,
}

impl Material {
    /// A missing shader falls back to unlit
    pub fn new(shader: Option<Arc<dyn Shader>>, texture: Option<Arc<Texture>>, uv_scale: Vec2) -> Self {
        Self {
            shader: shader.unwrap_or_else(|| Arc::new(UnlitShader)),
            texture,
            uv_scale,
        }
    }

    pub fn with_shader(shader: Arc<dyn Shader>) -> Self {
        Self::new(Some(shader), None, Vec2::ONE)
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(Arc::new(texture));
        self
    }

    pub fn with_uv_scale(mut self, uv_scale: Vec2) -> Self {
        self.uv_scale = uv_scale;
        self
    }

    /// Unlit checkerboard tiled 4x4, used wherever a material is missing
    pub fn error() -> &'static Arc<Material> {
        static ERROR_MATERIAL: OnceLock<Arc<Material>> = OnceLock::new();
        ERROR_MATERIAL.get_or_init(|| {
            Arc::new(Material::new(
                Some(Arc::new(UnlitShader)),
                Some(Arc::new(Texture::new(2, 2))),
                Vec2::new(4.0, 4.0),
            ))
        })
    }

    /// Texture to sample, or the error checkerboard
    pub fn texture(&self) -> &Texture {
        match &self.texture {
            Some(tex) => tex.as_ref(),
            None => Material::error().texture(),
        }
    }

    /// Apply tiling and wrap into [0, 1)
    pub fn convert_uv(&self, uv: Vec2) -> Vec2 {
        uv.multiply(self.uv_scale).modulo(1.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(None, None, Vec2::ONE)
    }
}
