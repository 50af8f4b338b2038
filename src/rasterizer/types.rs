//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

use super::math::{Vec2, Vec3};
use crate::scene::SceneError;
use crate::shader::ShaderKind;

/// Fixed-size grid of RGB samples (0..1 per channel)
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Vec3>,
    pub name: String,
}

impl Texture {
    /// Magenta / dark-grey quadrants, the look of a missing texture
    pub fn new(width: usize, height: usize) -> Self {
        let mut tex = Self::solid(width, height, 0x404040);
        let half_w = width / 2;
        let half_h = height / 2;
        tex.fill_rect(0, 0, half_w, half_h, 0xff00ff);
        tex.fill_rect(half_w, half_h, width - half_w, height - half_h, 0xff00ff);
        tex.name = "error".to_string();
        tex
    }

    /// Single-color texture
    pub fn solid(width: usize, height: usize, rgb: u32) -> Self {
        assert!(width > 0 && height > 0, "texture must be at least 1x1");
        Self {
            width,
            height,
            pixels: vec![Vec3::from_rgb(rgb); width * height],
            name: String::new(),
        }
    }

    /// Checkerboard with square cells of `cell` texels
    pub fn checkerboard(width: usize, height: usize, cell: usize, color1: u32, color2: u32) -> Self {
        let cell = cell.max(1);
        let (c1, c2) = (Vec3::from_rgb(color1), Vec3::from_rgb(color2));
        let mut tex = Self::solid(width, height, color1);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                tex.pixels[y * width + x] = if checker { c1 } else { c2 };
            }
        }
        tex.name = "checkerboard".to_string();
        tex
    }

    /// Fill a rectangle, clipped to the texture bounds
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, rgb: u32) {
        let color = Vec3::from_rgb(rgb);
        for ty in y.min(self.height)..(y + h).min(self.height) {
            for tx in x.min(self.width)..(x + w).min(self.width) {
                self.pixels[ty * self.width + tx] = color;
            }
        }
    }

    /// Load texture from an image file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_bytes(&bytes, name)
    }

    /// Load texture from encoded image bytes (PNG, JPEG, BMP)
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, SceneError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| Vec3::new(p[0] as f32 / 255.0, p[1] as f32 / 255.0, p[2] as f32 / 255.0))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Nearest-texel sample; UV wraps into [0, 1)
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let uv = uv.modulo(1.0);
        let tx = ((uv.x * self.width as f32) as usize).min(self.width - 1);
        let ty = ((uv.y * self.height as f32) as usize).min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }

    /// Get texel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Vec3 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Vec3::ZERO
        }
    }
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Render target width in pixels
    pub width: usize,
    /// Render target height in pixels
    pub height: usize,
    /// View-space distance of the near clip plane
    pub near_clip: f32,
    /// Number of horizontal bands rasterized in parallel
    pub threads: usize,
    /// Skip triangles whose normal faces away from the camera
    pub backface_cull: bool,
    /// Replace shading with a per-pixel write-count heat map
    pub show_overdraw: bool,
    /// Write white for shaded fragments and red for discarded ones
    pub shader_status: bool,
    /// Shade every object with this shader instead of its material's
    pub shader_override: Option<ShaderKind>,
}

impl RasterSettings {
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::Settings(format!(
                "resolution {}x{} has no pixels",
                self.width, self.height
            )));
        }
        if !(self.near_clip > 0.0) {
            return Err(SceneError::Settings(format!("near clip {} must be positive", self.near_clip)));
        }
        Ok(())
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
            near_clip: super::NEAR_CLIP_DST,
            threads: 1,
            backface_cull: true,
            show_overdraw: false,
            shader_status: false,
            shader_override: None,
        }
    }
}
