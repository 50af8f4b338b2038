//! Scene loading and saving
//!
//! Scenes are RON (Rusty Object Notation) files. Textures, materials and
//! models are declared once under a key and referenced by key from the
//! objects that use them. A key that does not resolve is logged and the
//! object renders with the error material or model instead.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Environment, Material, Model, RenderContext, RenderObject, Spin, Transform};
use crate::rasterizer::{Camera, RasterSettings, Texture, Vec2, Vec3};
use crate::shader::ShaderKind;

/// Errors raised while building or loading a scene
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("triangle {triangle} has {pool} index {index} but the pool holds {len}")]
    InvalidModel {
        triangle: usize,
        pool: &'static str,
        index: usize,
        len: usize,
    },

    #[error("invalid settings: {0}")]
    Settings(String),
}

/// How a texture is produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureDesc {
    /// 1x1 texture of one 0xRRGGBB color
    Solid(u32),
    Checker {
        width: usize,
        height: usize,
        cell: usize,
        color1: u32,
        color2: u32,
    },
    /// Background color with filled rectangles (x, y, w, h, color) on top
    Rects {
        width: usize,
        height: usize,
        background: u32,
        rects: Vec<(usize, usize, usize, usize, u32)>,
    },
    /// The magenta missing-texture pattern
    Error { width: usize, height: usize },
    /// Image path, relative to the scene file
    File(String),
}

impl TextureDesc {
    fn build(&self, name: &str, base_dir: Option<&Path>) -> Result<Texture, SceneError> {
        let mut tex = match self {
            TextureDesc::Solid(rgb) => Texture::solid(1, 1, *rgb),
            TextureDesc::Checker { width, height, cell, color1, color2 } => {
                check_texture_size(name, *width, *height)?;
                Texture::checkerboard(*width, *height, *cell, *color1, *color2)
            }
            TextureDesc::Rects { width, height, background, rects } => {
                check_texture_size(name, *width, *height)?;
                let mut tex = Texture::solid(*width, *height, *background);
                for &(x, y, w, h, rgb) in rects {
                    tex.fill_rect(x, y, w, h, rgb);
                }
                tex
            }
            TextureDesc::Error { width, height } => {
                check_texture_size(name, *width, *height)?;
                Texture::new(*width, *height)
            }
            TextureDesc::File(path) => {
                let path = match base_dir {
                    Some(dir) => dir.join(path),
                    None => PathBuf::from(path),
                };
                Texture::from_file(path)?
            }
        };
        tex.name = name.to_string();
        Ok(tex)
    }
}

fn check_texture_size(name: &str, width: usize, height: usize) -> Result<(), SceneError> {
    if width == 0 || height == 0 {
        return Err(SceneError::Settings(format!("texture '{}' is {}x{}", name, width, height)));
    }
    Ok(())
}

/// A material as written in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDesc {
    pub shader: ShaderKind,
    /// Texture key; missing or unknown renders the error checkerboard
    pub texture: Option<String>,
    pub uv_scale: Vec2,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            shader: ShaderKind::Unlit,
            texture: None,
            uv_scale: Vec2::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    pub transform: Transform,
    /// Vertical field of view in degrees, in (0, 180)
    pub fov: f32,
    /// Optional constant rotation in degrees per second
    pub spin: Option<Vec3>,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov: 90.0,
            spin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDesc {
    pub name: String,
    pub model: String,
    pub material: Option<String>,
    pub transform: Transform,
    pub spin: Option<Vec3>,
    pub active: bool,
}

impl Default for ObjectDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            model: String::new(),
            material: None,
            transform: Transform::default(),
            spin: None,
            active: true,
        }
    }
}

/// On-disk scene description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub settings: RasterSettings,
    pub environment: Environment,
    pub camera: CameraDesc,
    pub textures: BTreeMap<String, TextureDesc>,
    pub materials: BTreeMap<String, MaterialDesc>,
    pub models: BTreeMap<String, Model>,
    pub objects: Vec<ObjectDesc>,
}

/// A loaded scene: render settings plus everything to draw
#[derive(Debug)]
pub struct Scene {
    pub settings: RasterSettings,
    pub context: RenderContext,
}

impl SceneFile {
    /// Resolve keys and build the render context.
    ///
    /// `base_dir` anchors relative texture paths.
    pub fn build(self, base_dir: Option<&Path>) -> Result<Scene, SceneError> {
        self.settings.validate()?;
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(SceneError::Settings(format!(
                "field of view {} must be between 0 and 180 degrees",
                self.camera.fov
            )));
        }

        let mut textures = BTreeMap::new();
        for (key, desc) in &self.textures {
            textures.insert(key.clone(), Arc::new(desc.build(key, base_dir)?));
        }

        let mut materials = BTreeMap::new();
        for (key, desc) in &self.materials {
            let texture = desc.texture.as_ref().and_then(|tex_key| {
                let found = textures.get(tex_key).cloned();
                if found.is_none() {
                    log::warn!("material '{}' uses unknown texture '{}'", key, tex_key);
                }
                found
            });
            let material = Material::new(Some(desc.shader.build()), texture, desc.uv_scale);
            materials.insert(key.clone(), Arc::new(material));
        }

        let mut camera = Camera::new(self.camera.transform, self.camera.fov);
        if let Some(rate) = self.camera.spin {
            camera.script = Some(Box::new(Spin::new(rate)));
        }

        let mut context = RenderContext::new(camera);
        context.environment = self.environment;
        for (key, model) in self.models {
            context.models.insert(key, model);
        }

        for desc in self.objects {
            let mut object = RenderObject::new(desc.name, desc.model).with_transform(desc.transform);
            object.active = desc.active;
            if let Some(mat_key) = desc.material {
                match materials.get(&mat_key) {
                    Some(mat) => object.material = Some(Arc::clone(mat)),
                    None => log::warn!("object '{}' uses unknown material '{}'", object.name, mat_key),
                }
            }
            if let Some(rate) = desc.spin {
                object.script = Some(Box::new(Spin::new(rate)));
            }
            context.add_object(object);
        }

        log::info!(
            "scene: {} textures, {} materials, {} models, {} objects",
            textures.len(),
            materials.len(),
            context.models.len(),
            context.objects.len()
        );

        Ok(Scene {
            settings: self.settings,
            context,
        })
    }
}

/// Load a scene from a RON file; texture paths resolve next to it
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let file: SceneFile = ron::from_str(&contents)?;
    file.build(path.parent())
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    let file: SceneFile = ron::from_str(s)?;
    file.build(None)
}

/// Save a scene description to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneFile, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}
