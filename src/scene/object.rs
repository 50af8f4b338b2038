//! Renderable objects and their per-frame scripts

use std::fmt::Debug;
use std::sync::Arc;

use super::{Material, Model, ModelLibrary, Transform};
use crate::rasterizer::{Vec2, Vec3};

/// Per-frame callback attached to an object or camera
pub trait Script: Debug + Send + Sync {
    /// Called once per frame before rendering; `dt` is in seconds
    fn update(&mut self, transform: &mut Transform, dt: f32);
}

/// Constant rotation in degrees per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub rate: Vec3,
}

impl Spin {
    pub fn new(rate: Vec3) -> Self {
        Self { rate }
    }
}

impl Script for Spin {
    fn update(&mut self, transform: &mut Transform, dt: f32) {
        transform.rotate_by(self.rate * dt);
    }
}

/// A model instance placed in the world with a material
#[derive(Debug)]
pub struct RenderObject {
    pub name: String,
    /// Key into the model library; unknown keys render the error model
    pub model_key: String,
    pub transform: Transform,
    /// `None` renders with the error material
    pub material: Option<Arc<Material>>,
    pub active: bool,
    pub script: Option<Box<dyn Script>>,
}

impl RenderObject {
    pub fn new(name: impl Into<String>, model_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_key: model_key.into(),
            transform: Transform::default(),
            material: None,
            active: true,
            script: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_script(mut self, script: Box<dyn Script>) -> Self {
        self.script = Some(script);
        self
    }

    pub fn model<'a>(&self, models: &'a ModelLibrary) -> &'a Model {
        models.get(&self.model_key)
    }

    pub fn material(&self) -> &Material {
        match &self.material {
            Some(mat) => mat.as_ref(),
            None => Material::error().as_ref(),
        }
    }

    /// Triangle `i` with the object's transform applied
    pub fn world_vertices(&self, model: &Model, i: usize) -> [Vec3; 3] {
        model.tri_vertices(i).map(|v| self.transform.transform(v))
    }

    /// Triangle `i`'s normal rotated into world space
    pub fn world_normal(&self, model: &Model, i: usize) -> Vec3 {
        self.transform.rotate(model.tri_normal(i))
    }

    pub fn tri_uvs(&self, model: &Model, i: usize) -> [Vec2; 3] {
        model.tri_uvs(i)
    }

    pub fn run_script(&mut self, dt: f32) {
        if let Some(script) = self.script.as_mut() {
            script.update(&mut self.transform, dt);
        }
    }
}
