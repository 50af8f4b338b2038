//! Everything a frame needs: camera, objects, models and lighting

use super::{Environment, ModelLibrary, RenderObject};
use crate::rasterizer::Camera;

/// A scene ready to render
#[derive(Debug, Default)]
pub struct RenderContext {
    pub camera: Camera,
    pub objects: Vec<RenderObject>,
    pub models: ModelLibrary,
    pub environment: Environment,
}

impl RenderContext {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Default::default()
        }
    }

    /// Add an object, returning its index
    pub fn add_object(&mut self, object: RenderObject) -> usize {
        if !self.models.contains(&object.model_key) {
            log::warn!(
                "object '{}' uses unknown model '{}', rendering the error model",
                object.name,
                object.model_key
            );
        }
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn find_object(&self, name: &str) -> Option<&RenderObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn find_object_mut(&mut self, name: &str) -> Option<&mut RenderObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    /// Advance time by `dt` seconds and run the camera and object scripts
    pub fn step(&mut self, dt: f32) {
        self.environment.time += dt;
        self.camera.run_script(dt);
        for object in &mut self.objects {
            object.run_script(dt);
        }
    }
}
