//! Static triangle meshes
//!
//! A model owns three flat pools (positions, UVs, normals) and a list of
//! index triplets. Models are immutable after construction and always
//! validated: an index outside its pool is a corrupted mesh, never clamped.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::SceneError;
use crate::rasterizer::{Vec2, Vec3};

/// One flat-shaded triangle: three vertex indices, three UV indices and a
/// single normal index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub uvs: [usize; 3],
    pub normal: usize,
}

impl Triangle {
    pub const fn new(vertices: [usize; 3], uvs: [usize; 3], normal: usize) -> Self {
        Self { vertices, uvs, normal }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelData")]
pub struct Model {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

/// Unvalidated model as it appears in scene files
#[derive(Debug, Clone, Deserialize)]
struct ModelData {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

impl TryFrom<ModelData> for Model {
    type Error = SceneError;

    fn try_from(d: ModelData) -> Result<Self, SceneError> {
        Model::try_new(d.vertices, d.uvs, d.normals, d.triangles)
    }
}

impl Model {
    /// Build a model, panicking if any triangle indexes outside its pools
    pub fn new(vertices: Vec<Vec3>, uvs: Vec<Vec2>, normals: Vec<Vec3>, triangles: Vec<Triangle>) -> Self {
        match Self::try_new(vertices, uvs, normals, triangles) {
            Ok(model) => model,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(
        vertices: Vec<Vec3>,
        uvs: Vec<Vec2>,
        normals: Vec<Vec3>,
        triangles: Vec<Triangle>,
    ) -> Result<Self, SceneError> {
        let model = Self { vertices, uvs, normals, triangles };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), SceneError> {
        let check = |triangle: usize, pool: &'static str, index: usize, len: usize| {
            if index < len {
                Ok(())
            } else {
                Err(SceneError::InvalidModel { triangle, pool, index, len })
            }
        };

        for (t, tri) in self.triangles.iter().enumerate() {
            for &v in &tri.vertices {
                check(t, "vertex", v, self.vertices.len())?;
            }
            for &uv in &tri.uvs {
                check(t, "uv", uv, self.uvs.len())?;
            }
            check(t, "normal", tri.normal, self.normals.len())?;
        }
        Ok(())
    }

    /// Double-sided cross-hatched quad shown wherever a model is missing
    pub fn error() -> &'static Model {
        static ERROR_MODEL: OnceLock<Model> = OnceLock::new();
        ERROR_MODEL.get_or_init(|| {
            Model::new(
                vec![
                    Vec3::new(1.0, 1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0),
                    Vec3::new(1.0, -1.0, 0.0), Vec3::new(-1.0, -1.0, 0.0),
                    Vec3::new(1.0, 0.9, 0.0), Vec3::new(0.9, 1.0, 0.0),
                    Vec3::new(-0.9, -1.0, 0.0), Vec3::new(-1.0, -0.9, 0.0),
                    Vec3::new(-1.0, 0.9, 0.0), Vec3::new(-0.9, 1.0, 0.0),
                    Vec3::new(0.9, -1.0, 0.0), Vec3::new(1.0, -0.9, 0.0),
                ],
                vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)],
                vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0)],
                vec![
                    // Solid side
                    Triangle::new([0, 3, 1], [1, 2, 0], 0),
                    Triangle::new([0, 3, 2], [1, 2, 3], 0),
                    // Cross-hatch strips on the other side
                    Triangle::new([4, 7, 5], [0, 3, 1], 1),
                    Triangle::new([4, 7, 6], [0, 3, 2], 1),
                    Triangle::new([8, 11, 9], [0, 3, 1], 1),
                    Triangle::new([8, 11, 10], [0, 3, 2], 1),
                ],
            )
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn tri_vertices(&self, i: usize) -> [Vec3; 3] {
        let t = &self.triangles[i];
        t.vertices.map(|v| self.vertices[v])
    }

    pub fn tri_uvs(&self, i: usize) -> [Vec2; 3] {
        let t = &self.triangles[i];
        t.uvs.map(|uv| self.uvs[uv])
    }

    pub fn tri_normal(&self, i: usize) -> Vec3 {
        self.normals[self.triangles[i].normal]
    }
}

/// Models registered by key
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    models: HashMap<String, Arc<Model>>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, replacing any previous one under the same key
    pub fn insert(&mut self, key: impl Into<String>, model: Model) -> Option<Arc<Model>> {
        self.models.insert(key.into(), Arc::new(model))
    }

    pub fn remove(&mut self, key: &str) -> Option<Arc<Model>> {
        self.models.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.models.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up a model, falling back to the error model
    pub fn get(&self, key: &str) -> &Model {
        match self.models.get(key) {
            Some(model) => model.as_ref(),
            None => Model::error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_tri() -> Model {
        Model::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec2::ZERO, Vec2::new(1.0, 0.0)],
            vec![Vec3::Z],
            vec![Triangle::new([0, 1, 2], [0, 1, 1], 0)],
        )
    }

    #[test]
    fn test_accessors_follow_indices() {
        let m = single_tri();
        assert_eq!(m.triangle_count(), 1);
        assert_eq!(m.tri_vertices(0), [Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(m.tri_uvs(0)[2], Vec2::new(1.0, 0.0));
        assert_eq!(m.tri_normal(0), Vec3::Z);
    }

    #[test]
    #[should_panic(expected = "normal")]
    fn test_bad_index_fails_fast() {
        Model::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec2::ZERO],
            vec![Vec3::Z],
            vec![Triangle::new([0, 1, 2], [0, 0, 0], 1)],
        );
    }

    #[test]
    fn test_bad_index_reported_from_ron() {
        let src = "(vertices: [(x: 0.0, y: 0.0, z: 0.0)], uvs: [(x: 0.0, y: 0.0)], normals: [(x: 0.0, y: 0.0, z: 1.0)], \
                   triangles: [(vertices: (0, 0, 3), uvs: (0, 0, 0), normal: 0)])";
        let err = ron::from_str::<Model>(src).unwrap_err();
        assert!(err.to_string().contains("vertex index 3"));
    }

    #[test]
    fn test_error_model_is_valid() {
        let m = Model::error();
        assert_eq!(m.triangle_count(), 6);
        for i in 0..m.triangle_count() {
            let n = m.tri_normal(i);
            assert!((n.len() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_library_falls_back_to_error_model() {
        let mut lib = ModelLibrary::new();
        lib.insert("tri", single_tri());
        assert_eq!(lib.get("tri").triangle_count(), 1);
        assert!(std::ptr::eq(lib.get("missing"), Model::error()));

        lib.insert("tri", Model::error().clone());
        assert_eq!(lib.get("tri").triangle_count(), 6);
        assert!(lib.remove("tri").is_some());
        assert!(lib.is_empty());
    }
}
