//! Scene description: placed objects, meshes, materials and lighting
//!
//! Objects reference models by key in a `ModelLibrary`. Materials and
//! textures are shared through `Arc` so many objects can use one without
//! copying pixel data.

mod context;
mod environment;
mod file;
mod material;
mod model;
mod object;
mod transform;

pub use context::*;
pub use environment::*;
pub use file::*;
pub use material::*;
pub use model::*;
pub use object::*;
pub use transform::*;
