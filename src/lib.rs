//! softrender: CPU-only software 3D rasterizer
//!
//! Renders triangle meshes into an in-memory framebuffer:
//! - Near-plane clipping and back-face culling
//! - Perspective-correct attribute interpolation
//! - Depth buffering with per-material fragment shaders
//! - Overdraw and shader-status debug views
//! - Optional multi-threaded rasterization over horizontal bands
//!
//! Scenes are described in RON files (see `scene::load_scene`).

pub mod rasterizer;
pub mod scene;
pub mod shader;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
