//! Software triangle rasterizer
//!
//! Features:
//! - Near-plane clipping with barycentric weight tracking
//! - Perspective-correct depth, UV and world-position interpolation
//! - Z-buffer with strict less-than test
//! - Back-face culling
//! - Overdraw and shader-status debug views
//! - Horizontal band parallelism over disjoint framebuffer rows

mod clip;
mod math;
mod render;
mod types;

pub use clip::*;
pub use math::*;
pub use render::*;
pub use types::*;

/// Default view-space distance of the near clip plane
pub const NEAR_CLIP_DST: f32 = 0.01;
