//! Core rendering functions
//!
//! A frame runs in two phases. Setup transforms every active triangle into
//! view space, culls back faces, clips against the near plane and projects
//! the survivors. Rasterization then walks each triangle's screen bounding
//! box, interpolates attributes perspective-correctly, depth tests and
//! shades. The framebuffer can be split into horizontal bands that are
//! rasterized on separate threads; each band owns disjoint rows of every
//! buffer, so no locking is needed.

use std::path::Path;

use super::clip::clip_near;
use super::math::{conversion_scale, point_in_triangle, project, Vec2, Vec3};
use super::types::RasterSettings;
use crate::scene::{Environment, Material, RenderContext, SceneError, Script, Transform};
use crate::shader::{Fragment, FragmentData, Shader};

/// Writes above this count saturate the overdraw heat map
const OVERDRAW_LIMIT: f32 = 8.0;
const OVER_OVERDRAW_COLOR: Vec3 = Vec3::new(1.0, 0.6, 0.6);
/// Shader-status colors
const SHADER_RETURN: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const SHADER_DISCARD: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Color (0xRRGGBB) and depth buffers for one frame
pub struct Framebuffer {
    pub pixels: Vec<u32>,
    /// Linear view-space depth, +inf where nothing was drawn
    pub depth: Vec<f32>,
    /// Writes per pixel, only counted in overdraw mode
    pub overdraw: Vec<u32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            depth: vec![f32::INFINITY; width * height],
            overdraw: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    /// Black color, infinite depth, zero overdraw
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.depth.fill(f32::INFINITY);
        self.overdraw.fill(0);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn get_depth(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    /// The whole buffer as a single band
    pub fn full_band(&mut self) -> FrameBand<'_> {
        FrameBand {
            y0: 0,
            rows: self.height,
            width: self.width,
            pixels: &mut self.pixels,
            depth: &mut self.depth,
            overdraw: &mut self.overdraw,
        }
    }

    /// Split into disjoint bands of `rows` rows (the last may be shorter)
    pub fn bands(&mut self, rows: usize) -> Vec<FrameBand<'_>> {
        if self.pixels.is_empty() {
            return Vec::new();
        }
        let rows = rows.max(1);
        let width = self.width;
        let chunk = rows * width;

        self.pixels
            .chunks_mut(chunk)
            .zip(self.depth.chunks_mut(chunk))
            .zip(self.overdraw.chunks_mut(chunk))
            .enumerate()
            .map(|(i, ((pixels, depth), overdraw))| FrameBand {
                y0: i * rows,
                rows: pixels.len() / width,
                width,
                pixels,
                depth,
                overdraw,
            })
            .collect()
    }

    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.get_pixel(x as usize, y as usize);
            image::Rgb([(c >> 16) as u8, (c >> 8) as u8, c as u8])
        })
    }

    /// Depth as grey, white at the camera fading to black at `max_depth`
    pub fn depth_image(&self, max_depth: f32) -> image::GrayImage {
        image::GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let d = self.get_depth(x as usize, y as usize);
            let v = if d.is_finite() { 1.0 - (d / max_depth).clamp(0.0, 1.0) } else { 0.0 };
            image::Luma([(v * 255.0) as u8])
        })
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Rows `y0..y0 + rows` of a framebuffer, exclusively borrowed
pub struct FrameBand<'a> {
    pub y0: usize,
    pub rows: usize,
    pub width: usize,
    pub pixels: &'a mut [u32],
    pub depth: &'a mut [f32],
    pub overdraw: &'a mut [u32],
}

/// Camera pose and lens
#[derive(Debug)]
pub struct Camera {
    pub transform: Transform,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub script: Option<Box<dyn Script>>,
}

impl Camera {
    pub fn new(transform: Transform, fov: f32) -> Self {
        Self { transform, fov, script: None }
    }

    /// World point into view space (camera at origin looking down +z)
    pub fn to_view(&self, v: Vec3) -> Vec3 {
        self.transform.to_view(v)
    }

    /// World direction into view space
    pub fn rotate_to_view(&self, v: Vec3) -> Vec3 {
        self.transform.inv_basis().rotate(v)
    }

    pub fn run_script(&mut self, dt: f32) {
        if let Some(script) = self.script.as_mut() {
            script.update(&mut self.transform, dt);
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Transform::default(), 90.0)
    }
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles of active objects
    pub triangles: usize,
    pub backface_culled: usize,
    /// Triangles entirely behind the near plane
    pub fully_clipped: usize,
    /// Triangles handed to the rasterizer after clipping
    pub emitted: usize,
    pub fragments_shaded: usize,
    pub fragments_discarded: usize,
    pub pixels_written: usize,
}

impl FrameStats {
    fn merge(&mut self, band: &FrameStats) {
        self.fragments_shaded += band.fragments_shaded;
        self.fragments_discarded += band.fragments_discarded;
        self.pixels_written += band.pixels_written;
    }
}

/// Projected triangle ready for rasterization
struct ScreenTriangle<'a> {
    /// Screen x, y plus view depth
    screen: [Vec3; 3],
    inv_depth: Vec3,
    /// Weights of each vertex into the source triangle
    weights: [Vec3; 3],
    /// Source triangle attributes
    uvs: [Vec2; 3],
    world: [Vec3; 3],
    normal: Vec3,
    material: &'a Material,
    object: usize,
    triangle: usize,
    /// Pixel bounds, end-exclusive, clamped to the framebuffer
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

impl<'a> ScreenTriangle<'a> {
    fn bounds(screen: &[Vec3; 3], width: usize, height: usize) -> (usize, usize, usize, usize) {
        let min_x = screen[0].x.min(screen[1].x).min(screen[2].x);
        let max_x = screen[0].x.max(screen[1].x).max(screen[2].x);
        let min_y = screen[0].y.min(screen[1].y).min(screen[2].y);
        let max_y = screen[0].y.max(screen[1].y).max(screen[2].y);

        // Float-to-usize casts saturate, so off-screen extents clamp to 0
        (
            min_x.floor().max(0.0) as usize,
            (max_x.ceil().min(width as f32)) as usize,
            min_y.floor().max(0.0) as usize,
            (max_y.ceil().min(height as f32)) as usize,
        )
    }
}

/// Transform, cull, clip and project every active triangle
fn setup_triangles<'a>(
    ctx: &'a RenderContext,
    settings: &RasterSettings,
    width: usize,
    height: usize,
    stats: &mut FrameStats,
) -> Vec<ScreenTriangle<'a>> {
    let camera = &ctx.camera;
    let conversion = conversion_scale(height, camera.fov);
    let center = Vec2::new(width as f32, height as f32) * 0.5;
    let mut out = Vec::new();

    for (object_idx, object) in ctx.objects.iter().enumerate() {
        if !object.active {
            continue;
        }
        let model = object.model(&ctx.models);
        let material = object.material();

        for t in 0..model.triangle_count() {
            stats.triangles += 1;

            let world = object.world_vertices(model, t);
            let normal = object.world_normal(model, t);
            let view = world.map(|v| camera.to_view(v));

            if settings.backface_cull && camera.rotate_to_view(normal).dot(view[0]) >= 0.0 {
                stats.backface_culled += 1;
                continue;
            }

            let clipped = clip_near(view, settings.near_clip);
            if clipped.is_empty() {
                stats.fully_clipped += 1;
                continue;
            }

            let uvs = object.tri_uvs(model, t);
            for part in clipped.as_slice() {
                let screen = part.positions.map(|v| project(v, center, conversion));
                let (min_x, max_x, min_y, max_y) = ScreenTriangle::bounds(&screen, width, height);
                stats.emitted += 1;
                out.push(ScreenTriangle {
                    screen,
                    inv_depth: Vec3::new(screen[0].z, screen[1].z, screen[2].z).inverse(),
                    weights: part.weights,
                    uvs,
                    world,
                    normal,
                    material,
                    object: object_idx,
                    triangle: t,
                    min_x,
                    max_x,
                    min_y,
                    max_y,
                });
            }
        }
    }
    out
}

/// Shared, read-only state for rasterizing bands
struct Raster<'a> {
    triangles: &'a [ScreenTriangle<'a>],
    environment: &'a Environment,
    settings: &'a RasterSettings,
    shader_override: Option<&'a dyn Shader>,
    width: usize,
    height: usize,
}

impl Raster<'_> {
    fn rasterize(&self, band: &mut FrameBand<'_>) -> FrameStats {
        let mut stats = FrameStats::default();
        let band_end = band.y0 + band.rows;

        for tri in self.triangles {
            let y_start = tri.min_y.max(band.y0);
            let y_end = tri.max_y.min(band_end);
            for y in y_start..y_end {
                for x in tri.min_x..tri.max_x {
                    self.shade_pixel(band, tri, x, y, &mut stats);
                }
            }
        }
        stats
    }

    fn shade_pixel(&self, band: &mut FrameBand<'_>, tri: &ScreenTriangle<'_>, x: usize, y: usize, stats: &mut FrameStats) {
        let [a, b, c] = tri.screen;
        let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        let Some(bary) = point_in_triangle(a.to_2d(), b.to_2d(), c.to_2d(), p) else {
            return;
        };

        // Perspective-correct depth and source-triangle weights
        let depth = 1.0 / bary.dot(tri.inv_depth);
        let idx = (y - band.y0) * band.width + x;
        if !self.settings.show_overdraw && !(depth < band.depth[idx]) {
            return;
        }
        let weights = (tri.weights[0] * (bary.x * tri.inv_depth.x)
            + tri.weights[1] * (bary.y * tri.inv_depth.y)
            + tri.weights[2] * (bary.z * tri.inv_depth.z))
            * depth;

        let material = tri.material;
        let raw_uv = tri.uvs[0] * weights.x + tri.uvs[1] * weights.y + tri.uvs[2] * weights.z;
        let frag = FragmentData {
            screen_uv: Vec2::new(x as f32 / self.width as f32, y as f32 / self.height as f32),
            weights,
            material,
            tri_uvs: tri.uvs,
            tex_uv: material.convert_uv(raw_uv),
            texture: material.texture(),
            world_normal: tri.normal,
            world_position: tri.world[0] * weights.x + tri.world[1] * weights.y + tri.world[2] * weights.z,
            depth,
            object: tri.object,
            triangle: tri.triangle,
            environment: self.environment,
        };

        let shader = self.shader_override.unwrap_or(material.shader.as_ref());
        let mut color = match shader.fragment(&frag) {
            Fragment::Color(color) => {
                stats.fragments_shaded += 1;
                if self.settings.shader_status { SHADER_RETURN } else { color }
            }
            Fragment::Discard => {
                stats.fragments_discarded += 1;
                if !self.settings.shader_status {
                    return;
                }
                SHADER_DISCARD
            }
        };

        if self.settings.show_overdraw {
            band.overdraw[idx] += 1;
            color = overdraw_color(band.overdraw[idx]);
        } else {
            band.depth[idx] = depth;
        }
        band.pixels[idx] = color.to_rgb();
        stats.pixels_written += 1;
    }
}

fn overdraw_color(count: u32) -> Vec3 {
    let c = count as f32;
    if c > OVERDRAW_LIMIT {
        OVER_OVERDRAW_COLOR
    } else {
        Vec3::splat(c / OVERDRAW_LIMIT)
    }
}

/// Render one frame of `ctx` into `fb`, resizing it to the settings.
///
/// With `settings.threads > 1` the buffer is split into that many
/// horizontal bands, each rasterized on a scoped thread; the result is
/// identical to the single-threaded path.
pub fn render_frame(fb: &mut Framebuffer, ctx: &RenderContext, settings: &RasterSettings) -> FrameStats {
    fb.resize(settings.width, settings.height);
    fb.clear();

    let mut stats = FrameStats::default();
    if fb.pixels.is_empty() {
        return stats;
    }
    let triangles = setup_triangles(ctx, settings, fb.width, fb.height, &mut stats);
    let override_shader = settings.shader_override.map(|kind| kind.build());

    let raster = Raster {
        triangles: &triangles,
        environment: &ctx.environment,
        settings,
        shader_override: override_shader.as_deref(),
        width: fb.width,
        height: fb.height,
    };

    let threads = settings.threads.clamp(1, fb.height.max(1));
    if threads == 1 {
        let band_stats = raster.rasterize(&mut fb.full_band());
        stats.merge(&band_stats);
    } else {
        let rows = fb.height.div_ceil(threads);
        let raster = &raster;
        let band_stats: Vec<FrameStats> = std::thread::scope(|s| {
            let handles: Vec<_> = fb
                .bands(rows)
                .into_iter()
                .map(|mut band| s.spawn(move || raster.rasterize(&mut band)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });
        for b in &band_stats {
            stats.merge(b);
        }
    }

    log::debug!(
        "frame: {} tris, {} culled, {} clipped away, {} emitted, {} shaded, {} discarded, {} written",
        stats.triangles,
        stats.backface_culled,
        stats.fully_clipped,
        stats.emitted,
        stats.fragments_shaded,
        stats.fragments_discarded,
        stats.pixels_written,
    );
    stats
}
