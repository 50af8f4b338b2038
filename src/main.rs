//! softrender: render a RON scene to PNG frames
//!
//! Usage: softrender [SCENE.ron] [options]
//!
//! Without a scene path the built-in demo scene is rendered.

use std::error::Error;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use softrender::rasterizer::{render_frame, FrameStats, Framebuffer};
use softrender::scene::{load_scene, load_scene_from_str, Scene};
use softrender::shader::ShaderKind;
use softrender::VERSION;

const DEMO_SCENE: &str = include_str!("../assets/demo.ron");

const USAGE: &str = "\
usage: softrender [SCENE.ron] [options]

options:
  --out PATH          output PNG (default frame.png; numbered when --frames > 1)
  --depth-out PATH    also write the depth buffer as a greyscale PNG
  --frames N          frames to render, advancing scripts between them (default 1)
  --dt SECONDS        time step per frame (default 0.0333)
  --threads N         rasterize in N horizontal bands in parallel
  --size WxH          override the render resolution
  --mode MODE         overdraw | status | unlit | lit | depth | normals | wireframe | uv | debug
  -h, --help          show this help";

/// Debug view selected on the command line
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Overdraw,
    Status,
    Shader(ShaderKind),
}

impl Mode {
    fn parse(s: &str) -> Option<Mode> {
        match s {
            "overdraw" => Some(Mode::Overdraw),
            "status" => Some(Mode::Status),
            _ => ShaderKind::from_name(s).map(Mode::Shader),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    scene: Option<PathBuf>,
    out: PathBuf,
    depth_out: Option<PathBuf>,
    frames: usize,
    dt: f32,
    threads: Option<usize>,
    size: Option<(usize, usize)>,
    mode: Option<Mode>,
    help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            scene: None,
            out: PathBuf::from("frame.png"),
            depth_out: None,
            frames: 1,
            dt: 1.0 / 30.0,
            threads: None,
            size: None,
            mode: None,
            help: false,
        }
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| format!("{} needs a value", name));
        match arg.as_str() {
            "-h" | "--help" => opts.help = true,
            "--out" => opts.out = PathBuf::from(value("--out")?),
            "--depth-out" => opts.depth_out = Some(PathBuf::from(value("--depth-out")?)),
            "--frames" => {
                let v = value("--frames")?;
                opts.frames = v.parse().map_err(|_| format!("bad frame count '{}'", v))?;
            }
            "--dt" => {
                let v = value("--dt")?;
                opts.dt = v.parse().map_err(|_| format!("bad time step '{}'", v))?;
            }
            "--threads" => {
                let v = value("--threads")?;
                let n: usize = v.parse().map_err(|_| format!("bad thread count '{}'", v))?;
                opts.threads = Some(n.max(1));
            }
            "--size" => {
                let v = value("--size")?;
                opts.size = Some(parse_size(&v).ok_or_else(|| format!("bad size '{}', expected WxH", v))?);
            }
            "--mode" => {
                let v = value("--mode")?;
                opts.mode = Some(Mode::parse(&v).ok_or_else(|| format!("unknown mode '{}'", v))?);
            }
            s if s.starts_with('-') => return Err(format!("unknown option '{}'", s)),
            _ if opts.scene.is_none() => opts.scene = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument '{}'", arg)),
        }
    }
    Ok(opts)
}

fn parse_size(s: &str) -> Option<(usize, usize)> {
    let (w, h) = s.split_once(['x', 'X'])?;
    let (w, h) = (w.trim().parse().ok()?, h.trim().parse().ok()?);
    (w > 0 && h > 0).then_some((w, h))
}

/// `out` for a single frame, `stem_0007.ext` otherwise
fn frame_path(out: &Path, frame: usize, frames: usize) -> PathBuf {
    if frames <= 1 {
        return out.to_path_buf();
    }
    let stem = out.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let ext = out.extension().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| "png".to_string());
    out.with_file_name(format!("{}_{:04}.{}", stem, frame, ext))
}

fn apply_options(scene: &mut Scene, opts: &Options) {
    let settings = &mut scene.settings;
    if let Some((w, h)) = opts.size {
        settings.width = w;
        settings.height = h;
    }
    if let Some(threads) = opts.threads {
        settings.threads = threads;
    }
    match opts.mode {
        Some(Mode::Overdraw) => settings.show_overdraw = true,
        Some(Mode::Status) => settings.shader_status = true,
        Some(Mode::Shader(kind)) => settings.shader_override = Some(kind),
        None => {}
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = parse_args(std::env::args().skip(1))?;
    if opts.help {
        println!("softrender v{}\n\n{}", VERSION, USAGE);
        return Ok(());
    }

    let mut scene = match &opts.scene {
        Some(path) => {
            log::info!("loading {}", path.display());
            load_scene(path)?
        }
        None => {
            log::info!("no scene given, rendering the built-in demo");
            load_scene_from_str(DEMO_SCENE)?
        }
    };
    apply_options(&mut scene, &opts);
    scene.settings.validate()?;

    let settings = &scene.settings;
    log::info!(
        "rendering {} frame(s) at {}x{} on {} thread(s)",
        opts.frames,
        settings.width,
        settings.height,
        settings.threads
    );

    let progress = if opts.frames > 1 {
        let pb = ProgressBar::new(opts.frames as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut fb = Framebuffer::new(settings.width, settings.height);
    let mut total = FrameStats::default();
    for frame in 0..opts.frames {
        if frame > 0 {
            scene.context.step(opts.dt);
        }
        let stats = render_frame(&mut fb, &scene.context, &scene.settings);
        total.pixels_written += stats.pixels_written;
        total.fragments_discarded += stats.fragments_discarded;

        let path = frame_path(&opts.out, frame, opts.frames);
        fb.save_png(&path)?;
        if let Some(depth_out) = &opts.depth_out {
            fb.depth_image(50.0).save(frame_path(depth_out, frame, opts.frames))?;
        }

        match &progress {
            Some(pb) => pb.inc(1),
            None => log::info!("wrote {} ({} pixels)", path.display(), stats.pixels_written),
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("done");
        log::info!(
            "wrote {} frames to {} ({} pixels, {} discarded fragments)",
            opts.frames,
            opts.out.display(),
            total.pixels_written,
            total.fragments_discarded
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let opts = parse_args(Vec::new()).unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_parse_all_options() {
        let opts = parse_args(args(
            "scene.ron --out a.png --frames 3 --dt 0.5 --threads 4 --size 64x32 --mode wireframe",
        ))
        .unwrap();
        assert_eq!(opts.scene, Some(PathBuf::from("scene.ron")));
        assert_eq!(opts.out, PathBuf::from("a.png"));
        assert_eq!(opts.frames, 3);
        assert_eq!(opts.dt, 0.5);
        assert_eq!(opts.threads, Some(4));
        assert_eq!(opts.size, Some((64, 32)));
        assert_eq!(opts.mode, Some(Mode::Shader(ShaderKind::Wireframe)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args("--frames")).is_err());
        assert!(parse_args(args("--size 10by10")).is_err());
        assert!(parse_args(args("--mode sparkle")).is_err());
        assert!(parse_args(args("--bogus")).is_err());
        assert!(parse_args(args("a.ron b.ron")).is_err());
    }

    #[test]
    fn test_frame_path_numbering() {
        let out = Path::new("renders/shot.png");
        assert_eq!(frame_path(out, 0, 1), PathBuf::from("renders/shot.png"));
        assert_eq!(frame_path(out, 7, 10), PathBuf::from("renders/shot_0007.png"));
    }

    #[test]
    fn test_demo_scene_loads() {
        let mut scene = load_scene_from_str(DEMO_SCENE).unwrap();
        assert!(!scene.context.objects.is_empty());

        let opts = parse_args(args("--mode overdraw --size 40x30")).unwrap();
        apply_options(&mut scene, &opts);
        assert!(scene.settings.show_overdraw);
        assert_eq!((scene.settings.width, scene.settings.height), (40, 30));

        let mut fb = Framebuffer::new(1, 1);
        let stats = render_frame(&mut fb, &scene.context, &scene.settings);
        assert!(stats.pixels_written > 0);
    }
}
