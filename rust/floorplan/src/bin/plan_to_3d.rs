// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: turn a floor plan detection into a 3D scene (OBJ output)
//!
//! Reads a detection JSON produced by the vision model (or the built-in
//! sample dataset), then writes the OBJ scene and, on request, the room
//! export, an SVG overlay and a PNG overlay preview.
//!
//! Usage:
//!   plan-to-3d detection.json --image plan.png --output plan.obj
//!   plan-to-3d --mock --overlay overlay.svg --preview preview.png

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use planlite_floorplan::overlay::PixelPoint;
use planlite_floorplan::{
    write_obj, Confidence, DetectionError, DetectionOutcome, DetectionResult, Detector,
    MockDetector, Overlay, PlanSession, SceneConfig, SourceImage, Unit,
};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Canvas size used when no source image is given
const DEFAULT_CANVAS: u32 = 1000;

#[derive(Parser)]
#[command(name = "plan-to-3d")]
#[command(about = "Build a 3D scene from a floor plan detection")]
struct Args {
    /// Detection JSON file (rooms, walls, doors, windows)
    #[arg(required_unless_present = "mock")]
    detection: Option<PathBuf>,

    /// Use the built-in sample dataset instead of a detection file
    #[arg(long, conflicts_with = "detection")]
    mock: bool,

    /// Source floor plan image; sizes the overlay and backs the preview
    #[arg(long)]
    image: Option<PathBuf>,

    /// Rendered image width in pixels (defaults to the natural width)
    #[arg(long)]
    display_width: Option<u32>,

    /// Global room scale
    #[arg(long)]
    scale: Option<f64>,

    /// Display unit: m, cm, mm or ft
    #[arg(long)]
    unit: Option<Unit>,

    /// Side length in meters of the square the plan is stretched onto
    #[arg(long)]
    plan_size: Option<f64>,

    /// Default wall height in meters
    #[arg(long)]
    wall_height: Option<f64>,

    /// OBJ output path
    #[arg(short, long, default_value = "plan.obj")]
    output: PathBuf,

    /// Write the room export JSON here
    #[arg(long)]
    export: Option<PathBuf>,

    /// Write the SVG overlay here
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Write a PNG of the overlay drawn onto the image here
    #[arg(long)]
    preview: Option<PathBuf>,
}

/// Detector backed by a JSON file on disk
struct FileDetector {
    path: PathBuf,
}

impl Detector for FileDetector {
    fn detect(&self, _image: &SourceImage) -> std::result::Result<DetectionResult, DetectionError> {
        let json = fs::read_to_string(&self.path)
            .map_err(|e| DetectionError::Transport(format!("{}: {}", self.path.display(), e)))?;
        DetectionResult::from_json(&json).map_err(|e| DetectionError::Transport(e.to_string()))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let config = scene_config(args);
    let mut session = PlanSession::new(config);

    let image = load_source_image(args)?;
    let (natural_w, natural_h) = (image.width, image.height);
    session.load_image(image);

    let outcome = if args.mock {
        session.run_detection(&MockDetector)?
    } else {
        let path = args
            .detection
            .clone()
            .context("a detection file or --mock is required")?;
        session.run_detection(&FileDetector { path })?
    };
    if let DetectionOutcome::Failed(err) = outcome {
        bail!("{}", err.user_message());
    }

    let store = session.store().context("detection produced no geometry")?;
    println!(
        "Detected {} rooms, {} walls, {} doors, {} windows ({:.1} m² floor area)",
        store.rooms().len(),
        store.walls().len(),
        store.doors().len(),
        store.windows().len(),
        store.total_area()
    );
    if let Some(summary) = store.summary() {
        println!("  {}", summary);
    }
    if store.used_mock() {
        println!("  Using the sample dataset");
    }

    let scene = session.build_scene()?;
    let file = fs::File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    write_obj(&scene, BufWriter::new(file))?;
    let bounds = scene.bounds();
    if !bounds.is_empty() {
        let size = bounds.size();
        println!(
            "Wrote {} ({} objects, {:.1} x {:.1} x {:.1} m)",
            args.output.display(),
            scene.node_count(),
            size.x,
            size.y,
            size.z
        );
    }

    if let Some(path) = &args.export {
        write_text(path, &session.export_rooms()?)?;
        println!("Wrote {}", path.display());
    }

    if args.overlay.is_some() || args.preview.is_some() {
        let mapper = session.observe_overlay();
        let (width, height) = rendered_size(natural_w, natural_h, args.display_width);
        session.notify_resize(width as f64, height as f64);
        let overlay = session.overlay(&mapper);

        if let Some(path) = &args.overlay {
            write_text(path, &overlay.to_svg())?;
            println!("Wrote {}", path.display());
        }
        if let Some(path) = &args.preview {
            save_preview(&overlay, args.image.as_deref(), width, height, path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Environment first, then command-line overrides
fn scene_config(args: &Args) -> SceneConfig {
    let mut config = SceneConfig::from_env();
    let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
    if let Some(scale) = positive(args.scale) {
        config.scale = scale;
    }
    if let Some(plan_size) = positive(args.plan_size) {
        config.plan_size = plan_size;
    }
    if let Some(height) = positive(args.wall_height) {
        config.default_wall_height = height;
    }
    if let Some(unit) = args.unit {
        config.unit = unit;
    }
    config
}

fn load_source_image(args: &Args) -> Result<SourceImage> {
    match &args.image {
        Some(path) => {
            let (width, height) = image::image_dimensions(path)
                .with_context(|| format!("cannot read image {}", path.display()))?;
            let bytes = fs::read(path)?;
            Ok(SourceImage::new(file_name(path), width, height, bytes))
        }
        None => {
            let name = args
                .detection
                .as_deref()
                .map(file_name)
                .unwrap_or_else(|| "sample".to_string());
            Ok(SourceImage::new(name, DEFAULT_CANVAS, DEFAULT_CANVAS, Vec::new()))
        }
    }
}

fn rendered_size(natural_w: u32, natural_h: u32, display_width: Option<u32>) -> (u32, u32) {
    match display_width.filter(|w| *w > 0) {
        Some(w) => {
            let h = (natural_h as f64 * w as f64 / natural_w.max(1) as f64).round() as u32;
            (w, h.max(1))
        }
        None => (natural_w.max(1), natural_h.max(1)),
    }
}

fn save_preview(
    overlay: &Overlay,
    image_path: Option<&Path>,
    width: u32,
    height: u32,
    path: &Path,
) -> Result<()> {
    let mut canvas = match image_path {
        Some(p) => image::open(p)?
            .resize_exact(width, height, image::imageops::FilterType::Triangle)
            .to_rgb8(),
        None => RgbImage::from_pixel(width, height, Rgb([255, 255, 255])),
    };

    for room in &overlay.rooms {
        if let Some(rect) = pixel_rect(room.rect.x, room.rect.y, room.rect.width, room.rect.height)
        {
            draw_hollow_rect_mut(&mut canvas, rect, confidence_rgb(room.confidence));
        }
    }

    for wall in &overlay.walls {
        draw_outline(&mut canvas, &wall.outline, confidence_rgb(wall.confidence));
    }

    for (openings, color) in [
        (&overlay.doors, Rgb([192, 57, 43])),
        (&overlay.windows, Rgb([41, 128, 185])),
    ] {
        for opening in openings {
            let r = &opening.rect;
            if let Some(rect) = pixel_rect(r.x, r.y, r.width, r.height) {
                draw_filled_rect_mut(&mut canvas, rect, color);
            }
        }
    }

    canvas
        .save(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

/// Closed outline drawn edge by edge; corners may coincide on thin walls
fn draw_outline(canvas: &mut RgbImage, outline: &[PixelPoint], color: Rgb<u8>) {
    for (i, a) in outline.iter().enumerate() {
        let b = &outline[(i + 1) % outline.len()];
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
    }
}

fn pixel_rect(x: f64, y: f64, w: f64, h: f64) -> Option<Rect> {
    let (w, h) = (w.round() as u32, h.round() as u32);
    (w > 0 && h > 0).then(|| Rect::at(x.round() as i32, y.round() as i32).of_size(w, h))
}

fn confidence_rgb(confidence: Confidence) -> Rgb<u8> {
    match confidence {
        Confidence::High => Rgb([39, 174, 96]),
        Confidence::Low => Rgb([230, 126, 34]),
        Confidence::Manual => Rgb([44, 111, 219]),
    }
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
