// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the preview pipeline
//!
//! This module provides command-line functionality for:
//! - Running an interactive preview in the terminal
//! - Benchmarking pipeline throughput without a display
//! - Rendering a single composited frame to a PNG file

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use viewfinder::compose::{Canvas, RenderingPolicy, ViewRotation};
use viewfinder::config::PreviewConfig;
use viewfinder::frame::{FrameRef, PixelFormat};
use viewfinder::pipeline::{RenderingState, Viewport};
use viewfinder::source::{
    CaptureLoop, LoopAction, PatternGenerator, SourceOptions, TestPattern, start_test_source,
};
use viewfinder::surface::{HeadlessSurface, Surface, TerminalSurface};

const DEFAULT_SAVE_FOLDER: &str = "viewfinder";

/// Command-line overrides applied on top of the stored configuration
#[derive(Debug, Default, Clone)]
pub struct RenderOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub policy: Option<String>,
    pub rotation: Option<i32>,
    pub pattern: Option<String>,
    pub no_fps_meter: bool,
}

impl RenderOverrides {
    fn apply(&self, config: &mut PreviewConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(name) = &self.policy {
            config.policy = RenderingPolicy::from_name(name).ok_or_else(|| {
                format!("unknown rendering policy '{name}' (expected 'efficiency' or 'view')")
            })?;
        }
        if let Some(degrees) = self.rotation {
            config.rotation = ViewRotation::from_degrees_int(degrees).ok_or_else(|| {
                format!("unsupported rotation '{degrees}' (expected a multiple of 90 degrees)")
            })?;
        }
        if let Some(name) = &self.pattern {
            config.pattern = TestPattern::from_name(name).ok_or_else(|| {
                format!("unknown test pattern '{name}' (expected 'bars', 'gradient' or 'solid')")
            })?;
        }
        if self.no_fps_meter {
            config.fps_meter = false;
        }
        Ok(())
    }
}

/// Run the interactive terminal preview
pub fn preview(overrides: RenderOverrides) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PreviewConfig::load();
    overrides.apply(&mut config)?;

    let viewport = configured_viewport(&config)?;
    let surface = Arc::new(TerminalSurface::new()?);
    viewport.on_surface_ready(Arc::clone(&surface) as Arc<dyn Surface>);
    viewport.activate()?;

    let mut source = start_test_source(
        Arc::clone(&viewport),
        SourceOptions {
            size: config.size(),
            fps: config.fps,
            pattern: config.pattern,
        },
    );

    update_status(&surface, &viewport);

    loop {
        if !source.is_running() {
            break;
        }
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char(' ') => {
                    if viewport.state() == RenderingState::Paused {
                        viewport.resume();
                    } else {
                        viewport.pause();
                    }
                    update_status(&surface, &viewport);
                }
                KeyCode::Char('p') => {
                    viewport.set_rendering_policy(viewport.rendering_policy().toggled());
                    update_status(&surface, &viewport);
                }
                KeyCode::Char('r') => {
                    viewport.set_optimized_rotation(viewport.optimized_rotation().next());
                    update_status(&surface, &viewport);
                }
                KeyCode::Char('f') => {
                    viewport.set_fps_meter_enabled(!viewport.fps_meter_enabled());
                }
                KeyCode::Char('s') => match surface.last_frame() {
                    Some(canvas) => match save_canvas_png(&canvas, None) {
                        Ok(path) => surface.set_status(format!("Saved {}", path.display())),
                        Err(e) => surface.set_status(format!("Save failed: {e}")),
                    },
                    None => surface.set_status("Nothing rendered yet"),
                },
                _ => {}
            }
        }
    }

    source.stop();
    viewport.deactivate();
    viewport.on_surface_destroyed();
    drop(surface);

    // Persist toggles changed during the session
    config.policy = viewport.rendering_policy();
    config.rotation = viewport.optimized_rotation();
    config.fps_meter = viewport.fps_meter_enabled();
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to persist preview settings");
    }

    Ok(())
}

/// Benchmark pipeline throughput without a display
pub fn bench(overrides: RenderOverrides, duration_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PreviewConfig::load();
    overrides.apply(&mut config)?;
    let size = config.size();

    let viewport = configured_viewport(&config)?;
    let surface = Arc::new(HeadlessSurface::new(size));
    viewport.on_surface_ready(Arc::clone(&surface) as Arc<dyn Surface>);
    viewport.activate()?;

    let interval = SourceOptions {
        size,
        fps: config.fps,
        pattern: config.pattern,
    }
    .interval();

    let mut generator = PatternGenerator::new(config.pattern, size);
    let mut scratch = vec![0u8; size.pixel_count() * 4];
    let posted = Arc::new(AtomicU64::new(0));
    let posted_in_loop = Arc::clone(&posted);
    let post_viewport = Arc::clone(&viewport);
    let mut source = CaptureLoop::start("bench-source", interval, move || {
        generator.fill(&mut scratch);
        let frame = FrameRef::new(&scratch, size, PixelFormat::Rgba);
        if let Err(e) = post_viewport.post(&frame) {
            warn!(error = %e, "Posting benchmark frame failed");
            return LoopAction::Stop;
        }
        posted_in_loop.fetch_add(1, Ordering::Relaxed);
        LoopAction::Continue
    });

    let stop_flag = source.stop_signal();
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    })?;

    println!(
        "Benchmarking {}x{} '{}' via '{}' for {}s (Ctrl+C to stop early)",
        size.width, size.height, config.pattern, config.policy, duration_secs
    );

    let started = Instant::now();
    let target = Duration::from_secs(duration_secs);
    while started.elapsed() < target && source.is_running() {
        let elapsed = started.elapsed().as_secs();
        print!(
            "\rRunning: {:02}:{:02}  presented: {}",
            elapsed / 60,
            elapsed % 60,
            surface.presented()
        );
        std::io::stdout().flush()?;
        std::thread::sleep(Duration::from_millis(100));
    }
    println!();

    source.stop();
    viewport.deactivate();

    let elapsed = started.elapsed().as_secs_f64();
    let posted_total = posted.load(Ordering::Relaxed);
    // The worker presents one idle fill before the first frame
    let presented_total = surface.presented().saturating_sub(1);
    let dropped = posted_total.saturating_sub(presented_total);

    println!(
        "Posted:    {posted_total} frames ({:.2} fps)",
        posted_total as f64 / elapsed
    );
    println!(
        "Presented: {presented_total} frames ({:.2} fps)",
        presented_total as f64 / elapsed
    );
    println!("Dropped:   {dropped} frames");

    Ok(())
}

/// Render one composited frame and save it as a PNG image
pub fn snapshot(
    overrides: RenderOverrides,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PreviewConfig::load();
    overrides.apply(&mut config)?;
    let size = config.size();

    let viewport = configured_viewport(&config)?;
    let surface = Arc::new(HeadlessSurface::recording(size));
    viewport.on_surface_ready(Arc::clone(&surface) as Arc<dyn Surface>);
    viewport.activate()?;

    let mut generator = PatternGenerator::new(config.pattern, size);
    let mut scratch = vec![0u8; size.pixel_count() * 4];
    generator.fill(&mut scratch);
    let frame = FrameRef::new(&scratch, size, PixelFormat::Rgba);

    // The worker presents one idle fill before the first frame; keep posting
    // until a composited frame has landed on top of it
    let deadline = Instant::now() + Duration::from_secs(5);
    while surface.presented() < 2 {
        viewport.post(&frame)?;
        if Instant::now() >= deadline {
            return Err("render worker produced no frame within 5s".into());
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    viewport.deactivate();

    let canvas = surface.last_frame().ok_or("no canvas was recorded")?;
    let path = save_canvas_png(&canvas, output)?;
    println!("Snapshot saved to {}", path.display());

    Ok(())
}

fn configured_viewport(config: &PreviewConfig) -> Result<Arc<Viewport>, Box<dyn std::error::Error>> {
    let viewport = Arc::new(Viewport::new());
    viewport.set_size(config.size())?;
    viewport.set_rendering_policy(config.policy);
    viewport.set_optimized_rotation(config.rotation);
    viewport.set_fps_meter_enabled(config.fps_meter);
    Ok(viewport)
}

fn update_status(surface: &TerminalSurface, viewport: &Viewport) {
    surface.set_status(format!(
        "{} | {} {} | space:pause p:policy r:rotate f:meter s:save q:quit",
        viewport.state(),
        viewport.rendering_policy(),
        viewport.optimized_rotation(),
    ));
}

/// Encode a composited canvas as PNG at `output`, or at a timestamped path
/// in the default save folder when no path is given
fn save_canvas_png(
    canvas: &Canvas,
    output: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let size = canvas.size();
    let image: image::RgbaImage =
        image::ImageBuffer::from_raw(size.width, size.height, canvas.data().to_vec())
            .ok_or("canvas buffer does not match its dimensions")?;

    let path = match output {
        Some(path) => path,
        None => {
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            default_save_dir().join(format!("snapshot_{timestamp}.png"))
        }
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    image.save(&path)?;
    info!(path = %path.display(), "Snapshot written");

    Ok(path)
}

/// Default directory for saved snapshots
fn default_save_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}
