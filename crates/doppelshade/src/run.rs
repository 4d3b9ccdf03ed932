use anyhow::{bail, Context, Result};
use renderer::{
    FrameOutcome, InstanceId, LifecycleManager, LogicalSize, ManualClock, OffscreenSurface,
    PixelSize, SoftwareBackend, SurfaceId,
};
use scheduler::FrameQueue;
use stageconfig::StageConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{RenderArgs, RunArgs};
use crate::paths::AppPaths;

const FALLBACK_SIZE: (u32, u32) = (1280, 720);
const STILL_SURFACE: &str = "still";
const MAX_STILL_SECONDS: f64 = 365.0 * 24.0 * 60.0 * 60.0;
const MAX_STILL_EDGE: u32 = 16_384;
const MAX_STILL_PIXELS: u64 = 8_192 * 8_192;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let stage = resolve_stage(&args)?;
    for (surface, effect) in stage.unknown_effects() {
        tracing::warn!(surface = %surface, effect = %effect, "unknown effect in stage; the default will be used");
    }
    tracing::debug!(surfaces = stage.surfaces.len(), "resolved stage");
    renderer::run_windows(&stage)
}

fn resolve_stage(args: &RunArgs) -> Result<StageConfig> {
    let (width, height) = args.size.unwrap_or(FALLBACK_SIZE);
    if let Some(effect) = &args.effect {
        return Ok(StageConfig::single(effect, width, height));
    }
    if let Some(path) = &args.stage {
        return StageConfig::load(path)
            .with_context(|| format!("failed to load stage {}", path.display()));
    }

    let paths = AppPaths::discover()?;
    let stage_file = paths.stage_file();
    if stage_file.is_file() {
        tracing::info!(path = %stage_file.display(), "using stage file");
        return StageConfig::load(&stage_file)
            .with_context(|| format!("failed to load stage {}", stage_file.display()));
    }
    Ok(StageConfig::single(
        effects::DEFAULT_EFFECT.token(),
        width,
        height,
    ))
}

pub fn list_effects(json: bool) -> Result<()> {
    let catalogue = effects::catalogue();
    if json {
        let text = serde_json::to_string_pretty(&catalogue)
            .context("failed to serialise effect catalogue")?;
        println!("{text}");
        return Ok(());
    }

    println!("Effects:");
    for info in catalogue {
        let marker = if info.default { "*" } else { " " };
        println!("  {marker} {:<16} {}", info.token, info.description);
    }
    Ok(())
}

/// Drives one software instance through create, a single frame at
/// `args.time`, and teardown, then writes the drawn frame.
pub fn render_still(args: &RenderArgs) -> Result<()> {
    if !args.time.is_finite() || args.time < 0.0 {
        bail!("--time must be a non-negative number of seconds");
    }
    if args.time > MAX_STILL_SECONDS {
        bail!("--time must be at most {MAX_STILL_SECONDS} seconds");
    }
    if !args.dpr.is_finite() || args.dpr <= 0.0 {
        bail!("--dpr must be greater than zero");
    }
    let (width, height) = args.size;
    check_still_size(PixelSize::from_layout(
        LogicalSize::new(f64::from(width), f64::from(height)),
        args.dpr,
    ))?;

    let backend = SoftwareBackend::new();
    let clock = ManualClock::new();
    let mut manager = LifecycleManager::new(
        backend.clone(),
        FrameQueue::<InstanceId>::new(),
        clock.clone(),
    );

    let surface = OffscreenSurface::new(STILL_SURFACE, f64::from(width), f64::from(height))
        .with_device_pixel_ratio(args.dpr);
    let id = manager
        .create_instance(surface, args.effect.as_str())
        .context("failed to create still instance")?;

    clock.set_secs(args.time);
    let mut drawn = false;
    for due in manager.scheduler_mut().take_due() {
        if let FrameOutcome::Drawn { time } = manager.frame(due.id) {
            tracing::debug!(instance = %id, time, "still frame drawn");
            drawn = true;
        }
    }
    let frame = backend.latest_frame(&SurfaceId::new(STILL_SURFACE));
    manager.destroy_all();
    if !drawn {
        bail!("no frame was drawn for {id}");
    }

    let frame = frame.context("software backend produced no frame")?;
    frame
        .save_with_format(&args.output, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "wrote {}x{} frame to {}",
        frame.width(),
        frame.height(),
        args.output.display()
    );
    Ok(())
}

fn check_still_size(size: PixelSize) -> Result<()> {
    let pixels = u64::from(size.width) * u64::from(size.height);
    if size.width > MAX_STILL_EDGE || size.height > MAX_STILL_EDGE || pixels > MAX_STILL_PIXELS {
        bail!(
            "still frame of {size} exceeds the {MAX_STILL_EDGE}px edge or {MAX_STILL_PIXELS} pixel limit; lower --size or --dpr"
        );
    }
    Ok(())
}

pub fn print_paths() -> Result<()> {
    let paths = AppPaths::discover()?;
    let stage_file = paths.stage_file();
    println!("Configuration:");
    println!("  config: {}", paths.config_dir().display());
    println!(
        "  stage:  {}{}",
        stage_file.display(),
        if stage_file.is_file() { "" } else { " (missing)" }
    );
    Ok(())
}
