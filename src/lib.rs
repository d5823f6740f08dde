//! # millpath
//!
//! A 2.5D milling toolpath generator for stepper-driven mills. Each input
//! image is a silhouette to keep; everything else is carved away one depth
//! level at a time, and the tool motion is written as a compact text
//! command stream for an external controller.
//!
//! ## Architecture
//!
//! millpath is organized as a workspace with multiple crates:
//!
//! 1. **millpath-core** - Pixel geometry, machine profiles, the motion sink trait
//! 2. **millpath-camtools** - Grid, removal evaluator, walker, planner, level carver
//! 3. **millpath-communication** - Motion compiler, command buffer, stream replay
//! 4. **millpath-settings** - Configuration files
//! 5. **millpath** - Main binary that integrates all crates

pub mod types;

use anyhow::{bail, Context};
use millpath_camtools::{CarveParameters, LevelCarver, LevelReport, TargetMask};
use millpath_communication::{CommandReplay, MachineState, MotionCompiler, MotionParameters};
use millpath_settings::Config;
use std::io::Write;
use std::path::{Path, PathBuf};

pub use millpath_camtools::{CamToolError, Grid, GridSnapshot};
pub use millpath_core::{Direction, DriftCompensation, Error, MotionSink, Point, Result};
pub use types::RunOptions;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Raster resolution of the target images, one pixel is 0.1 mm
pub const PIXELS_PER_MM: f64 = 10.0;

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, stdout carries the command stream
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))?;

    Ok(())
}

/// Carving parameters from the tool and strategy sections
pub fn carve_parameters(config: &Config) -> CarveParameters {
    CarveParameters {
        tool_radius: config.tool.radius,
        orthogonal_weight: config.strategy.orthogonal_weight,
        target_proximity_factor: config.strategy.target_proximity_factor,
    }
}

/// Motion compiler parameters from the machine section
pub fn motion_parameters(config: &Config) -> MotionParameters {
    MotionParameters {
        drift: config.machine.drift,
        plunge: config.machine.plunge,
        cruise: config.machine.cruise,
        z_increment: config.machine.z_increment,
        backlash: config.machine.backlash,
        line_budget: config.machine.line_budget,
    }
}

/// Carve every image in turn, one depth step deeper each time
///
/// Image `i` (counting from 1) is carved at `i * depth_step`. When
/// `snapshot_dir` is set a PNG of the final grid of every level is written
/// there. Returns the writer and one report per level.
pub fn carve_images<W: Write>(
    config: &Config,
    images: &[PathBuf],
    writer: W,
    snapshot_dir: Option<&Path>,
) -> anyhow::Result<(W, Vec<LevelReport>)> {
    config.validate()?;
    let carver = LevelCarver::new(carve_parameters(config))?;
    let mut compiler = MotionCompiler::new(writer, motion_parameters(config));

    if let Some(dir) = snapshot_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create snapshot directory {}", dir.display()))?;
    }

    let mut reports = Vec::with_capacity(images.len());
    for (index, path) in images.iter().enumerate() {
        let level = index as i32 + 1;
        let depth = level * config.machine.depth_step;
        let mask = TargetMask::load(path)
            .with_context(|| format!("cannot load target image {}", path.display()))?;
        tracing::info!(
            "Carving {} ({}x{}) at depth {}",
            path.display(),
            mask.width(),
            mask.height(),
            depth
        );

        let carved = carver
            .carve_mask(&mask, &mut compiler, depth)
            .with_context(|| format!("carving {} failed", path.display()))?;

        if let Some(dir) = snapshot_dir {
            let file = dir.join(format!("level-{:02}-depth-{}.png", level, depth));
            carved.grid.snapshot().save_png(&file)?;
            tracing::debug!("Snapshot written to {}", file.display());
        }
        reports.push(carved.report);
    }

    let writer = compiler.into_inner()?;
    Ok((writer, reports))
}

/// Parse `stream` back and check it against the configuration
///
/// The stream must respect the line budget and leave the tool at rest at
/// the origin.
pub fn verify_stream(stream: &str, config: &Config) -> anyhow::Result<CommandReplay> {
    let replay = CommandReplay::parse(stream, config.machine.drift)?;
    if replay.max_line_len() > config.machine.line_budget {
        bail!(
            "longest line has {} bytes, budget is {}",
            replay.max_line_len(),
            config.machine.line_budget
        );
    }
    let end = replay.final_state();
    if end != MachineState::default() {
        bail!(
            "stream ends at x{} y{} z{} instead of the rest position",
            end.x,
            end.y,
            end.z
        );
    }
    tracing::info!(
        "Verified {} lines, {} tool positions, trajectory {:.1} mm",
        replay.line_count(),
        replay.positions().len(),
        replay.travel_length() as f64 / PIXELS_PER_MM
    );
    Ok(replay)
}

/// Run the command-line program
pub fn run(options: &RunOptions) -> anyhow::Result<()> {
    let config = Config::load_or_default(options.config.as_deref())
        .context("cannot load configuration")?;

    let (stream, reports) = carve_images(
        &config,
        &options.images,
        Vec::new(),
        options.snapshot_dir.as_deref(),
    )?;

    for report in &reports {
        if report.abandoned > 0 {
            tracing::warn!(
                "{} targets at depth {} could not be reached",
                report.abandoned,
                report.depth
            );
        }
    }

    if options.verify {
        let text = std::str::from_utf8(&stream).context("command stream is not UTF-8")?;
        verify_stream(text, &config)?;
    }

    match &options.output {
        Some(path) => std::fs::write(path, &stream)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&stream)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
