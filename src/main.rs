// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "viewfinder")]
#[command(about = "Camera preview pipeline with a terminal viewfinder")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the animated test source in the terminal
    Preview {
        #[command(flatten)]
        render: RenderArgs,
    },

    /// Measure pipeline throughput without a display
    Bench {
        #[command(flatten)]
        render: RenderArgs,

        /// Benchmark duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,
    },

    /// Save one composited frame as a PNG image
    Snapshot {
        #[command(flatten)]
        render: RenderArgs,

        /// Output file path (default: ~/Pictures/viewfinder/snapshot_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Rendering options shared by all commands; unset options fall back to the
/// saved configuration
#[derive(Args)]
struct RenderArgs {
    /// Frame width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Source frame rate (0 runs unpaced)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Rendering policy: 'efficiency' or 'view'
    #[arg(short, long)]
    policy: Option<String>,

    /// View rotation in degrees (0, 90, 180 or 270)
    #[arg(short, long)]
    rotation: Option<i32>,

    /// Test pattern: 'bars', 'gradient' or 'solid'
    #[arg(long)]
    pattern: Option<String>,

    /// Disable the on-frame FPS meter
    #[arg(long)]
    no_fps_meter: bool,
}

impl From<RenderArgs> for cli::RenderOverrides {
    fn from(args: RenderArgs) -> Self {
        cli::RenderOverrides {
            width: args.width,
            height: args.height,
            fps: args.fps,
            policy: args.policy,
            rotation: args.rotation,
            pattern: args.pattern,
            no_fps_meter: args.no_fps_meter,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=viewfinder=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Preview { render }) => cli::preview(render.into()),
        Some(Commands::Bench { render, duration }) => cli::bench(render.into(), duration),
        Some(Commands::Snapshot { render, output }) => cli::snapshot(render.into(), output),
        None => cli::preview(cli::RenderOverrides::default()),
    }
}
