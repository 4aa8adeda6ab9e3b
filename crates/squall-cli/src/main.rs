//! Squall CLI - run, measure and preview the weather particle effects

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{disintegrate, run, simulate};
use squall_core::EffectKind;

#[derive(Parser)]
#[command(name = "squall")]
#[command(about = "Ambient weather particles and the disintegration transition", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a weather layer on its background worker and report counts
    Run {
        /// Effect to run (rain, snow, smoke)
        #[arg(value_parser = parse_effect)]
        effect: EffectKind,

        /// Viewport width in pixels
        #[arg(long, default_value = "1080")]
        width: f32,

        /// Viewport height in pixels
        #[arg(long, default_value = "1920")]
        height: f32,

        /// How long to run, in seconds
        #[arg(long, default_value = "5")]
        seconds: u64,

        /// Worker tick rate in Hz
        #[arg(long, default_value = "60")]
        rate: f64,

        /// TOML file overriding the built-in presets
        #[arg(long)]
        config: Option<String>,
    },

    /// Step a layer synchronously on a simulated clock and print stats
    Simulate {
        /// Effect to simulate (rain, snow, smoke)
        #[arg(value_parser = parse_effect)]
        effect: EffectKind,

        /// Number of ticks
        #[arg(long, default_value = "1200")]
        steps: u64,

        /// Ticks between reported samples
        #[arg(long, default_value = "120")]
        every: u64,

        /// Viewport width in pixels
        #[arg(long, default_value = "1080")]
        width: f32,

        /// Viewport height in pixels
        #[arg(long, default_value = "1920")]
        height: f32,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// TOML file overriding the built-in presets
        #[arg(long)]
        config: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Break an image into particles and play the transition headlessly
    Disintegrate {
        /// Path to a PNG or JPEG image
        image: String,

        /// Display pixels per particle (overrides the config)
        #[arg(long)]
        block: Option<u32>,

        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Display width in pixels (defaults to the image width)
        #[arg(long)]
        width: Option<u32>,

        /// Display height in pixels (defaults to the image height)
        #[arg(long)]
        height: Option<u32>,

        /// Directory to write one PNG per frame into
        #[arg(long)]
        frames: Option<String>,

        /// TOML file overriding the built-in presets
        #[arg(long)]
        config: Option<String>,
    },
}

fn parse_effect(s: &str) -> Result<EffectKind, String> {
    match s.parse::<EffectKind>() {
        Ok(EffectKind::None) => Err("'none' has no layer to run".to_string()),
        Ok(kind) => Ok(kind),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            effect,
            width,
            height,
            seconds,
            rate,
            config,
        } => run::run(run::RunArgs {
            effect,
            width,
            height,
            seconds,
            rate,
            config,
        }),
        Commands::Simulate {
            effect,
            steps,
            every,
            width,
            height,
            seed,
            config,
            json,
        } => simulate::run(simulate::SimulateArgs {
            effect,
            steps,
            every,
            width,
            height,
            seed,
            config,
            json,
        }),
        Commands::Disintegrate {
            image,
            block,
            fps,
            width,
            height,
            frames,
            config,
        } => disintegrate::run(disintegrate::DisintegrateArgs {
            image,
            block,
            fps,
            width,
            height,
            frames,
            config,
        }),
    }
}
