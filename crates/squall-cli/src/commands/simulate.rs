//! Deterministic, single-threaded layer simulation with a stats report

use anyhow::{Context, Result};
use serde::Serialize;
use squall_core::EffectKind;
use squall_particles::{EffectLayer, LayerStats};

pub struct SimulateArgs {
    pub effect: EffectKind,
    pub steps: u64,
    pub every: u64,
    pub width: f32,
    pub height: f32,
    pub seed: Option<u64>,
    pub config: Option<String>,
    pub json: bool,
}

#[derive(Serialize)]
struct Sample {
    time_ms: u64,
    on_screen: usize,
    #[serde(flatten)]
    stats: LayerStats,
}

#[derive(Serialize)]
struct Report {
    effect: EffectKind,
    width: f32,
    height: f32,
    step_ms: f64,
    samples: Vec<Sample>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let effects = super::load_config(args.config.as_deref())?;
    let config = effects
        .layer(args.effect)
        .context("No layer config for this effect")?
        .clone();
    let step_ms = config.step_dt as f64 * 1000.0;

    let mut layer = match args.seed {
        Some(seed) => EffectLayer::with_seed(args.effect, config, args.width, args.height, seed),
        None => EffectLayer::new(args.effect, config, args.width, args.height),
    }
    .context("Failed to build layer")?;
    layer.initialize(0).context("Failed to initialize layer")?;

    let every = args.every.max(1);
    let mut positions = Vec::new();
    let mut samples = Vec::new();
    for step in 1..=args.steps {
        let now = (step as f64 * step_ms) as u64;
        layer.tick(now).with_context(|| format!("Tick {} failed", step))?;

        if step % every == 0 || step == args.steps {
            layer.snapshot_into(&mut positions);
            let on_screen = positions
                .iter()
                .filter(|p| p.x >= 0.0 && p.x <= args.width && p.y >= 0.0 && p.y <= args.height)
                .count();
            samples.push(Sample {
                time_ms: now,
                on_screen,
                stats: layer.stats(),
            });
        }
    }

    let report = Report {
        effect: args.effect,
        width: args.width,
        height: args.height,
        step_ms,
        samples,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Simulated {} ticks of {} at {}x{} ({:.2} ms/tick)",
            args.steps, report.effect, report.width, report.height, report.step_ms
        );
        for s in &report.samples {
            println!(
                "t={:>7} ms  particles {:>5}  on screen {:>5}  groups {:>3}  recycled {:>5}  wind {:+.2}",
                s.time_ms, s.stats.particles, s.on_screen, s.stats.groups, s.stats.recycled_total, s.stats.wind
            );
        }
    }
    Ok(())
}
