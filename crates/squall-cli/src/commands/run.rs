//! Run a layer on its worker thread, printing counts once per second

use anyhow::{Context, Result};
use squall_core::EffectKind;
use squall_runtime::EffectHost;
use std::thread;
use std::time::Duration;

pub struct RunArgs {
    pub effect: EffectKind,
    pub width: f32,
    pub height: f32,
    pub seconds: u64,
    pub rate: f64,
    pub config: Option<String>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;

    let mut host = EffectHost::new(config, args.rate);
    host.set_viewport(args.width, args.height)
        .context("Invalid viewport")?;
    host.apply(args.effect)
        .with_context(|| format!("Failed to start {} layer", args.effect))?;

    println!(
        "Running {} at {}x{} ({} Hz) for {}s",
        args.effect, args.width, args.height, args.rate, args.seconds
    );

    let mut positions = Vec::new();
    for second in 1..=args.seconds {
        thread::sleep(Duration::from_secs(1));
        host.snapshot_into(&mut positions);
        let on_screen = positions
            .iter()
            .filter(|p| p.x >= 0.0 && p.x <= args.width && p.y >= 0.0 && p.y <= args.height)
            .count();
        if let Some(stats) = host.stats() {
            println!(
                "[{:>3}s] ticks {:>6}  particles {:>5}  on screen {:>5}  recycled {:>5}  wind {:+.2}",
                second, stats.ticks, stats.particles, on_screen, stats.recycled_total, stats.wind
            );
        }
    }

    host.dispose();
    println!("Stopped.");
    Ok(())
}
