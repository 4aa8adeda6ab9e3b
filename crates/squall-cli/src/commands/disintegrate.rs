//! Headless disintegration playback, optionally dumping PNG frames

use anyhow::{Context, Result};
use image::{Rgba as Pixel, RgbaImage};
use squall_particles::{DisintegrationSystem, Raster};
use squall_runtime::{DisintegrationDriver, DriveStatus};
use std::path::{Path, PathBuf};

pub struct DisintegrateArgs {
    pub image: String,
    pub block: Option<u32>,
    pub fps: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frames: Option<String>,
    pub config: Option<String>,
}

pub fn run(args: DisintegrateArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?.disintegration;
    if let Some(block) = args.block {
        anyhow::ensure!(block > 0, "--block must be at least 1");
        config.block_size = block;
    }

    let source = image::open(&args.image)
        .with_context(|| format!("Failed to open image {}", args.image))?
        .to_rgba8();
    let (img_w, img_h) = source.dimensions();
    let raster = Raster::new(img_w, img_h, source.into_raw()).context("Failed to build raster")?;
    let width = args.width.unwrap_or(img_w);
    let height = args.height.unwrap_or(img_h);

    let frames_dir = match &args.frames {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create frames directory {}", dir))?;
            Some(PathBuf::from(dir))
        }
        None => None,
    };

    let mut driver = DisintegrationDriver::new(config);
    let count = driver.start(&raster, width, height);
    println!(
        "Decomposed {}x{} image at {}x{} into {} particles",
        img_w, img_h, width, height, count
    );

    let dt = 1.0 / args.fps.max(1) as f32;
    let mut frame = 0u32;
    loop {
        let status = driver.update(dt);
        if status != DriveStatus::Running {
            break;
        }
        frame += 1;

        let system = driver.system();
        println!(
            "frame {:>4}  progress {:.3}  active {:>6}  waiting {:>6}",
            frame,
            driver.progress(),
            system.active_particles().count(),
            system.inactive_particles().count()
        );

        if let Some(dir) = &frames_dir {
            let path = dir.join(format!("frame_{:04}.png", frame));
            write_frame(system, width, height, &path)?;
        }
    }

    println!("Finished after {} frames ({:.2}s)", frame, frame as f32 * dt);
    Ok(())
}

/// Draw every visible particle as a filled square
fn write_frame(system: &DisintegrationSystem, width: u32, height: u32, path: &Path) -> Result<()> {
    let mut img = RgbaImage::new(width, height);
    for p in system.particles().iter().filter(|p| p.alpha > 0) {
        let half = p.size * 0.5;
        let x0 = (p.x - half).floor().max(0.0) as u32;
        let y0 = (p.y - half).floor().max(0.0) as u32;
        let x1 = ((p.x + half).ceil().max(0.0) as u32).min(width);
        let y1 = ((p.y + half).ceil().max(0.0) as u32).min(height);
        let c = p.color;
        let alpha = ((c.a as u32 * p.alpha as u32) / 255) as u8;
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Pixel([c.r, c.g, c.b, alpha]));
            }
        }
    }
    img.save(path)
        .with_context(|| format!("Failed to save frame to {}", path.display()))?;
    Ok(())
}
