//! Raster disintegration: a captured image is broken into a grid of colored
//! particles that peel away in a directional wave as progress advances.
//!
//! No physics engine is involved; each particle runs simple kinematics once
//! its activation delay has been reached.

use serde::{Deserialize, Serialize};
use squall_core::{Result, Rgba, SquallError};

use crate::curves::{clamp01, lerp_f32};
use crate::rand::ParticleRng;

/// A captured RGBA8 snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Wrap tightly packed RGBA8 pixels
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(SquallError::InvalidRaster(format!(
                "{}x{} RGBA needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Raster filled with a single color
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let pixels = color
            .to_array()
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at (x, y); callers keep coordinates in range
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Rgba {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Rgba::from_slice(&self.pixels[idx..idx + 4])
    }

    #[cfg(test)]
    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }
}

/// Tuning for decomposition and flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisintegrationConfig {
    /// Display pixels represented by one particle
    pub block_size: u32,
    /// Samples with alpha below this are skipped
    pub alpha_cutoff: u8,
    /// Seconds from activation until a particle is fully faded
    pub max_life_time: f32,
    /// Progress fraction at which a delay of 1.0 activates
    pub activation_threshold: f32,
    pub size_jitter: f32,
    /// Amplitude of the vertical sine term added to the delay
    pub delay_wave: f32,
    /// Random extra delay
    pub delay_jitter: f32,
    /// Launch angle range in radians (0 points right, +y is down)
    pub angle_min: f32,
    pub angle_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Upward kick added on launch, px/s
    pub lift: f32,
    /// px/s²
    pub gravity: f32,
    /// Turbulence strength per axis, px/s²
    pub jitter: [f32; 2],
    /// Per-tick velocity multiplier
    pub damping: f32,
    /// Fraction of the size lost by the end of life
    pub shrink: f32,
}

impl Default for DisintegrationConfig {
    fn default() -> Self {
        Self {
            block_size: 4,
            alpha_cutoff: 10,
            max_life_time: 0.8,
            activation_threshold: 0.7,
            size_jitter: 2.0,
            delay_wave: 0.1,
            delay_jitter: 0.15,
            angle_min: -0.2,
            angle_max: 0.6,
            speed_min: 50.0,
            speed_max: 150.0,
            lift: 30.0,
            gravity: 100.0,
            jitter: [20.0, 10.0],
            damping: 0.99,
            shrink: 0.3,
        }
    }
}

/// One block of the source image
#[derive(Debug, Clone, PartialEq)]
pub struct DisintegrationParticle {
    pub x: f32,
    pub y: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub color: Rgba,
    pub size: f32,
    pub base_size: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    /// 0..=255; 0 means fully decayed
    pub alpha: u8,
    /// Activation delay in [0, 1]
    pub delay: f32,
    pub active: bool,
    pub life_time: f32,
}

impl DisintegrationParticle {
    pub fn is_decayed(&self) -> bool {
        self.active && self.alpha == 0
    }

    /// Active and still visible
    pub fn is_flying(&self) -> bool {
        self.active && self.alpha > 0
    }
}

/// Break a raster into particles, one per `block_size` block of the display area.
///
/// The raster may be scaled differently from the display; samples are taken
/// at the proportional position. Degenerate input yields an empty set.
pub fn decompose(
    raster: &Raster,
    display_width: u32,
    display_height: u32,
    config: &DisintegrationConfig,
    rng: &mut ParticleRng,
) -> Vec<DisintegrationParticle> {
    if raster.is_empty() || display_width == 0 || display_height == 0 {
        return Vec::new();
    }

    let block = config.block_size.max(1);
    let scale_x = raster.width() as f32 / display_width as f32;
    let scale_y = raster.height() as f32 / display_height as f32;
    let cols = display_width.div_ceil(block) as usize;
    let rows = display_height.div_ceil(block) as usize;

    let mut particles = Vec::with_capacity(cols * rows);
    for y in (0..display_height).step_by(block as usize) {
        for x in (0..display_width).step_by(block as usize) {
            let sx = ((x as f32 * scale_x) as u32).min(raster.width() - 1);
            let sy = ((y as f32 * scale_y) as u32).min(raster.height() - 1);
            let color = raster.pixel(sx, sy);
            if color.a < config.alpha_cutoff {
                continue;
            }

            let nx = x as f32 / display_width as f32;
            let ny = y as f32 / display_height as f32;
            let delay = clamp01(
                (1.0 - nx)
                    + (ny * std::f32::consts::PI).sin() * config.delay_wave
                    + rng.next_f32() * config.delay_jitter,
            );
            let size = block as f32 + rng.next_f32() * config.size_jitter;

            particles.push(DisintegrationParticle {
                x: x as f32,
                y: y as f32,
                origin_x: x as f32,
                origin_y: y as f32,
                color,
                size,
                base_size: size,
                velocity_x: 0.0,
                velocity_y: 0.0,
                alpha: 255,
                delay,
                active: false,
                life_time: 0.0,
            });
        }
    }
    particles
}

/// Owns the particles of one disintegration transition
pub struct DisintegrationSystem {
    config: DisintegrationConfig,
    rng: ParticleRng,
    particles: Vec<DisintegrationParticle>,
    initialized: bool,
}

impl DisintegrationSystem {
    pub fn new(config: DisintegrationConfig) -> Self {
        Self::with_rng(config, ParticleRng::from_os())
    }

    pub fn with_rng(config: DisintegrationConfig, rng: ParticleRng) -> Self {
        Self {
            config,
            rng,
            particles: Vec::new(),
            initialized: false,
        }
    }

    pub fn config(&self) -> &DisintegrationConfig {
        &self.config
    }

    /// Decompose `raster` into this system's particle set, replacing any previous one.
    /// Returns the particle count; zero means the transition is already complete.
    pub fn init_from_raster(&mut self, raster: &Raster, display_width: u32, display_height: u32) -> usize {
        self.particles = decompose(
            raster,
            display_width,
            display_height,
            &self.config,
            &mut self.rng,
        );
        self.initialized = true;
        log::debug!(
            "disintegration: {} particles from {}x{} raster",
            self.particles.len(),
            raster.width(),
            raster.height()
        );
        self.particles.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Advance every particle by `dt` seconds at the given overall progress (0..=1)
    pub fn update(&mut self, progress: f32, dt: f32) {
        if !self.initialized {
            return;
        }
        let dt = dt.max(0.0);
        let cfg = &self.config;
        let rng = &mut self.rng;

        for p in self.particles.iter_mut() {
            if !p.active && progress >= p.delay * cfg.activation_threshold {
                p.active = true;
                let angle = rng.range(cfg.angle_min, cfg.angle_max);
                let speed = rng.range(cfg.speed_min, cfg.speed_max);
                p.velocity_x = angle.cos() * speed;
                p.velocity_y = angle.sin() * speed - cfg.lift;
            }

            if !p.active || p.alpha == 0 {
                continue;
            }

            p.life_time += dt;
            p.x += p.velocity_x * dt;
            p.y += p.velocity_y * dt;
            p.velocity_y += cfg.gravity * dt;
            p.velocity_x += rng.centered() * cfg.jitter[0] * dt;
            p.velocity_y += rng.centered() * cfg.jitter[1] * dt;
            p.velocity_x *= cfg.damping;
            p.velocity_y *= cfg.damping;

            let life = if cfg.max_life_time > 0.0 {
                clamp01(p.life_time / cfg.max_life_time)
            } else {
                1.0
            };
            p.alpha = ((1.0 - life) * 255.0) as u8;
            p.size = lerp_f32(p.base_size, p.base_size * (1.0 - cfg.shrink), life);
        }
    }

    pub fn particles(&self) -> &[DisintegrationParticle] {
        &self.particles
    }

    /// Flying debris: active and not yet faded
    pub fn active_particles(&self) -> impl Iterator<Item = &DisintegrationParticle> {
        self.particles.iter().filter(|p| p.is_flying())
    }

    /// Still part of the remaining image, drawn at their origin
    pub fn inactive_particles(&self) -> impl Iterator<Item = &DisintegrationParticle> {
        self.particles.iter().filter(|p| !p.active)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// True once every particle is active and fully faded; an empty set is complete
    pub fn is_complete(&self) -> bool {
        self.particles.iter().all(DisintegrationParticle::is_decayed)
    }

    /// Drop all particles; the only way to reuse the system for another transition
    pub fn reset(&mut self) {
        self.particles.clear();
        self.initialized = false;
    }
}
