//! Decorative snowflakes drawn over the physics snow.
//!
//! No collisions: each flake falls at a constant per-tick speed, sways with a
//! sine wobble plus the layer's wind, spins, and is re-rolled in place once it
//! leaves the viewport margin.

use serde::{Deserialize, Serialize};

use crate::rand::ParticleRng;

/// Size and speed ranges for one depth layer (0 = far, 2 = near)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLayer {
    /// px
    pub size: [f32; 2],
    /// px per tick
    pub speed: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub count: usize,
    pub layers: Vec<DepthLayer>,
    /// Horizontal push per unit of wind, multiplied by `layer + 1`
    pub wind_factor: f32,
    pub wobble_amplitude: f32,
    /// rad/s
    pub wobble_frequency: f32,
    /// Distance outside the viewport before a flake is recycled, px
    pub margin: f32,
    /// Vertical spacing between flakes at startup, px
    pub initial_spacing: f32,
    /// Recycled flakes start up to this far above the top edge, px
    pub respawn_band: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            count: 120,
            layers: vec![
                DepthLayer {
                    size: [2.0, 5.0],
                    speed: [0.3, 0.6],
                },
                DepthLayer {
                    size: [4.0, 8.0],
                    speed: [0.6, 1.1],
                },
                DepthLayer {
                    size: [6.0, 12.0],
                    speed: [1.0, 1.8],
                },
            ],
            wind_factor: 0.15,
            wobble_amplitude: 0.3,
            wobble_frequency: 0.8,
            margin: 50.0,
            initial_spacing: 10.0,
            respawn_band: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snowflake {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    /// Degrees
    pub rotation: f32,
    pub rotation_speed: f32,
    pub alpha: f32,
    pub layer: usize,
}

pub struct SnowDrift {
    config: DriftConfig,
    flakes: Vec<Snowflake>,
    width: f32,
    height: f32,
    rng: ParticleRng,
}

impl SnowDrift {
    pub fn new(config: DriftConfig, width: f32, height: f32, mut rng: ParticleRng) -> Self {
        let flakes = (0..config.count)
            .map(|i| roll_flake(&config, &mut rng, width, Some(i)))
            .collect();
        Self {
            config,
            flakes,
            width,
            height,
            rng,
        }
    }

    /// Advance every flake by one tick.
    ///
    /// `wind` is the layer's current horizontal force; `now_secs` drives the wobble.
    pub fn update(&mut self, wind: f32, now_secs: f32) {
        let cfg = &self.config;
        let (w, h) = (self.width, self.height);
        for (i, flake) in self.flakes.iter_mut().enumerate() {
            flake.y += flake.speed;
            let push = wind * (flake.layer + 1) as f32 * cfg.wind_factor;
            let wobble = ((now_secs + i as f32) * cfg.wobble_frequency).sin() * cfg.wobble_amplitude;
            flake.x += push + wobble;
            flake.rotation += flake.rotation_speed;

            if flake.y > h + cfg.margin || flake.x < -cfg.margin || flake.x > w + cfg.margin {
                *flake = roll_flake(cfg, &mut self.rng, w, None);
            }
        }
    }

    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }

    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }
}

fn roll_flake(cfg: &DriftConfig, rng: &mut ParticleRng, width: f32, index: Option<usize>) -> Snowflake {
    let layer = if cfg.layers.is_empty() {
        0
    } else {
        rng.index(cfg.layers.len())
    };
    let depth = cfg.layers.get(layer).copied().unwrap_or(DepthLayer {
        size: [3.0, 3.0],
        speed: [1.0, 1.0],
    });
    let y = match index {
        Some(i) => -(i as f32 * cfg.initial_spacing),
        None => -rng.range(0.0, cfg.respawn_band),
    };
    Snowflake {
        x: rng.range(0.0, width),
        y,
        size: rng.range(depth.size[0], depth.size[1]),
        speed: rng.range(depth.speed[0], depth.speed[1]),
        rotation: rng.range(0.0, 360.0),
        rotation_speed: rng.centered() * 2.0,
        alpha: rng.range(0.4, 1.0),
        layer,
    }
}
