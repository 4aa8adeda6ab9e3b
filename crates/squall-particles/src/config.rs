//! Layer configuration: built-in presets per effect, optionally overridden from TOML
//!
//! ```toml
//! [rain]
//! pool_size = 50
//! lifetime_ms = 3500
//!
//! [snow.wind]
//! change_interval = 20
//!
//! [disintegration]
//! block_size = 3
//! ```

use serde::{Deserialize, Serialize};
use squall_core::{EffectKind, Result, SquallError, Vec2};
use squall_physics::{GroundConfig, WorldConfig};

use crate::disintegrate::DisintegrationConfig;
use crate::drift::DriftConfig;
use crate::spawn::{EntryConfig, EntryUnits, ShapeConfig, SpawnConfig};
use crate::wind::{WindConfig, WindWave};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSettings {
    pub friction: f32,
    pub restitution: f32,
}

/// How the external renderer should draw a layer's points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub color: [u8; 4],
    /// Point sizes in px, cycled by particle index
    pub sizes: Vec<f32>,
}

/// Everything needed to build one effect layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Pixels per world unit
    pub scale: f32,
    /// Base gravity in world units / s² (+y is down); wind replaces x
    pub gravity: [f32; 2],
    /// Particle radius in px
    pub particle_radius: f32,
    pub max_particles: usize,
    pub density: f32,
    pub damping: f32,
    pub self_collide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground: Option<GroundSettings>,

    pub pool_size: usize,
    pub lifetime_ms: u64,
    pub stagger_ms: u64,

    /// Fixed simulation sub-step in seconds
    pub step_dt: f32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,

    pub spawn: SpawnConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<WindConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<DriftConfig>,
    pub style: PointStyle,
}

impl LayerConfig {
    /// Built-in tuning for an effect; `None` for [`EffectKind::None`]
    pub fn preset(kind: EffectKind) -> Option<Self> {
        match kind {
            EffectKind::Rain => Some(Self::rain()),
            EffectKind::Snow => Some(Self::snow()),
            EffectKind::Smoke => Some(Self::smoke()),
            EffectKind::None => None,
        }
    }

    pub fn rain() -> Self {
        Self {
            scale: 300.0,
            gravity: [0.0, 15.0],
            particle_radius: 6.0,
            max_particles: 1000,
            density: 1.0,
            damping: 0.0,
            self_collide: true,
            ground: Some(GroundSettings {
                friction: 10.0,
                restitution: 0.3,
            }),
            pool_size: 35,
            lifetime_ms: 4000,
            stagger_ms: 120,
            step_dt: 1.0 / 120.0,
            velocity_iterations: 10,
            position_iterations: 3,
            spawn: SpawnConfig {
                buckets: 5,
                shape: ShapeConfig::Box {
                    half_width: 1.0 / 300.0,
                    half_height: 1.0 / 25.0,
                },
                base_speed: 18.0,
                speed_variation: 0.3,
                horizontal_jitter: 0.0,
                max_vertical_speed: None,
                entry: EntryConfig {
                    units: EntryUnits::Height,
                    initial_offset: 0.5,
                    initial_step: 0.15,
                    respawn_offset: 0.3,
                    respawn_range: 0.4,
                },
            },
            wind: None,
            drift: None,
            style: PointStyle {
                color: [255, 255, 255, 255],
                sizes: vec![12.0],
            },
        }
    }

    pub fn snow() -> Self {
        Self {
            scale: 80.0,
            gravity: [0.0, 5.5],
            particle_radius: 5.0,
            max_particles: 1500,
            density: 1.2,
            damping: 0.5,
            self_collide: false,
            ground: None,
            pool_size: 40,
            lifetime_ms: 6000,
            stagger_ms: 150,
            step_dt: 1.0 / 120.0,
            velocity_iterations: 8,
            position_iterations: 3,
            spawn: SpawnConfig {
                buckets: 5,
                shape: ShapeConfig::Circle {
                    radius_min: 4.0 / 1080.0,
                    radius_max: 12.0 / 1080.0,
                },
                base_speed: 3.0,
                speed_variation: 0.3,
                horizontal_jitter: 0.75,
                max_vertical_speed: None,
                entry: EntryConfig {
                    units: EntryUnits::Height,
                    initial_offset: 0.0,
                    initial_step: 0.3,
                    respawn_offset: 0.0,
                    respawn_range: 2.0,
                },
            },
            wind: Some(WindConfig {
                change_interval: 40,
                max_force: 2.5,
                waves: vec![
                    WindWave::new(1.5, 0.6, 0.0),
                    WindWave::new(0.8, 0.28, 0.0),
                    WindWave::new(0.5, 0.15, std::f32::consts::FRAC_PI_2),
                ],
            }),
            drift: Some(DriftConfig::default()),
            style: PointStyle {
                color: [255, 255, 255, 200],
                sizes: vec![3.0, 4.5, 6.0],
            },
        }
    }

    pub fn smoke() -> Self {
        Self {
            scale: 100.0,
            gravity: [0.0, -2.0],
            particle_radius: 15.0,
            max_particles: 1500,
            density: 1.0,
            damping: 0.0,
            self_collide: true,
            ground: None,
            pool_size: 30,
            lifetime_ms: 3000,
            stagger_ms: 100,
            step_dt: 1.0 / 120.0,
            velocity_iterations: 8,
            position_iterations: 3,
            spawn: SpawnConfig {
                buckets: 5,
                shape: ShapeConfig::Circle {
                    radius_min: 1.0 / 150.0,
                    radius_max: 1.0 / 150.0,
                },
                base_speed: 3.0,
                speed_variation: 1.0 / 6.0,
                horizontal_jitter: 1.0,
                max_vertical_speed: None,
                entry: EntryConfig {
                    units: EntryUnits::World,
                    initial_offset: 0.0,
                    initial_step: 0.5,
                    respawn_offset: 0.0,
                    respawn_range: 0.3,
                },
            },
            wind: Some(WindConfig::default()),
            drift: None,
            style: PointStyle {
                color: [255, 255, 255, 77],
                sizes: vec![50.0, 60.0, 70.0, 80.0, 90.0],
            },
        }
    }

    /// Physics world parameters for a viewport of `width` x `height` px
    pub fn world_config(&self, width: f32, height: f32) -> WorldConfig {
        WorldConfig {
            width,
            height,
            scale: self.scale,
            gravity: Vec2::from_array(self.gravity),
            particle_radius_px: self.particle_radius,
            max_particles: self.max_particles,
            density: self.density,
            linear_damping: self.damping,
            self_collide: self.self_collide,
            ground: self.ground.map(|g| GroundConfig {
                friction: g.friction,
                restitution: g.restitution,
            }),
        }
    }

    /// Apply the keys present in `table` on top of this config
    pub fn merged_with(&self, table: &toml::Table) -> Result<Self> {
        let toml::Value::Table(mut base) = toml::Value::try_from(self)? else {
            return Err(SquallError::Config("layer config must serialize to a table".to_string()));
        };
        merge_tables(&mut base, table);
        let merged: Self = toml::Value::Table(base).try_into()?;
        merged.validate()?;
        Ok(merged)
    }

    /// Parse overrides for `kind` from a TOML document holding just this layer's keys
    pub fn from_toml_str(kind: EffectKind, s: &str) -> Result<Self> {
        let base = Self::preset(kind).ok_or_else(|| {
            SquallError::Config("the 'none' effect has no layer config".to_string())
        })?;
        let table: toml::Table = toml::from_str(s)?;
        base.merged_with(&table)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scale <= 0.0 {
            return Err(out_of_range("scale", 0.0, f64::MAX, self.scale as f64));
        }
        if !self.particle_radius.is_finite() || self.particle_radius <= 0.0 {
            return Err(out_of_range(
                "particle_radius",
                0.0,
                f64::MAX,
                self.particle_radius as f64,
            ));
        }
        if self.step_dt <= 0.0 || self.step_dt > 0.1 {
            return Err(out_of_range("step_dt", 0.0, 0.1, self.step_dt as f64));
        }
        if self.pool_size == 0 {
            return Err(out_of_range("pool_size", 1.0, f64::MAX, 0.0));
        }
        if self.style.sizes.is_empty() {
            return Err(SquallError::Config("style.sizes must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Whole-file configuration: one table per effect plus the disintegration tuning
#[derive(Debug, Clone, PartialEq)]
pub struct EffectsConfig {
    pub rain: LayerConfig,
    pub snow: LayerConfig,
    pub smoke: LayerConfig,
    pub disintegration: DisintegrationConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            rain: LayerConfig::rain(),
            snow: LayerConfig::snow(),
            smoke: LayerConfig::smoke(),
            disintegration: DisintegrationConfig::default(),
        }
    }
}

impl EffectsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(s)?;
        let mut config = Self::default();

        for (key, value) in &table {
            let Some(section) = value.as_table() else {
                return Err(SquallError::Config(format!(
                    "'{}' must be a table",
                    key
                )));
            };
            match key.as_str() {
                "rain" => config.rain = config.rain.merged_with(section)?,
                "snow" => config.snow = config.snow.merged_with(section)?,
                "smoke" | "haze" => config.smoke = config.smoke.merged_with(section)?,
                "disintegration" => {
                    config.disintegration = toml::Value::Table(section.clone()).try_into()?
                }
                other => {
                    return Err(SquallError::Config(format!(
                        "unknown section '{}'; expected rain, snow, smoke or disintegration",
                        other
                    )))
                }
            }
        }
        Ok(config)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn layer(&self, kind: EffectKind) -> Option<&LayerConfig> {
        match kind {
            EffectKind::Rain => Some(&self.rain),
            EffectKind::Snow => Some(&self.snow),
            EffectKind::Smoke => Some(&self.smoke),
            EffectKind::None => None,
        }
    }
}

fn out_of_range(field: &str, min: f64, max: f64, value: f64) -> SquallError {
    SquallError::ValueOutOfRange {
        field: field.to_string(),
        min,
        max,
        value,
    }
}

/// Recursive table merge: tables merge key-by-key, everything else replaces
fn merge_tables(base: &mut toml::Table, overrides: &toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
