//! Squall Particles - weather layers and the disintegration effect
//!
//! Provides:
//! - A fixed-size pool of particle groups recycled on a lifetime schedule
//! - Bucketed spawn placement and a slow sinusoidal wind model
//! - Per-effect presets with TOML overrides
//! - Decorative non-physics snow drift
//! - Raster-to-particle disintegration with delayed activation and fade
//! - Point instance packing for instanced draw calls

pub mod config;
pub mod curves;
pub mod disintegrate;
pub mod drift;
pub mod layer;
pub mod particle;
pub mod pool;
pub mod rand;
pub mod spawn;
pub mod wind;

pub use config::{EffectsConfig, GroundSettings, LayerConfig, PointStyle};
pub use disintegrate::{
    decompose, DisintegrationConfig, DisintegrationParticle, DisintegrationSystem, Raster,
};
pub use drift::{DriftConfig, SnowDrift, Snowflake};
pub use layer::{EffectLayer, LayerStats};
pub use particle::{pack_fragments, pack_points, PointInstance};
pub use pool::{GroupPool, PoolConfig, PoolSlot};
pub use rand::ParticleRng;
pub use spawn::{EntryConfig, EntryEdge, EntryUnits, GroupSpawner, ShapeConfig, SpawnConfig, SpawnGrid, Stagger};
pub use wind::{WindConfig, WindModel, WindWave};
