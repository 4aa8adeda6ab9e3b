//! One running weather effect: physics world, group pool, wind and extras

use serde::Serialize;
use squall_core::{EffectKind, Result, SquallError, Vec2};
use squall_physics::ParticleWorld;

use crate::config::LayerConfig;
use crate::drift::SnowDrift;
use crate::pool::{GroupPool, PoolConfig};
use crate::rand::ParticleRng;
use crate::spawn::{EntryEdge, GroupSpawner};
use crate::wind::WindModel;

/// Point-in-time counters for a layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerStats {
    pub kind: EffectKind,
    pub ticks: u64,
    pub particles: usize,
    pub groups: usize,
    pub recycled_total: u64,
    pub wind: f32,
}

pub struct EffectLayer {
    kind: EffectKind,
    config: LayerConfig,
    world: ParticleWorld,
    pool: GroupPool,
    wind: Option<WindModel>,
    drift: Option<SnowDrift>,
    viewport: (f32, f32),
    ticks: u64,
}

impl EffectLayer {
    /// Build a layer for a `width` x `height` px viewport, OS-seeded
    pub fn new(kind: EffectKind, config: LayerConfig, width: f32, height: f32) -> Result<Self> {
        Self::build(kind, config, width, height, ParticleRng::from_os(), ParticleRng::from_os())
    }

    /// Build a layer with deterministic spawning
    pub fn with_seed(
        kind: EffectKind,
        config: LayerConfig,
        width: f32,
        height: f32,
        seed: u64,
    ) -> Result<Self> {
        Self::build(
            kind,
            config,
            width,
            height,
            ParticleRng::new(seed),
            ParticleRng::new(seed.wrapping_add(1)),
        )
    }

    fn build(
        kind: EffectKind,
        config: LayerConfig,
        width: f32,
        height: f32,
        pool_rng: ParticleRng,
        drift_rng: ParticleRng,
    ) -> Result<Self> {
        if kind == EffectKind::None {
            return Err(SquallError::Config("cannot build a layer for 'none'".to_string()));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(SquallError::Config(format!(
                "viewport must be positive, got {}x{}",
                width, height
            )));
        }
        config.validate()?;

        let world = ParticleWorld::with_config(config.world_config(width, height));
        let (world_w, world_h) = world.config().world_size();
        let edge = if kind.rises() {
            EntryEdge::Bottom
        } else {
            EntryEdge::Top
        };
        let spawner = GroupSpawner::new(config.spawn.clone(), edge, world_w, world_h);
        let pool = GroupPool::new(
            PoolConfig {
                size: config.pool_size,
                lifetime_ms: config.lifetime_ms,
                stagger_ms: config.stagger_ms,
            },
            spawner,
            pool_rng,
        );
        let wind = config.wind.clone().map(WindModel::new);
        let drift = config
            .drift
            .clone()
            .map(|d| SnowDrift::new(d, width, height, drift_rng));

        Ok(Self {
            kind,
            config,
            world,
            pool,
            wind,
            drift,
            viewport: (width, height),
            ticks: 0,
        })
    }

    /// Fill the pool; `now_ms` is the monotonic clock reading
    pub fn initialize(&mut self, now_ms: u64) -> Result<()> {
        self.pool.initialize(&mut self.world, now_ms)?;
        log::info!(
            "{} layer started: {} groups, {} particles",
            self.kind,
            self.pool.len(),
            self.world.particle_count()
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.pool.is_empty()
    }

    /// One simulation tick: wind into gravity, recycle, step, drift
    pub fn tick(&mut self, now_ms: u64) -> Result<()> {
        let now_secs = now_ms as f64 / 1000.0;
        let base = Vec2::from_array(self.config.gravity);

        let wind = match self.wind.as_mut() {
            Some(model) => model.update(now_secs),
            None => base.x,
        };
        self.world.set_gravity(Vec2::new(wind, base.y))?;

        self.pool.tick(&mut self.world, now_ms)?;
        self.world.step(
            self.config.step_dt,
            self.config.velocity_iterations,
            self.config.position_iterations,
        )?;

        if let Some(drift) = self.drift.as_mut() {
            drift.update(wind, now_secs as f32);
        }
        self.ticks += 1;
        Ok(())
    }

    /// Copy screen-space particle positions into `out`
    pub fn snapshot_into(&self, out: &mut Vec<Vec2>) {
        self.world.screen_positions_into(out);
    }

    pub fn stats(&self) -> LayerStats {
        LayerStats {
            kind: self.kind,
            ticks: self.ticks,
            particles: self.world.particle_count(),
            groups: self.world.group_count(),
            recycled_total: self.pool.recycled_total(),
            wind: self.wind_force(),
        }
    }

    pub fn wind_force(&self) -> f32 {
        self.wind.as_ref().map_or(0.0, WindModel::force)
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn world(&self) -> &ParticleWorld {
        &self.world
    }

    pub fn pool(&self) -> &GroupPool {
        &self.pool
    }

    pub fn drift(&self) -> Option<&SnowDrift> {
        self.drift.as_ref()
    }
}
