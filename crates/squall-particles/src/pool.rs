//! Fixed-size pool of particle groups, recycled in place forever
//!
//! Every slot holds one live group and the time it was (re)created. A tick
//! destroys each expired group and spawns its replacement into the same slot,
//! so the pool never grows, shrinks, or reallocates.

use squall_core::Result;
use squall_physics::{ParticleGroupDef, ParticleGroupHandle, ParticleWorld};

use crate::rand::ParticleRng;
use crate::spawn::{GroupSpawner, Stagger};

/// Pool sizing and timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolConfig {
    pub size: usize,
    pub lifetime_ms: u64,
    /// Creation-time offset between consecutive slots at initialization
    pub stagger_ms: u64,
}

/// One pool slot
#[derive(Debug, Clone, Copy)]
pub struct PoolSlot {
    pub handle: ParticleGroupHandle,
    /// Monotonic ms; may lie in the future for staggered initial slots
    pub created_at: u64,
    pub spawn: ParticleGroupDef,
}

impl PoolSlot {
    /// A slot expires once strictly more than `lifetime_ms` has passed
    pub fn is_expired(&self, now: u64, lifetime_ms: u64) -> bool {
        now.saturating_sub(self.created_at) > lifetime_ms
    }
}

pub struct GroupPool {
    config: PoolConfig,
    spawner: GroupSpawner,
    rng: ParticleRng,
    slots: Vec<PoolSlot>,
    recycled_total: u64,
}

impl GroupPool {
    pub fn new(config: PoolConfig, spawner: GroupSpawner, rng: ParticleRng) -> Self {
        Self {
            config,
            spawner,
            rng,
            slots: Vec::new(),
            recycled_total: 0,
        }
    }

    /// Create every slot with staggered creation times and entry depths.
    ///
    /// Slot `i` gets `created_at = now + i * stagger_ms`. Calling this on an
    /// already-filled pool is a no-op.
    pub fn initialize(&mut self, world: &mut ParticleWorld, now: u64) -> Result<()> {
        if !self.slots.is_empty() {
            log::warn!("group pool already initialized; ignoring");
            return Ok(());
        }

        self.slots.reserve_exact(self.config.size);
        for index in 0..self.config.size {
            let spawn = self.spawner.next_def(&mut self.rng, Stagger::Initial(index));
            let handle = world.create_group(&spawn)?;
            self.slots.push(PoolSlot {
                handle,
                created_at: now + index as u64 * self.config.stagger_ms,
                spawn,
            });
        }

        log::debug!(
            "group pool initialized: {} slots, lifetime {} ms, {} particles",
            self.slots.len(),
            self.config.lifetime_ms,
            world.particle_count()
        );
        Ok(())
    }

    /// Recycle every expired slot; returns how many were recycled this tick.
    pub fn tick(&mut self, world: &mut ParticleWorld, now: u64) -> Result<usize> {
        let lifetime = self.config.lifetime_ms;
        let mut recycled = 0;

        for slot in self.slots.iter_mut() {
            if !slot.is_expired(now, lifetime) {
                continue;
            }
            world.destroy_group(slot.handle)?;
            let spawn = self.spawner.next_def(&mut self.rng, Stagger::Respawn);
            let handle = world.create_group(&spawn)?;
            *slot = PoolSlot {
                handle,
                created_at: now,
                spawn,
            };
            recycled += 1;
        }

        if recycled > 0 {
            self.recycled_total += recycled as u64;
            log::trace!("recycled {} group(s) at t={} ms", recycled, now);
        }
        Ok(recycled)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn slots(&self) -> &[PoolSlot] {
        &self.slots
    }

    pub fn handles(&self) -> impl Iterator<Item = ParticleGroupHandle> + '_ {
        self.slots.iter().map(|s| s.handle)
    }

    /// Total recycles since initialization
    pub fn recycled_total(&self) -> u64 {
        self.recycled_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::{EntryEdge, SpawnConfig};
    use squall_physics::WorldConfig;
    use std::collections::HashSet;

    fn world() -> ParticleWorld {
        ParticleWorld::with_config(WorldConfig {
            width: 500.0,
            height: 1000.0,
            scale: 100.0,
            particle_radius_px: 6.0,
            max_particles: 10_000,
            self_collide: false,
            ..WorldConfig::default()
        })
    }

    fn pool(size: usize, lifetime_ms: u64, stagger_ms: u64) -> GroupPool {
        let spawner = GroupSpawner::new(SpawnConfig::default(), EntryEdge::Top, 5.0, 10.0);
        GroupPool::new(
            PoolConfig {
                size,
                lifetime_ms,
                stagger_ms,
            },
            spawner,
            ParticleRng::new(17),
        )
    }

    fn distinct(pool: &GroupPool) -> usize {
        pool.handles().collect::<HashSet<_>>().len()
    }

    #[test]
    fn initialize_staggers_creation_times() {
        let mut world = world();
        let mut pool = pool(4, 1000, 120);
        pool.initialize(&mut world, 500).unwrap();

        let times: Vec<u64> = pool.slots().iter().map(|s| s.created_at).collect();
        assert_eq!(times, vec![500, 620, 740, 860]);
        assert_eq!(world.group_count(), 4);
    }

    #[test]
    fn second_initialize_is_ignored() {
        let mut world = world();
        let mut pool = pool(3, 1000, 0);
        pool.initialize(&mut world, 0).unwrap();
        pool.initialize(&mut world, 0).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(world.group_count(), 3);
    }

    #[test]
    fn recycle_scenario() {
        let mut world = world();
        let mut pool = pool(3, 1000, 0);
        pool.initialize(&mut world, 0).unwrap();
        let original = pool.slots()[0].handle;

        for t in [0, 500, 1000] {
            assert_eq!(pool.tick(&mut world, t).unwrap(), 0);
            assert_eq!(pool.len(), 3);
            assert_eq!(distinct(&pool), 3);
        }
        assert_eq!(pool.slots()[0].handle, original);

        assert_eq!(pool.tick(&mut world, 1500).unwrap(), 3);
        assert_eq!(pool.len(), 3);
        assert_eq!(distinct(&pool), 3);
        assert_ne!(pool.slots()[0].handle, original);
        assert!(!world.contains_group(original));
        assert!(pool.slots().iter().all(|s| s.created_at == 1500));
    }

    #[test]
    fn staggered_slots_expire_on_their_own_schedule() {
        let mut world = world();
        let mut pool = pool(3, 1000, 100);
        pool.initialize(&mut world, 0).unwrap();

        assert_eq!(pool.tick(&mut world, 1050).unwrap(), 1);
        assert_eq!(pool.tick(&mut world, 1150).unwrap(), 1);
        assert_eq!(pool.tick(&mut world, 1250).unwrap(), 1);
        assert_eq!(pool.tick(&mut world, 1300).unwrap(), 0);
        assert_eq!(pool.recycled_total(), 3);
    }

    #[test]
    fn pool_size_never_changes() {
        let mut world = world();
        let mut pool = pool(8, 300, 37);
        pool.initialize(&mut world, 0).unwrap();

        for t in (0..20_000).step_by(73) {
            pool.tick(&mut world, t).unwrap();
            assert_eq!(pool.len(), 8);
            assert_eq!(world.group_count(), 8);
            assert_eq!(distinct(&pool), 8);
        }
        assert!(pool.recycled_total() > 8);
    }

    #[test]
    fn future_created_at_never_underflows() {
        let mut world = world();
        let spawn = ParticleGroupDef {
            shape: squall_physics::GroupShape::Circle { radius: 0.1 },
            position: squall_core::Vec2::ZERO,
            linear_velocity: squall_core::Vec2::ZERO,
        };
        let slot = PoolSlot {
            handle: world.create_group(&spawn).unwrap(),
            created_at: 5_000,
            spawn,
        };
        assert!(!slot.is_expired(0, 1000));
        assert!(!slot.is_expired(6_000, 1000));
        assert!(slot.is_expired(6_001, 1000));
    }
}
