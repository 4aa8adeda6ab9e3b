//! Spawn distribution: where and how fast a recycled group enters the screen
//!
//! Horizontal placement round-robins over equal-width buckets so that any
//! `G` consecutive spawns cover the whole width once; vertical placement
//! comes from the layer's entry edge with a small random offset.

use serde::{Deserialize, Serialize};
use squall_core::Vec2;
use squall_physics::{GroupShape, ParticleGroupDef};

use crate::rand::ParticleRng;

/// Shape of a spawned group, as fractions of the viewport width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeConfig {
    Box { half_width: f32, half_height: f32 },
    Circle { radius_min: f32, radius_max: f32 },
}

/// Unit of the [`EntryConfig`] distances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryUnits {
    /// Fractions of the viewport height
    #[default]
    Height,
    /// Absolute world units, independent of the viewport
    World,
}

/// Vertical entry placement beyond the entry edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub units: EntryUnits,
    /// Distance of slot 0 at pool initialization
    pub initial_offset: f32,
    /// Extra distance per slot index at pool initialization
    pub initial_step: f32,
    /// Minimum distance for a recycled group
    pub respawn_offset: f32,
    /// Random extra distance for a recycled group
    pub respawn_range: f32,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            units: EntryUnits::Height,
            initial_offset: 0.5,
            initial_step: 0.15,
            respawn_offset: 0.3,
            respawn_range: 0.4,
        }
    }
}

/// Everything the spawner needs to build a group definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub buckets: usize,
    pub shape: ShapeConfig,
    /// Vertical speed in world units / s, always positive; direction comes from the edge
    pub base_speed: f32,
    /// Total relative spread: speeds land in `base * (1 ± variation / 2)`
    pub speed_variation: f32,
    /// Maximum horizontal speed magnitude
    pub horizontal_jitter: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_vertical_speed: Option<f32>,
    pub entry: EntryConfig,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            buckets: 5,
            shape: ShapeConfig::Box {
                half_width: 1.0 / 300.0,
                half_height: 1.0 / 25.0,
            },
            base_speed: 18.0,
            speed_variation: 0.3,
            horizontal_jitter: 0.0,
            max_vertical_speed: None,
            entry: EntryConfig::default(),
        }
    }
}

/// Which screen edge new groups enter from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryEdge {
    /// Above the screen, moving down
    Top,
    /// Below the screen, moving up
    Bottom,
}

impl EntryEdge {
    /// Sign of the vertical velocity for this edge (+y is down)
    pub fn direction(&self) -> f32 {
        match self {
            EntryEdge::Top => 1.0,
            EntryEdge::Bottom => -1.0,
        }
    }
}

/// Whether a group is part of the initial staggered fill or a recycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stagger {
    Initial(usize),
    Respawn,
}

/// Rotating cursor over the horizontal spawn buckets
#[derive(Debug, Clone)]
pub struct SpawnGrid {
    cursor: usize,
    buckets: usize,
}

impl SpawnGrid {
    pub fn new(buckets: usize) -> Self {
        Self {
            cursor: 0,
            buckets: buckets.max(1),
        }
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Bucket for the next spawn; advances the cursor by one
    pub fn next_bucket(&mut self) -> usize {
        let bucket = self.cursor % self.buckets;
        self.cursor = (self.cursor + 1) % self.buckets;
        bucket
    }
}

/// Pick the next spawn position in world units.
///
/// `width`/`height` are the viewport size in world units.
pub fn next_spawn_position(
    grid: &mut SpawnGrid,
    rng: &mut ParticleRng,
    width: f32,
    height: f32,
    edge: EntryEdge,
    entry: &EntryConfig,
    stagger: Stagger,
) -> Vec2 {
    let bucket = grid.next_bucket();
    let bucket_width = width / grid.buckets() as f32;
    let x = rng.range(
        bucket as f32 * bucket_width,
        (bucket + 1) as f32 * bucket_width,
    );

    let distance = match stagger {
        Stagger::Initial(index) => entry.initial_offset + index as f32 * entry.initial_step,
        Stagger::Respawn => entry.respawn_offset + rng.next_f32() * entry.respawn_range,
    };
    let depth = match entry.units {
        EntryUnits::Height => distance * height,
        EntryUnits::World => distance,
    };

    let y = match edge {
        EntryEdge::Top => -depth,
        EntryEdge::Bottom => height + depth,
    };
    Vec2::new(x, y)
}

/// Initial group velocity: mostly vertical, `base_speed * (1 ± variation / 2)`,
/// with a small horizontal component.
pub fn next_initial_velocity(
    rng: &mut ParticleRng,
    base_speed: f32,
    variation_ratio: f32,
    horizontal_jitter: f32,
    edge: EntryEdge,
) -> Vec2 {
    let speed = base_speed * (1.0 + rng.centered() * variation_ratio);
    let vx = rng.centered() * 2.0 * horizontal_jitter;
    Vec2::new(vx, speed * edge.direction())
}

/// Builds group definitions for one layer, owning the bucket cursor
pub struct GroupSpawner {
    config: SpawnConfig,
    grid: SpawnGrid,
    edge: EntryEdge,
    /// Viewport size in world units
    width: f32,
    height: f32,
}

impl GroupSpawner {
    pub fn new(config: SpawnConfig, edge: EntryEdge, width: f32, height: f32) -> Self {
        let grid = SpawnGrid::new(config.buckets);
        Self {
            config,
            grid,
            edge,
            width,
            height,
        }
    }

    /// Definition for the next group entering the screen
    pub fn next_def(&mut self, rng: &mut ParticleRng, stagger: Stagger) -> ParticleGroupDef {
        let shape = match self.config.shape {
            ShapeConfig::Box {
                half_width,
                half_height,
            } => GroupShape::Box {
                half_width: half_width * self.width,
                half_height: half_height * self.width,
            },
            ShapeConfig::Circle {
                radius_min,
                radius_max,
            } => GroupShape::Circle {
                radius: rng.range(radius_min, radius_max) * self.width,
            },
        };

        let position = next_spawn_position(
            &mut self.grid,
            rng,
            self.width,
            self.height,
            self.edge,
            &self.config.entry,
            stagger,
        );

        let mut linear_velocity = next_initial_velocity(
            rng,
            self.config.base_speed,
            self.config.speed_variation,
            self.config.horizontal_jitter,
            self.edge,
        );
        if let Some(max) = self.config.max_vertical_speed {
            linear_velocity.y = linear_velocity.y.clamp(-max, max);
        }

        ParticleGroupDef {
            shape,
            position,
            linear_velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rotates_through_every_bucket() {
        let mut grid = SpawnGrid::new(5);
        let first: Vec<usize> = (0..5).map(|_| grid.next_bucket()).collect();
        assert_eq!(first, vec![0, 1, 2, 3, 4]);
        let second: Vec<usize> = (0..5).map(|_| grid.next_bucket()).collect();
        assert_eq!(second, first);
    }

    #[test]
    fn any_window_covers_all_buckets() {
        let mut grid = SpawnGrid::new(5);
        let seq: Vec<usize> = (0..23).map(|_| grid.next_bucket()).collect();
        for window in seq.windows(5) {
            let mut sorted = window.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn zero_buckets_is_treated_as_one() {
        let mut grid = SpawnGrid::new(0);
        assert_eq!(grid.next_bucket(), 0);
        assert_eq!(grid.next_bucket(), 0);
    }

    #[test]
    fn spawn_positions_land_in_their_bucket() {
        let mut grid = SpawnGrid::new(5);
        let mut rng = ParticleRng::new(11);
        let entry = EntryConfig::default();
        let width = 10.0;
        for call in 0..50 {
            let p = next_spawn_position(
                &mut grid,
                &mut rng,
                width,
                20.0,
                EntryEdge::Top,
                &entry,
                Stagger::Respawn,
            );
            let bucket = (call % 5) as f32;
            assert!(p.x >= bucket * 2.0 && p.x <= (bucket + 1.0) * 2.0);
        }
    }

    #[test]
    fn falling_groups_start_above_the_screen() {
        let mut grid = SpawnGrid::new(5);
        let mut rng = ParticleRng::new(3);
        let entry = EntryConfig::default();
        for _ in 0..20 {
            let p = next_spawn_position(
                &mut grid,
                &mut rng,
                10.0,
                20.0,
                EntryEdge::Top,
                &entry,
                Stagger::Respawn,
            );
            assert!(p.y <= -0.3 * 20.0 + 1e-4);
            assert!(p.y >= -0.7 * 20.0 - 1e-4);
        }
    }

    #[test]
    fn rising_groups_start_below_the_screen() {
        let mut grid = SpawnGrid::new(5);
        let mut rng = ParticleRng::new(3);
        let entry = EntryConfig {
            units: EntryUnits::Height,
            initial_offset: 0.0,
            initial_step: 0.05,
            respawn_offset: 0.0,
            respawn_range: 0.02,
        };
        let p = next_spawn_position(
            &mut grid,
            &mut rng,
            10.0,
            20.0,
            EntryEdge::Bottom,
            &entry,
            Stagger::Initial(4),
        );
        assert!((p.y - 24.0).abs() < 1e-4);
    }

    #[test]
    fn world_units_ignore_viewport_height() {
        let entry = EntryConfig {
            units: EntryUnits::World,
            initial_offset: 0.0,
            initial_step: 0.5,
            respawn_offset: 0.0,
            respawn_range: 0.3,
        };
        for height in [12.8, 19.2, 32.0] {
            let mut grid = SpawnGrid::new(5);
            let mut rng = ParticleRng::new(3);
            let p = next_spawn_position(
                &mut grid,
                &mut rng,
                10.0,
                height,
                EntryEdge::Bottom,
                &entry,
                Stagger::Initial(4),
            );
            assert!((p.y - height - 2.0).abs() < 1e-4);

            let r = next_spawn_position(
                &mut grid,
                &mut rng,
                10.0,
                height,
                EntryEdge::Bottom,
                &entry,
                Stagger::Respawn,
            );
            assert!(r.y >= height && r.y <= height + 0.3 + 1e-4);
        }
    }

    #[test]
    fn initial_stagger_spreads_slots() {
        let mut grid = SpawnGrid::new(5);
        let mut rng = ParticleRng::new(1);
        let entry = EntryConfig::default();
        let ys: Vec<f32> = (0..4)
            .map(|i| {
                next_spawn_position(
                    &mut grid,
                    &mut rng,
                    10.0,
                    10.0,
                    EntryEdge::Top,
                    &entry,
                    Stagger::Initial(i),
                )
                .y
            })
            .collect();
        for pair in ys.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn velocity_stays_within_variation() {
        let mut rng = ParticleRng::new(21);
        for _ in 0..500 {
            let v = next_initial_velocity(&mut rng, 18.0, 0.3, 1.0, EntryEdge::Top);
            assert!(v.y >= 18.0 * 0.85 - 1e-4 && v.y <= 18.0 * 1.15 + 1e-4);
            assert!(v.x.abs() <= 1.0);
        }
    }

    #[test]
    fn rising_velocity_points_up() {
        let mut rng = ParticleRng::new(8);
        let v = next_initial_velocity(&mut rng, 3.0, 0.2, 0.0, EntryEdge::Bottom);
        assert!(v.y < 0.0);
        assert_eq!(v.x, 0.0);
    }

    #[test]
    fn spawner_clamps_vertical_speed() {
        let config = SpawnConfig {
            base_speed: 10.0,
            max_vertical_speed: Some(3.0),
            ..SpawnConfig::default()
        };
        let mut spawner = GroupSpawner::new(config, EntryEdge::Top, 10.0, 20.0);
        let mut rng = ParticleRng::new(4);
        let def = spawner.next_def(&mut rng, Stagger::Respawn);
        assert!((def.linear_velocity.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn spawner_scales_shape_by_width() {
        let config = SpawnConfig {
            shape: ShapeConfig::Circle {
                radius_min: 0.1,
                radius_max: 0.1,
            },
            ..SpawnConfig::default()
        };
        let mut spawner = GroupSpawner::new(config, EntryEdge::Bottom, 10.0, 20.0);
        let mut rng = ParticleRng::new(4);
        let def = spawner.next_def(&mut rng, Stagger::Respawn);
        assert_eq!(def.shape, GroupShape::Circle { radius: 1.0 });
        assert!(def.position.y >= 20.0);
    }
}
