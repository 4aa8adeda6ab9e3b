//! Particle world wrapping Rapier 2D

use std::collections::HashMap;
use std::num::NonZeroUsize;

use rapier2d::prelude::*;
use squall_core::{Result, SquallError, Vec2};

use crate::group::{ParticleGroupDef, ParticleGroupHandle};

/// Membership bit for dynamic particles
const PARTICLE_GROUP: Group = Group::GROUP_1;
/// Membership bit for static scenery (the rain ground slab)
const SCENERY_GROUP: Group = Group::GROUP_2;

/// Static slab placed just below the viewport so falling particles splash on it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundConfig {
    pub friction: f32,
    pub restitution: f32,
}

/// Parameters fixed at [`ParticleWorld::initialize`] time
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Viewport size in pixels
    pub width: f32,
    pub height: f32,
    /// Pixels per world unit
    pub scale: f32,
    /// Gravity in world units / s² (+y is down)
    pub gravity: Vec2,
    /// Particle radius in pixels; converted to world units through `scale`
    pub particle_radius_px: f32,
    /// Hard cap on live particles
    pub max_particles: usize,
    pub density: f32,
    pub linear_damping: f32,
    /// Whether particles collide with each other or only with scenery
    pub self_collide: bool,
    pub ground: Option<GroundConfig>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
            scale: 100.0,
            gravity: Vec2::new(0.0, 10.0),
            particle_radius_px: 6.0,
            max_particles: 1000,
            density: 1.0,
            linear_damping: 0.0,
            self_collide: true,
            ground: None,
        }
    }
}

impl WorldConfig {
    /// Viewport size in world units
    pub fn world_size(&self) -> (f32, f32) {
        (self.width / self.scale, self.height / self.scale)
    }

    pub fn particle_radius(&self) -> f32 {
        self.particle_radius_px / self.scale
    }
}

/// Rapier pipeline and sets, present once the world is initialized
struct Simulation {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Simulation {
    fn new(gravity: Vec2) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![gravity.x, gravity.y],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

/// One physics world per effect layer.
///
/// Particles are dynamic Rapier bodies with a ball collider; a group is the
/// set of bodies created by one [`ParticleGroupDef`].
pub struct ParticleWorld {
    sim: Option<Simulation>,
    config: WorldConfig,
    groups: HashMap<u32, Vec<RigidBodyHandle>>,
    next_group_id: u32,
    particle_count: usize,
}

impl ParticleWorld {
    /// Create an empty, uninitialized world
    pub fn new() -> Self {
        Self {
            sim: None,
            config: WorldConfig::default(),
            groups: HashMap::new(),
            next_group_id: 0,
            particle_count: 0,
        }
    }

    /// Create and initialize in one go
    pub fn with_config(config: WorldConfig) -> Self {
        let mut world = Self::new();
        world.initialize(config);
        world
    }

    /// Build the Rapier world. Calling this again on a live world is a no-op.
    pub fn initialize(&mut self, config: WorldConfig) {
        if self.sim.is_some() {
            log::warn!("particle world already initialized; ignoring re-initialize");
            return;
        }

        let mut sim = Simulation::new(config.gravity);

        if let Some(ground) = config.ground {
            let (w, h) = config.world_size();
            let body = RigidBodyBuilder::fixed()
                .translation(vector![0.0, h * 2.0])
                .build();
            let handle = sim.rigid_body_set.insert(body);
            let collider = ColliderBuilder::cuboid(w, h)
                .friction(ground.friction)
                .restitution(ground.restitution)
                .collision_groups(InteractionGroups::new(SCENERY_GROUP, PARTICLE_GROUP))
                .build();
            sim.collider_set
                .insert_with_parent(collider, handle, &mut sim.rigid_body_set);
        }

        log::debug!(
            "particle world initialized: {}x{} px, scale {}, cap {}",
            config.width,
            config.height,
            config.scale,
            config.max_particles
        );

        self.sim = Some(sim);
        self.config = config;
    }

    pub fn is_initialized(&self) -> bool {
        self.sim.is_some()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Advance the simulation by a fixed sub-step
    pub fn step(&mut self, dt: f32, velocity_iterations: usize, position_iterations: usize) -> Result<()> {
        let sim = self.sim.as_mut().ok_or(SquallError::NotInitialized)?;

        sim.integration_parameters.dt = dt;
        sim.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        sim.integration_parameters.num_internal_stabilization_iterations = position_iterations;

        sim.physics_pipeline.step(
            &sim.gravity,
            &sim.integration_parameters,
            &mut sim.island_manager,
            &mut sim.broad_phase,
            &mut sim.narrow_phase,
            &mut sim.rigid_body_set,
            &mut sim.collider_set,
            &mut sim.impulse_joint_set,
            &mut sim.multibody_joint_set,
            &mut sim.ccd_solver,
            None,
            &(),
            &(),
        );
        Ok(())
    }

    /// Replace the gravity vector (the wind model drives the x component)
    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<()> {
        let sim = self.sim.as_mut().ok_or(SquallError::NotInitialized)?;
        sim.gravity = vector![gravity.x, gravity.y];
        Ok(())
    }

    pub fn gravity(&self) -> Option<Vec2> {
        self.sim
            .as_ref()
            .map(|sim| Vec2::new(sim.gravity.x, sim.gravity.y))
    }

    /// Spawn a group of particles filling `def.shape`.
    ///
    /// When the particle cap is reached the group is created with fewer
    /// particles (possibly none); this is not an error.
    pub fn create_group(&mut self, def: &ParticleGroupDef) -> Result<ParticleGroupHandle> {
        let sim = self.sim.as_mut().ok_or(SquallError::NotInitialized)?;

        let radius = self.config.particle_radius();
        let filter = if self.config.self_collide {
            PARTICLE_GROUP | SCENERY_GROUP
        } else {
            SCENERY_GROUP
        };

        let room = self.config.max_particles.saturating_sub(self.particle_count);
        let (lattice, truncated) = def.shape.lattice(radius * 1.5, room);
        if truncated {
            log::debug!(
                "particle cap {} reached: group gets {} particles",
                self.config.max_particles,
                lattice.len()
            );
        }

        let mut bodies = Vec::with_capacity(lattice.len());
        for offset in lattice {
            let body = RigidBodyBuilder::dynamic()
                .translation(vector![def.position.x + offset.x, def.position.y + offset.y])
                .linvel(vector![def.linear_velocity.x, def.linear_velocity.y])
                .linear_damping(self.config.linear_damping)
                .lock_rotations()
                .build();
            let handle = sim.rigid_body_set.insert(body);
            let collider = ColliderBuilder::ball(radius)
                .density(self.config.density)
                .collision_groups(InteractionGroups::new(PARTICLE_GROUP, filter))
                .build();
            sim.collider_set
                .insert_with_parent(collider, handle, &mut sim.rigid_body_set);
            bodies.push(handle);
        }

        self.particle_count += bodies.len();
        let id = self.next_group_id;
        self.next_group_id = self.next_group_id.wrapping_add(1);
        self.groups.insert(id, bodies);
        Ok(ParticleGroupHandle(id))
    }

    /// Remove every particle of a group; the handle is invalid afterwards
    pub fn destroy_group(&mut self, handle: ParticleGroupHandle) -> Result<()> {
        let sim = self.sim.as_mut().ok_or(SquallError::NotInitialized)?;
        let bodies = self
            .groups
            .remove(&handle.0)
            .ok_or(SquallError::UnknownGroup(handle.0))?;

        self.particle_count -= bodies.len();
        for body in bodies {
            sim.remove_body(body);
        }
        Ok(())
    }

    pub fn contains_group(&self, handle: ParticleGroupHandle) -> bool {
        self.groups.contains_key(&handle.0)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Live particles in one group, `None` for an unknown handle
    pub fn group_particle_count(&self, handle: ParticleGroupHandle) -> Option<usize> {
        self.groups.get(&handle.0).map(Vec::len)
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Copy every live particle position (world units) into `out`
    pub fn positions_into(&self, out: &mut Vec<Vec2>) {
        out.clear();
        if let Some(sim) = &self.sim {
            out.extend(
                sim.rigid_body_set
                    .iter()
                    .filter(|(_, body)| body.is_dynamic())
                    .map(|(_, body)| Vec2::new(body.translation().x, body.translation().y)),
            );
        }
    }

    /// Same as [`positions_into`](Self::positions_into), scaled to pixels
    pub fn screen_positions_into(&self, out: &mut Vec<Vec2>) {
        self.positions_into(out);
        let scale = self.config.scale;
        for p in out.iter_mut() {
            *p = *p * scale;
        }
    }

    /// Snapshot of every live particle position in world units
    pub fn positions(&self) -> Vec<Vec2> {
        let mut out = Vec::with_capacity(self.particle_count);
        self.positions_into(&mut out);
        out
    }
}

impl Default for ParticleWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupShape;

    fn drop_def(x: f32, y: f32) -> ParticleGroupDef {
        ParticleGroupDef {
            shape: GroupShape::Box {
                half_width: 0.0,
                half_height: 0.25,
            },
            position: Vec2::new(x, y),
            linear_velocity: Vec2::new(0.0, 1.0),
        }
    }

    fn test_config() -> WorldConfig {
        WorldConfig {
            width: 400.0,
            height: 800.0,
            scale: 100.0,
            particle_radius_px: 10.0,
            max_particles: 100,
            self_collide: false,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_uninitialized_world_rejects_calls() {
        let mut world = ParticleWorld::new();
        assert!(!world.is_initialized());
        assert!(matches!(
            world.step(1.0 / 120.0, 8, 3),
            Err(SquallError::NotInitialized)
        ));
        assert!(matches!(
            world.create_group(&drop_def(0.0, 0.0)),
            Err(SquallError::NotInitialized)
        ));
        assert!(world.positions().is_empty());
    }

    #[test]
    fn test_create_and_destroy_group() {
        let mut world = ParticleWorld::with_config(test_config());
        let handle = world.create_group(&drop_def(1.0, 1.0)).unwrap();

        let count = world.group_particle_count(handle).unwrap();
        assert!(count > 1);
        assert_eq!(world.particle_count(), count);
        assert_eq!(world.positions().len(), count);

        world.destroy_group(handle).unwrap();
        assert_eq!(world.particle_count(), 0);
        assert!(world.positions().is_empty());
        assert!(!world.contains_group(handle));
    }

    #[test]
    fn test_destroyed_handle_is_rejected() {
        let mut world = ParticleWorld::with_config(test_config());
        let handle = world.create_group(&drop_def(1.0, 1.0)).unwrap();
        world.destroy_group(handle).unwrap();
        assert!(matches!(
            world.destroy_group(handle),
            Err(SquallError::UnknownGroup(_))
        ));
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut world = ParticleWorld::with_config(test_config());
        let a = world.create_group(&drop_def(1.0, 1.0)).unwrap();
        world.destroy_group(a).unwrap();
        let b = world.create_group(&drop_def(1.0, 1.0)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cap_degrades_silently() {
        let config = WorldConfig {
            max_particles: 4,
            ..test_config()
        };
        let mut world = ParticleWorld::with_config(config);

        let first = world.create_group(&drop_def(1.0, 1.0)).unwrap();
        let second = world.create_group(&drop_def(2.0, 1.0)).unwrap();
        let third = world.create_group(&drop_def(3.0, 1.0)).unwrap();

        assert_eq!(world.particle_count(), 4);
        let total = world.group_particle_count(first).unwrap()
            + world.group_particle_count(second).unwrap()
            + world.group_particle_count(third).unwrap();
        assert_eq!(total, 4);
        assert_eq!(world.group_particle_count(third), Some(0));
    }

    #[test]
    fn test_gravity_moves_particles_down() {
        let mut world = ParticleWorld::with_config(test_config());
        world.create_group(&drop_def(2.0, 1.0)).unwrap();
        let before: f32 = world.positions().iter().map(|p| p.y).sum();

        for _ in 0..60 {
            world.step(1.0 / 120.0, 8, 3).unwrap();
        }

        let after: f32 = world.positions().iter().map(|p| p.y).sum();
        assert!(after > before);
    }

    #[test]
    fn test_ground_is_not_reported_as_particle() {
        let config = WorldConfig {
            ground: Some(GroundConfig {
                friction: 10.0,
                restitution: 0.3,
            }),
            ..test_config()
        };
        let world = ParticleWorld::with_config(config);
        assert!(world.positions().is_empty());
    }

    #[test]
    fn test_screen_positions_are_scaled() {
        let mut world = ParticleWorld::with_config(test_config());
        world
            .create_group(&ParticleGroupDef {
                shape: GroupShape::Circle { radius: 0.01 },
                position: Vec2::new(1.5, 2.0),
                linear_velocity: Vec2::ZERO,
            })
            .unwrap();

        let mut buf = Vec::new();
        world.screen_positions_into(&mut buf);
        assert_eq!(buf.len(), 1);
        assert!((buf[0].x - 150.0).abs() < 1e-3);
        assert!((buf[0].y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_set_gravity() {
        let mut world = ParticleWorld::with_config(test_config());
        world.set_gravity(Vec2::new(1.5, 5.5)).unwrap();
        assert_eq!(world.gravity(), Some(Vec2::new(1.5, 5.5)));
    }
}
