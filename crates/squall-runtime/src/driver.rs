//! Drives a disintegration from start to finish off real frame times

use squall_particles::{DisintegrationConfig, DisintegrationSystem, Raster};

/// Progress gained per second of the main phase
pub const PROGRESS_RATE: f32 = 0.7;
/// Seconds the system keeps updating at full progress after the main phase
pub const FADE_TAIL_SECS: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveStatus {
    /// Nothing started, or the last run already finished
    Idle,
    Running,
    /// Emitted once, on the frame the transition ends; the system is reset
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Dissolving,
    FadingOut { elapsed: f32 },
}

pub struct DisintegrationDriver {
    system: DisintegrationSystem,
    phase: Phase,
    progress: f32,
}

impl DisintegrationDriver {
    pub fn new(config: DisintegrationConfig) -> Self {
        Self::with_system(DisintegrationSystem::new(config))
    }

    pub fn with_system(system: DisintegrationSystem) -> Self {
        Self {
            system,
            phase: Phase::Idle,
            progress: 0.0,
        }
    }

    /// Decompose `raster` over a `width` x `height` display area and start.
    ///
    /// Returns the particle count. A running transition is discarded.
    pub fn start(&mut self, raster: &Raster, width: u32, height: u32) -> usize {
        self.system.reset();
        let count = self.system.init_from_raster(raster, width, height);
        self.progress = 0.0;
        self.phase = Phase::Dissolving;
        log::debug!("disintegration started with {} particles", count);
        count
    }

    /// Advance by `dt` seconds of real time
    pub fn update(&mut self, dt: f32) -> DriveStatus {
        let dt = dt.max(0.0);
        match self.phase {
            Phase::Idle => DriveStatus::Idle,
            Phase::Dissolving => {
                self.progress = (self.progress + dt * PROGRESS_RATE).min(1.0);
                self.system.update(self.progress, dt);
                if self.system.is_complete() {
                    self.finish()
                } else {
                    if self.progress >= 1.0 {
                        self.phase = Phase::FadingOut { elapsed: 0.0 };
                    }
                    DriveStatus::Running
                }
            }
            Phase::FadingOut { elapsed } => {
                self.system.update(1.0, dt);
                let elapsed = elapsed + dt;
                if elapsed >= FADE_TAIL_SECS || self.system.is_complete() {
                    self.finish()
                } else {
                    self.phase = Phase::FadingOut { elapsed };
                    DriveStatus::Running
                }
            }
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn system(&self) -> &DisintegrationSystem {
        &self.system
    }

    /// Abort and clear any running transition
    pub fn cancel(&mut self) {
        self.system.reset();
        self.phase = Phase::Idle;
        self.progress = 0.0;
    }

    fn finish(&mut self) -> DriveStatus {
        log::debug!("disintegration finished at progress {:.2}", self.progress);
        self.cancel();
        DriveStatus::Finished
    }
}
