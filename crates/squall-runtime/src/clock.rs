//! Fixed-timestep clock used to pace layer workers

use std::time::{Duration, Instant};

/// Clamp on a single frame's elapsed time, avoids a catch-up spiral after a stall
const MAX_FRAME_TIME: f64 = 0.25;

/// Tracks elapsed time and a fixed-step accumulator
pub struct FixedClock {
    /// Total clamped time in seconds
    pub total_time: f64,
    /// Time since the last tick in seconds
    pub delta_time: f64,
    /// Fixed step interval in seconds
    pub fixed_timestep: f64,
    accumulator: f64,
    start: Instant,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for FixedClock {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: 1.0 / 60.0,
            accumulator: 0.0,
            start: now,
            last_instant: now,
            first_tick: true,
        }
    }
}

impl FixedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock stepping at `hz` fixed updates per second
    pub fn with_rate(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz.max(1.0),
            ..Self::default()
        }
    }

    /// Sample the wall clock. Call once per loop iteration.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Feed `seconds` of time directly (simulated clocks, tests)
    pub fn advance(&mut self, seconds: f64) {
        self.delta_time = seconds.clamp(0.0, MAX_FRAME_TIME);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
    }

    pub fn should_fixed_update(&self) -> bool {
        self.accumulator >= self.fixed_timestep
    }

    pub fn consume_fixed_step(&mut self) {
        self.accumulator -= self.fixed_timestep;
    }

    /// How long to wait before the next fixed step is due
    pub fn until_next_step(&self) -> Duration {
        Duration::from_secs_f64((self.fixed_timestep - self.accumulator).max(0.0))
    }

    /// Monotonic wall-clock milliseconds since the clock was created
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
