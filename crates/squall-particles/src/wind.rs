//! Slow synthetic wind: superposed low-frequency sinusoids, re-evaluated
//! only every `change_interval` ticks and held constant in between.

use serde::{Deserialize, Serialize};

/// One sinusoid term: `amplitude * sin(frequency * t + phase)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindWave {
    pub amplitude: f32,
    /// Angular frequency in rad/s
    pub frequency: f32,
    #[serde(default)]
    pub phase: f32,
}

impl WindWave {
    pub const fn new(amplitude: f32, frequency: f32, phase: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase,
        }
    }

    fn eval(&self, t: f64) -> f64 {
        self.amplitude as f64 * (self.frequency as f64 * t + self.phase as f64).sin()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Ticks between recomputations
    pub change_interval: u32,
    /// Clamp on the absolute horizontal force
    pub max_force: f32,
    pub waves: Vec<WindWave>,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            change_interval: 60,
            max_force: 4.5,
            waves: vec![WindWave::new(3.0, 0.5, 0.0), WindWave::new(1.5, 0.3, 0.0)],
        }
    }
}

impl WindConfig {
    /// Horizontal force at time `t` (seconds), clamped to `±max_force`
    pub fn force_at(&self, t: f64) -> f32 {
        let raw: f64 = self.waves.iter().map(|w| w.eval(t)).sum();
        (raw as f32).clamp(-self.max_force, self.max_force)
    }
}

/// Current wind state for one layer
#[derive(Debug, Clone)]
pub struct WindModel {
    config: WindConfig,
    force_x: f32,
    tick_counter: u32,
}

impl WindModel {
    pub fn new(config: WindConfig) -> Self {
        Self {
            config,
            force_x: 0.0,
            tick_counter: 0,
        }
    }

    pub fn force(&self) -> f32 {
        self.force_x
    }

    pub fn config(&self) -> &WindConfig {
        &self.config
    }

    /// Count one tick; recompute the force once the interval has elapsed.
    ///
    /// Returns the (possibly unchanged) horizontal force.
    pub fn update(&mut self, now_secs: f64) -> f32 {
        self.tick_counter += 1;
        if self.tick_counter >= self.config.change_interval {
            self.tick_counter = 0;
            self.force_x = self.config.force_at(now_secs);
        }
        self.force_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snow_like() -> WindConfig {
        WindConfig {
            change_interval: 40,
            max_force: 2.5,
            waves: vec![
                WindWave::new(1.5, 0.6, 0.0),
                WindWave::new(0.8, 0.28, 0.0),
                WindWave::new(0.5, 0.15, std::f32::consts::FRAC_PI_2),
            ],
        }
    }

    #[test]
    fn force_holds_between_intervals() {
        let mut wind = WindModel::new(snow_like());
        for i in 0..39 {
            let f = wind.update(1.0 + i as f64);
            assert_eq!(f, 0.0);
        }
        let changed = wind.update(2.0);
        assert!((changed - snow_like().force_at(2.0)).abs() < 1e-6);
        assert!(changed != 0.0);
    }

    #[test]
    fn force_changes_at_most_once_per_interval() {
        let mut wind = WindModel::new(snow_like());
        let mut changes = 0;
        let mut last = wind.force();
        for i in 0..400 {
            let f = wind.update(i as f64 * 0.37);
            if f != last {
                changes += 1;
                last = f;
            }
        }
        assert!(changes <= 400 / 40);
    }

    #[test]
    fn force_is_clamped() {
        let config = WindConfig {
            change_interval: 1,
            max_force: 1.0,
            waves: vec![WindWave::new(10.0, 1.0, std::f32::consts::FRAC_PI_2)],
        };
        assert_eq!(config.force_at(0.0), 1.0);
        for i in 0..200 {
            assert!(config.force_at(i as f64 * 0.1).abs() <= 1.0);
        }
    }

    #[test]
    fn interval_of_one_recomputes_every_tick() {
        let mut wind = WindModel::new(WindConfig {
            change_interval: 1,
            ..WindConfig::default()
        });
        let a = wind.update(1.0);
        let b = wind.update(2.0);
        assert!(a != b);
    }
}
