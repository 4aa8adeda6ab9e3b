//! Maps the selected weather onto at most one running layer worker

use squall_core::{EffectKind, Result, SquallError, Vec2};
use squall_particles::{EffectLayer, EffectsConfig, LayerStats, PointInstance};

use crate::worker::LayerWorker;

pub struct EffectHost {
    config: EffectsConfig,
    rate_hz: f64,
    viewport: Option<(f32, f32)>,
    selected: EffectKind,
    worker: Option<LayerWorker>,
}

impl EffectHost {
    pub fn new(config: EffectsConfig, rate_hz: f64) -> Self {
        Self {
            config,
            rate_hz,
            viewport: None,
            selected: EffectKind::None,
            worker: None,
        }
    }

    /// Switch to `kind`. The previous layer is stopped first; `None` just stops.
    ///
    /// Without a viewport the selection is remembered and started on
    /// [`set_viewport`](Self::set_viewport).
    pub fn apply(&mut self, kind: EffectKind) -> Result<()> {
        if kind == self.selected && (self.worker.is_some() || self.viewport.is_none()) {
            return Ok(());
        }
        self.stop_worker();
        self.selected = kind;
        self.start_selected()
    }

    /// Update the viewport size in px; a running layer is rebuilt at the new size
    pub fn set_viewport(&mut self, width: f32, height: f32) -> Result<()> {
        if width <= 0.0 || height <= 0.0 {
            return Err(SquallError::Config(format!(
                "viewport must be positive, got {}x{}",
                width, height
            )));
        }
        if self.viewport == Some((width, height)) && self.worker.is_some() {
            return Ok(());
        }
        self.viewport = Some((width, height));
        self.stop_worker();
        self.start_selected()
    }

    /// Stop everything. The host can be reused with another `apply`.
    pub fn dispose(&mut self) {
        self.stop_worker();
        self.selected = EffectKind::None;
    }

    pub fn selected(&self) -> EffectKind {
        self.selected
    }

    pub fn viewport(&self) -> Option<(f32, f32)> {
        self.viewport
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(LayerWorker::is_running)
    }

    /// Latest screen positions; empties `out` when nothing runs
    pub fn snapshot_into(&self, out: &mut Vec<Vec2>) {
        match &self.worker {
            Some(worker) => worker.snapshot_into(out),
            None => out.clear(),
        }
    }

    pub fn instances_into(&self, out: &mut Vec<PointInstance>) {
        match &self.worker {
            Some(worker) => worker.instances_into(out),
            None => out.clear(),
        }
    }

    pub fn stats(&self) -> Option<LayerStats> {
        self.worker.as_ref().map(LayerWorker::stats)
    }

    fn start_selected(&mut self) -> Result<()> {
        let Some((width, height)) = self.viewport else {
            return Ok(());
        };
        let Some(config) = self.config.layer(self.selected) else {
            return Ok(());
        };
        let layer = EffectLayer::new(self.selected, config.clone(), width, height)?;
        self.worker = Some(LayerWorker::spawn(layer, self.rate_hz)?);
        Ok(())
    }

    fn stop_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> EffectHost {
        let mut config = EffectsConfig::default();
        config.rain.pool_size = 4;
        config.snow.pool_size = 4;
        config.smoke.pool_size = 4;
        EffectHost::new(config, 60.0)
    }

    #[test]
    fn apply_before_viewport_defers_start() {
        let mut host = host();
        host.apply(EffectKind::Snow).unwrap();
        assert_eq!(host.selected(), EffectKind::Snow);
        assert!(!host.is_running());

        host.set_viewport(300.0, 600.0).unwrap();
        assert!(host.is_running());
        assert_eq!(host.stats().map(|s| s.kind), Some(EffectKind::Snow));
        host.dispose();
    }

    #[test]
    fn switching_replaces_the_layer() {
        let mut host = host();
        host.set_viewport(300.0, 600.0).unwrap();
        assert!(!host.is_running());

        host.apply(EffectKind::Rain).unwrap();
        assert_eq!(host.stats().map(|s| s.kind), Some(EffectKind::Rain));
        host.apply(EffectKind::Smoke).unwrap();
        assert_eq!(host.stats().map(|s| s.kind), Some(EffectKind::Smoke));

        host.apply(EffectKind::None).unwrap();
        assert!(!host.is_running());
        assert!(host.stats().is_none());

        let mut out = vec![Vec2::ZERO; 3];
        host.snapshot_into(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn dispose_stops_and_resets() {
        let mut host = host();
        host.set_viewport(300.0, 600.0).unwrap();
        host.apply(EffectKind::Rain).unwrap();
        host.dispose();
        assert!(!host.is_running());
        assert_eq!(host.selected(), EffectKind::None);
    }

    #[test]
    fn viewport_change_rebuilds_running_layer() {
        let mut host = host();
        host.set_viewport(300.0, 600.0).unwrap();
        host.apply(EffectKind::Rain).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(200));
        let before = host.stats().unwrap().ticks;
        assert!(before > 0);

        // Same size keeps the worker
        host.set_viewport(300.0, 600.0).unwrap();
        assert!(host.stats().unwrap().ticks >= before);

        host.set_viewport(400.0, 700.0).unwrap();
        assert!(host.is_running());
        assert_eq!(host.viewport(), Some((400.0, 700.0)));
        let stats = host.stats().unwrap();
        assert_eq!(stats.kind, EffectKind::Rain);
        assert!(stats.ticks < before);
        assert_eq!(stats.groups, 4);
        host.dispose();
    }

    #[test]
    fn bad_viewport_is_rejected() {
        let mut host = host();
        assert!(host.set_viewport(0.0, 100.0).is_err());
    }
}
