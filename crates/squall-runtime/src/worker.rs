//! Background stepping thread for one effect layer

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use squall_core::{EffectKind, Result, Rgba, SquallError, Vec2};
use squall_particles::{pack_points, EffectLayer, LayerStats, PointInstance, PointStyle};

use crate::clock::FixedClock;

/// Fixed steps a single wake-up may run before dropping the backlog
const MAX_CATCH_UP_STEPS: u32 = 4;

/// Owns one layer and the thread that ticks it.
///
/// The layer sits behind a mutex shared with the worker; readers hold the
/// lock only long enough to copy out positions.
pub struct LayerWorker {
    kind: EffectKind,
    style: PointStyle,
    layer: Arc<Mutex<EffectLayer>>,
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl LayerWorker {
    /// Initialize `layer` and start ticking it `rate_hz` times per second
    pub fn spawn(mut layer: EffectLayer, rate_hz: f64) -> Result<Self> {
        let kind = layer.kind();
        let style = layer.config().style.clone();
        let clock = FixedClock::with_rate(rate_hz);
        if !layer.is_initialized() {
            layer.initialize(clock.now_ms())?;
        }

        let layer = Arc::new(Mutex::new(layer));
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let shared = Arc::clone(&layer);

        let thread = thread::Builder::new()
            .name(format!("squall-{}", kind))
            .spawn(move || run_loop(shared, clock, stop_rx))
            .map_err(|e| SquallError::WorkerError(e.to_string()))?;

        log::info!("{} worker started at {} Hz", kind, rate_hz);
        Ok(Self {
            kind,
            style,
            layer,
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Copy the latest screen-space positions into `out`
    pub fn snapshot_into(&self, out: &mut Vec<Vec2>) {
        self.layer.lock().snapshot_into(out);
    }

    /// Pack the latest positions as draw instances using the layer's style.
    ///
    /// Only the position copy happens under the lock.
    pub fn instances_into(&self, out: &mut Vec<PointInstance>) {
        let mut positions = Vec::with_capacity(out.len());
        self.snapshot_into(&mut positions);
        pack_points(
            &positions,
            &self.style.sizes,
            Rgba::from_slice(&self.style.color),
            out,
        );
    }

    pub fn stats(&self) -> LayerStats {
        self.layer.lock().stats()
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the thread and wait for it to exit
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // A full channel or a gone receiver both mean the loop will exit
            let _ = stop.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("{} worker panicked", self.kind);
            } else {
                log::info!("{} worker stopped", self.kind);
            }
        }
    }
}

impl Drop for LayerWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    layer: Arc<Mutex<EffectLayer>>,
    mut clock: FixedClock,
    stop: channel::Receiver<()>,
) {
    loop {
        match stop.recv_timeout(clock.until_next_step()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        clock.tick();
        let mut steps = 0;
        while clock.should_fixed_update() {
            clock.consume_fixed_step();
            if steps >= MAX_CATCH_UP_STEPS {
                continue;
            }
            steps += 1;

            let now = clock.now_ms();
            let mut guard = layer.lock();
            if let Err(e) = guard.tick(now) {
                log::warn!("{} tick failed: {}", guard.kind(), e);
            }
        }
    }
}
