//! Squall Runtime - threading and pacing around the particle layers
//!
//! - `FixedClock` - fixed-timestep accumulator used for pacing
//! - `LayerWorker` - one background thread per running layer
//! - `EffectHost` - switches the running layer to match the selected weather
//! - `DisintegrationDriver` - advances a disintegration off real frame times

mod clock;
mod driver;
mod host;
mod worker;

pub use clock::FixedClock;
pub use driver::{DisintegrationDriver, DriveStatus, FADE_TAIL_SECS, PROGRESS_RATE};
pub use host::EffectHost;
pub use worker::LayerWorker;
