//! Order Status Engine
//!
//! Advances an order through the canonical status sequence over its time
//! budget. A tracked order is ticked every [`TrackingConfig::tick`] after an
//! initial delay; each tick maps simulated elapsed time onto a status and
//! reports forward moves to the [`TrackingObserver`]. Reaching `Delivered`
//! fires one completion and ends the engine.

mod config;
mod handle;
mod observer;
mod progression;
mod reducer;

pub use config::TrackingConfig;
pub use handle::{TrackingHandle, track_order};
pub use observer::{LoggingObserver, TrackingObserver};
pub use progression::{StatusProgression, Step};
pub use reducer::{
    TrackingAction, TrackingEnvironment, TrackingReducer, TrackingState, tracking_effect_id,
};
