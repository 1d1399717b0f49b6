//! Internet radio widget: plays a live stream through the page's audio element
//! and animates a circular VU meter from a random walk.
//!
//! The playback state machine and the meter are platform neutral and driven
//! through the traits in [`host`]. The `wasm32` build binds them to the DOM and
//! starts itself through `wasm_bindgen(start)`.

pub mod animator;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod logging;
pub mod meter;
pub mod scheduler;

#[cfg(target_arch = "wasm32")]
mod web;

pub use animator::Animator;
pub use config::{MeterConfig, PlayerConfig};
pub use controller::{
    cache_busted_url, Glyph, PendingPlay, PlaybackController, PlaybackRoute, PlaybackState, Status,
};
pub use error::{Error, Result};
pub use host::{FallbackSurface, MediaElement, MediaEvent, PlayerView};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
