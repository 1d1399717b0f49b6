//! Capabilities the controller needs from its host page.

use crate::controller::{Glyph, Status};
use crate::error::Result;
use crate::meter::BarLevel;

/// Events the media element reports back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
    Error(String),
}

/// The subset of an HTML media element the player drives.
pub trait MediaElement {
    /// Settlement of a play request, resolved by the host outside the controller.
    type PendingPlay;

    fn pause(&mut self);
    fn clear_source(&mut self);
    fn load(&mut self);
    fn set_source(&mut self, url: &str);

    /// Starts playback.
    ///
    /// # Errors
    /// Returns [`crate::Error::PlayRejected`] when the request fails before a
    /// pending result exists.
    fn play(&mut self) -> Result<Self::PendingPlay>;
}

/// Hidden embedded frame used when direct playback fails.
pub trait FallbackSurface {
    /// Attaches a frame pointed at `url`, replacing any existing one.
    ///
    /// # Errors
    /// Returns [`crate::Error::Fallback`] when the frame cannot be created.
    fn attach(&mut self, url: &str) -> Result<()>;
    fn detach(&mut self);
    fn is_attached(&self) -> bool;
}

pub trait PlayerView {
    fn set_status(&mut self, status: Status);
    fn set_glyph(&mut self, glyph: Glyph);
    fn render_bars(&mut self, levels: &[BarLevel]);
}
