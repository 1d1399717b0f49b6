//! Stand-ins for the browser pieces so the widget runs inside an egui window.

use std::collections::VecDeque;
use std::time::Duration;

use radio_vu::meter::BarLevel;
use radio_vu::{Error, FallbackSurface, Glyph, MediaElement, MediaEvent, PlayerView, Result, Status};
use web_time::Instant;

/// How the simulated stream behaves on the next play request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    Healthy,
    AutoplayBlocked,
    StreamError,
}

/// Deferred outcome of [`SimulatedMedia::play`].
#[derive(Debug)]
pub struct PlayTicket {
    pub ready_at: Instant,
    pub outcome: Result<()>,
}

impl PlayTicket {
    pub fn is_ready(&self, now: Instant) -> bool {
        now >= self.ready_at
    }
}

/// Media element that never touches the network. Events are queued with a
/// due time and handed out by [`SimulatedMedia::poll`].
pub struct SimulatedMedia {
    pub scenario: Scenario,
    latency: Duration,
    source: Option<String>,
    playing: bool,
    queued: VecDeque<(Instant, MediaEvent)>,
}

impl SimulatedMedia {
    pub fn new(latency: Duration) -> Self {
        Self {
            scenario: Scenario::Healthy,
            latency,
            source: None,
            playing: false,
            queued: VecDeque::new(),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Simulates the broadcaster closing the stream.
    pub fn end_stream(&mut self) {
        if self.playing {
            self.queued.push_back((Instant::now(), MediaEvent::Ended));
        }
    }

    /// Events due at `now`, oldest first.
    pub fn poll(&mut self, now: Instant) -> Vec<MediaEvent> {
        let mut due = Vec::new();
        while self.queued.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, event)) = self.queued.pop_front() {
                match event {
                    MediaEvent::Play => self.playing = true,
                    MediaEvent::Pause | MediaEvent::Ended | MediaEvent::Error(_) => self.playing = false,
                }
                due.push(event);
            }
        }
        due
    }
}

impl MediaElement for SimulatedMedia {
    type PendingPlay = PlayTicket;

    fn pause(&mut self) {
        if self.playing {
            self.queued.push_back((Instant::now(), MediaEvent::Pause));
        }
    }

    fn clear_source(&mut self) {
        self.source = None;
        self.playing = false;
        self.queued.clear();
    }

    fn load(&mut self) {}

    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_owned());
    }

    fn play(&mut self) -> Result<PlayTicket> {
        if self.source.is_none() {
            return Err(Error::PlayRejected("no source set".into()));
        }
        let ready_at = Instant::now() + self.latency;
        let outcome = match self.scenario {
            Scenario::Healthy => {
                self.queued.push_back((ready_at, MediaEvent::Play));
                Ok(())
            }
            Scenario::AutoplayBlocked => Err(Error::PlayRejected(
                "NotAllowedError: play() failed because the user didn't interact with the document first".into(),
            )),
            Scenario::StreamError => {
                self.queued.push_back((ready_at, MediaEvent::Play));
                self.queued
                    .push_back((ready_at + self.latency, MediaEvent::Error("MEDIA_ERR_NETWORK".into())));
                Ok(())
            }
        };
        Ok(PlayTicket { ready_at, outcome })
    }
}

/// Records the URL the hidden frame would load.
#[derive(Default)]
pub struct PreviewFallback {
    pub url: Option<String>,
    /// Makes the next attach fail, as when the page forbids frames.
    pub broken: bool,
}

impl FallbackSurface for PreviewFallback {
    fn attach(&mut self, url: &str) -> Result<()> {
        self.detach();
        if self.broken {
            return Err(Error::Fallback("frame embedding disabled".into()));
        }
        self.url = Some(url.to_owned());
        Ok(())
    }

    fn detach(&mut self) {
        self.url = None;
    }

    fn is_attached(&self) -> bool {
        self.url.is_some()
    }
}

/// Latest values pushed by the controller, read back when painting.
pub struct PreviewView {
    pub status: Status,
    pub glyph: Glyph,
    pub bars: Vec<BarLevel>,
}

impl Default for PreviewView {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            glyph: Glyph::Play,
            bars: Vec::new(),
        }
    }
}

impl PlayerView for PreviewView {
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn set_glyph(&mut self, glyph: Glyph) {
        self.glyph = glyph;
    }

    fn render_bars(&mut self, levels: &[BarLevel]) {
        self.bars.clear();
        self.bars.extend_from_slice(levels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};
    use radio_vu::{ManualScheduler, PlaybackController, PlaybackRoute, PlaybackState, PlayerConfig};
    use web_time::SystemTime;

    type Controller = PlaybackController<SimulatedMedia, PreviewFallback, PreviewView, ManualScheduler, SmallRng>;

    fn controller(scenario: Scenario) -> Controller {
        let mut media = SimulatedMedia::new(Duration::ZERO);
        media.scenario = scenario;
        PlaybackController::new(
            &PlayerConfig::default(),
            media,
            PreviewFallback::default(),
            PreviewView::default(),
            ManualScheduler::default(),
            SmallRng::seed_from_u64(4),
        )
    }

    fn pump(c: &mut Controller) {
        let events = c.media_mut().poll(Instant::now());
        for event in events {
            c.on_media_event(event);
        }
    }

    #[test]
    fn healthy_stream_plays_directly() {
        let mut c = controller(Scenario::Healthy);
        let pending = c.toggle(SystemTime::now()).unwrap();
        assert!(c.media().source().unwrap().contains("&t="));
        c.on_play_settled(pending.generation, pending.request.outcome);
        pump(&mut c);
        assert_eq!(c.state(), PlaybackState::Playing(PlaybackRoute::Direct));
        assert_eq!(c.view().status, Status::Playing);
        assert!(c.media().is_playing());
    }

    #[test]
    fn blocked_autoplay_uses_fallback() {
        let mut c = controller(Scenario::AutoplayBlocked);
        let pending = c.toggle(SystemTime::now()).unwrap();
        c.on_play_settled(pending.generation, pending.request.outcome);
        assert_eq!(c.state(), PlaybackState::Playing(PlaybackRoute::Fallback));
        assert_eq!(c.view().status, Status::PlayingFallback);
        assert!(c.fallback().url.is_some());
        assert!(c.media().source().is_none());
    }

    #[test]
    fn stream_error_after_start_uses_fallback() {
        let mut c = controller(Scenario::StreamError);
        let pending = c.toggle(SystemTime::now()).unwrap();
        c.on_play_settled(pending.generation, pending.request.outcome);
        pump(&mut c);
        assert_eq!(c.view().status, Status::PlayingFallback);
        assert_eq!(c.view().glyph, Glyph::Pause);
    }

    #[test]
    fn end_of_stream_is_reported() {
        let mut c = controller(Scenario::Healthy);
        let pending = c.toggle(SystemTime::now()).unwrap();
        c.on_play_settled(pending.generation, pending.request.outcome);
        pump(&mut c);
        c.media_mut().end_stream();
        pump(&mut c);
        assert_eq!(c.view().status, Status::Ended);
        assert_eq!(c.state(), PlaybackState::Ended);
    }

    #[test]
    fn stop_discards_queued_events() {
        let mut media = SimulatedMedia::new(Duration::from_secs(60));
        media.set_source("https://radio.example/live");
        let _ticket = media.play().unwrap();
        media.clear_source();
        assert!(media.poll(Instant::now() + Duration::from_secs(120)).is_empty());
        assert!(matches!(media.play(), Err(Error::PlayRejected(_))));
    }
}
