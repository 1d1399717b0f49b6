use rand::Rng;
use web_time::{Instant, SystemTime, UNIX_EPOCH};

use crate::animator::Animator;
use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::host::{FallbackSurface, MediaElement, MediaEvent, PlayerView};
use crate::scheduler::FrameScheduler;

/// Messages shown in the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Connecting,
    Playing,
    Paused,
    Ended,
    Stopped,
    MediaError,
    PlayRejected,
    TryingFallback,
    PlayingFallback,
}

impl Status {
    pub fn text(self) -> &'static str {
        match self {
            Status::Idle => "Haz clic en Play para comenzar la reproducción",
            Status::Connecting => "Intentando reproducir...",
            Status::Playing => "Reproduciendo...",
            Status::Paused => "Pausado",
            Status::Ended => "Finalizado",
            Status::Stopped => "Detenido",
            Status::MediaError => "Error al reproducir el audio. Intenta de nuevo.",
            Status::PlayRejected => "Error al reproducir. Intentando método alternativo...",
            Status::TryingFallback => "Intentando método alternativo...",
            Status::PlayingFallback => "Reproduciendo (método alternativo)",
        }
    }
}

/// Symbol on the play/pause button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Play,
    Pause,
}

impl Glyph {
    pub fn symbol(self) -> &'static str {
        match self {
            Glyph::Play => "▶",
            Glyph::Pause => "❚❚",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackRoute {
    /// The page's own media element.
    Direct,
    /// The hidden embedded frame.
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    /// A play request is in flight.
    Connecting,
    Playing(PlaybackRoute),
    Paused,
    Ended,
    Errored,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlaybackState::Playing(_))
    }

    /// Whether media element events still describe the current session.
    fn media_is_active(self) -> bool {
        matches!(
            self,
            PlaybackState::Connecting | PlaybackState::Playing(PlaybackRoute::Direct)
        )
    }
}

/// A play request handed back to the host to await.
#[must_use = "the host must report the settlement through `on_play_settled`"]
pub struct PendingPlay<P> {
    pub generation: u64,
    pub request: P,
}

/// Stream URL for one play attempt, tagged with a cache-busting timestamp.
pub fn cache_busted_url(base: &str, at: SystemTime) -> String {
    let millis = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}t={millis}")
}

/// Owns a playback session and the meter that follows it.
///
/// Every host callback lands on one of the `on_*` methods or on the button
/// handlers [`toggle`](Self::toggle) and [`stop`](Self::stop).
pub struct PlaybackController<M, F, V, S, R>
where
    M: MediaElement,
{
    stream_url: String,
    media: M,
    fallback: F,
    view: V,
    scheduler: S,
    rng: R,
    animator: Animator,
    state: PlaybackState,
    generation: u64,
}

impl<M, F, V, S, R> PlaybackController<M, F, V, S, R>
where
    M: MediaElement,
    F: FallbackSurface,
    V: PlayerView,
    S: FrameScheduler,
    R: Rng,
{
    pub fn new(config: &PlayerConfig, media: M, fallback: F, view: V, scheduler: S, rng: R) -> Self {
        let mut controller = Self {
            stream_url: config.stream_url.clone(),
            media,
            fallback,
            view,
            scheduler,
            rng,
            animator: Animator::new(&config.meter),
            state: PlaybackState::Stopped,
            generation: 0,
        };
        controller.view.set_status(Status::Idle);
        controller.view.set_glyph(Glyph::Play);
        controller.view.render_bars(controller.animator.meter().levels());
        controller
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub fn fallback_mut(&mut self) -> &mut F {
        &mut self.fallback
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Play/pause button.
    pub fn toggle(&mut self, at: SystemTime) -> Option<PendingPlay<M::PendingPlay>> {
        if self.state.is_playing() {
            self.cleanup();
            self.state = PlaybackState::Paused;
            self.view.set_status(Status::Paused);
            return None;
        }
        self.begin(at)
    }

    /// Stop button.
    pub fn stop(&mut self) {
        self.cleanup();
        self.state = PlaybackState::Stopped;
        self.view.set_status(Status::Stopped);
    }

    /// Outcome of the play request issued for `generation`.
    pub fn on_play_settled(&mut self, generation: u64, result: Result<()>) {
        if generation != self.generation {
            log::debug!(
                "dropping play result for generation {generation}, current is {}",
                self.generation
            );
            return;
        }
        match result {
            Ok(()) => {
                if self.state == PlaybackState::Connecting {
                    self.view.set_status(Status::Playing);
                }
            }
            Err(err) => {
                if self.state.media_is_active() {
                    self.fail(err);
                } else {
                    log::debug!("play rejection after session moved on: {err}");
                }
            }
        }
    }

    pub fn on_media_event(&mut self, event: MediaEvent) {
        if !self.state.media_is_active() {
            log::debug!("ignoring {event:?} while {:?}", self.state);
            return;
        }
        match event {
            MediaEvent::Play => {
                self.state = PlaybackState::Playing(PlaybackRoute::Direct);
                self.view.set_glyph(Glyph::Pause);
                self.view.set_status(Status::Playing);
                self.animator.start(&mut self.scheduler);
            }
            MediaEvent::Pause => {
                self.state = PlaybackState::Paused;
                self.view.set_glyph(Glyph::Play);
                self.view.set_status(Status::Paused);
                self.stop_animation();
            }
            MediaEvent::Ended => {
                self.state = PlaybackState::Ended;
                self.view.set_glyph(Glyph::Play);
                self.view.set_status(Status::Ended);
                self.stop_animation();
            }
            MediaEvent::Error(detail) => self.fail(Error::Media(detail)),
        }
    }

    /// Frame callback requested through the scheduler.
    pub fn on_frame(&mut self, now: Instant) {
        let active = self.state.is_playing();
        if let Some(levels) = self
            .animator
            .frame(active, now, &mut self.scheduler, &mut self.rng)
        {
            self.view.render_bars(levels);
        } else if !active {
            self.view.render_bars(self.animator.meter().levels());
        }
    }

    fn begin(&mut self, at: SystemTime) -> Option<PendingPlay<M::PendingPlay>> {
        self.reset_media();
        let url = cache_busted_url(&self.stream_url, at);
        self.media.set_source(&url);
        self.generation += 1;
        self.state = PlaybackState::Connecting;
        self.view.set_status(Status::Connecting);
        log::info!("requesting playback of {url}");

        match self.media.play() {
            Ok(request) => Some(PendingPlay {
                generation: self.generation,
                request,
            }),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn fail(&mut self, err: Error) {
        log::error!("playback failed: {err}");
        self.view.set_status(err.status());
        self.view.set_glyph(Glyph::Play);
        self.stop_animation();
        self.state = PlaybackState::Errored;
        self.reset_media();
        self.try_fallback();
    }

    fn try_fallback(&mut self) {
        self.view.set_status(Status::TryingFallback);
        match self.fallback.attach(&self.stream_url) {
            Ok(()) => {
                log::info!("playing through fallback frame");
                self.state = PlaybackState::Playing(PlaybackRoute::Fallback);
                self.view.set_status(Status::PlayingFallback);
                self.view.set_glyph(Glyph::Pause);
                self.animator.start(&mut self.scheduler);
            }
            Err(err) => log::warn!("{err}"),
        }
    }

    fn cleanup(&mut self) {
        self.stop_animation();
        self.reset_media();
        self.fallback.detach();
        self.view.set_glyph(Glyph::Play);
        self.generation += 1;
    }

    fn reset_media(&mut self) {
        self.media.pause();
        self.media.clear_source();
        self.media.load();
    }

    fn stop_animation(&mut self) {
        let levels = self.animator.stop(&mut self.scheduler);
        self.view.render_bars(levels);
    }
}
