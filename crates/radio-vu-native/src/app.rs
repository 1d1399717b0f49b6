use std::time::Duration;

use rand::{rngs::SmallRng, SeedableRng};
use radio_vu::meter::{star_field, Star};
use radio_vu::{ManualScheduler, PendingPlay, PlaybackController, PlayerConfig};
use web_time::{Instant, SystemTime};

use crate::painter;
use crate::preview::{PlayTicket, PreviewFallback, PreviewView, Scenario, SimulatedMedia};

type PreviewController =
    PlaybackController<SimulatedMedia, PreviewFallback, PreviewView, ManualScheduler, SmallRng>;

pub struct RadioPreviewApp {
    controller: PreviewController,
    pending: Option<PendingPlay<PlayTicket>>,
    stars: Vec<Star>,
    max_height_px: f32,
    started: Instant,
}

impl RadioPreviewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = PlayerConfig::default();
        let mut rng = SmallRng::from_os_rng();
        let stars = star_field(config.star_count, &mut rng);
        let controller = PlaybackController::new(
            &config,
            SimulatedMedia::new(Duration::from_millis(400)),
            PreviewFallback::default(),
            PreviewView::default(),
            ManualScheduler::default(),
            rng,
        );
        Self {
            controller,
            pending: None,
            stars,
            max_height_px: config.meter.max_height_px,
            started: Instant::now(),
        }
    }

    /// Delivers whatever the simulated media and the frame loop have due.
    fn pump(&mut self) {
        let now = Instant::now();

        if self.pending.as_ref().is_some_and(|p| p.request.is_ready(now)) {
            if let Some(pending) = self.pending.take() {
                self.controller
                    .on_play_settled(pending.generation, pending.request.outcome);
            }
        }

        for event in self.controller.media_mut().poll(now) {
            self.controller.on_media_event(event);
        }

        if self.controller.scheduler_mut().take_pending().is_some() {
            self.controller.on_frame(now);
        }
    }

    fn busy(&self) -> bool {
        self.pending.is_some()
            || self.controller.animator().is_running()
            || self.controller.media().is_playing()
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let glyph = self.controller.view().glyph.symbol();
            if ui.button(glyph).clicked() {
                self.pending = self.controller.toggle(SystemTime::now());
            }
            if ui.button("■").clicked() {
                self.pending = None;
                self.controller.stop();
            }
            ui.label(self.controller.view().status.text());
        });

        ui.collapsing("Simulation", |ui| {
            let media = self.controller.media_mut();
            ui.horizontal(|ui| {
                ui.radio_value(&mut media.scenario, Scenario::Healthy, "Healthy");
                ui.radio_value(&mut media.scenario, Scenario::AutoplayBlocked, "Autoplay blocked");
                ui.radio_value(&mut media.scenario, Scenario::StreamError, "Stream error");
            });
            if ui.button("End stream").clicked() {
                media.end_stream();
            }
            ui.checkbox(&mut self.controller.fallback_mut().broken, "Fallback frame unavailable");
            match &self.controller.fallback().url {
                Some(url) => ui.label(format!("Fallback frame: {url}")),
                None => ui.label("Fallback frame: none"),
            };
            if let Some(source) = self.controller.media().source() {
                ui.label(format!("Source: {source}"));
            }
        });
    }
}

impl eframe::App for RadioPreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump();

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.available_rect_before_wrap();
            let painter = ui.painter();
            painter::draw_stars(
                painter,
                rect,
                &self.stars,
                self.started.elapsed().as_secs_f32(),
            );
            painter::draw_meter(
                painter,
                rect,
                &self.controller.view().bars,
                self.max_height_px,
            );
        });

        if self.busy() {
            ctx.request_repaint();
        } else {
            // keep the stars twinkling
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
