//! Simulated VU meter: a random walk over a few synthetic bands, fanned out
//! onto a ring of bars. Nothing here looks at the audio being played.

mod band;
mod layout;
mod simulation;
mod transient;

pub use band::Band;
pub use layout::{band_for_position, bar_rotation_deg, star_field, BarLevel, BarScale, Star};
pub use simulation::AudioSimulation;
pub use transient::Transient;

use rand::Rng;
use web_time::Instant;

use crate::config::MeterConfig;

pub struct Meter {
    simulation: AudioSimulation,
    scale: BarScale,
    /// Band driving each bar, fixed at construction.
    bar_bands: Vec<usize>,
    levels: Vec<BarLevel>,
    noise_scale: f32,
}

impl Meter {
    pub fn new(config: &MeterConfig) -> Self {
        let scale = BarScale::from_config(config);
        let count = config.bar_count;
        let bar_bands = (0..count)
            .map(|i| band_for_position(i as f32 / count as f32, &config.band_edges))
            .collect();
        Self {
            simulation: AudioSimulation::new(config),
            scale,
            bar_bands,
            levels: vec![scale.rest(); count],
            noise_scale: config.noise_scale,
        }
    }

    pub fn simulation_mut(&mut self) -> &mut AudioSimulation {
        &mut self.simulation
    }

    pub fn levels(&self) -> &[BarLevel] {
        &self.levels
    }

    pub fn bar_band(&self, bar: usize) -> Option<usize> {
        self.bar_bands.get(bar).copied()
    }

    /// Advances the simulation and recomputes every bar.
    pub fn step<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> &[BarLevel] {
        self.simulation.update(now, rng);
        for (level, &band) in self.levels.iter_mut().zip(&self.bar_bands) {
            let value = self.simulation.band_value(band);
            let spread = rng.random::<f32>() * self.noise_scale * (1.0 + band as f32 * 0.5);
            let noisy = value + rng.random_range(-1.0f32..=1.0) * spread;
            *level = self.scale.level(self.scale.clamp_value(noisy));
        }
        &self.levels
    }

    /// Puts every bar back at rest.
    pub fn reset(&mut self) -> &[BarLevel] {
        self.levels.fill(self.scale.rest());
        &self.levels
    }
}
