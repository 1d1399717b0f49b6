use std::time::Duration;

use rand::Rng;
use web_time::Instant;

use super::{Band, Transient};
use crate::config::MeterConfig;

/// Random-walk state behind the meter. Holds no audio data.
#[derive(Clone, Debug)]
pub struct AudioSimulation {
    pub bands: Vec<Band>,
    pub transient: Transient,
    last_retarget: Option<Instant>,
    retarget_interval: Duration,
    speed_range: (f32, f32),
    transient_pull: f32,
}

impl AudioSimulation {
    pub fn new(config: &MeterConfig) -> Self {
        Self {
            bands: config.bands.iter().copied().map(Band::from).collect(),
            transient: Transient::from(config.transient),
            last_retarget: None,
            retarget_interval: Duration::from_millis(config.retarget_interval_ms),
            speed_range: config.speed_range,
            transient_pull: config.transient_pull,
        }
    }

    /// Advances the walk by one frame.
    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        let due = self
            .last_retarget
            .is_none_or(|last| now.saturating_duration_since(last) >= self.retarget_interval);
        if due {
            for band in &mut self.bands {
                band.retarget(rng, self.speed_range);
            }
            self.last_retarget = Some(now);
        }

        for band in &mut self.bands {
            band.ease();
        }

        self.transient.tick(rng);
    }

    /// Band level with the transient boost applied. Unknown bands read as silent.
    pub fn band_value(&self, index: usize) -> f32 {
        let Some(band) = self.bands.get(index) else {
            return 0.0;
        };
        let mut value = band.current;
        if self.transient.is_active() {
            let factor = (1.0 - index as f32 * 0.2).max(0.0);
            value += (band.max - value) * factor * self.transient_pull;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn sim() -> AudioSimulation {
        AudioSimulation::new(&MeterConfig::default())
    }

    #[test]
    fn current_stays_within_band_bounds() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut s = sim();
        let start = Instant::now();
        for frame in 0..2_000u64 {
            s.update(start + Duration::from_millis(frame * 16), &mut rng);
            for band in &s.bands {
                assert!(band.current >= band.min && band.current <= band.max, "{band:?}");
            }
        }
    }

    #[test]
    fn first_update_retargets_then_waits_for_interval() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut s = sim();
        let t0 = Instant::now();
        s.update(t0, &mut rng);
        let snapshot: Vec<_> = s.bands.iter().map(|b| (b.target, b.speed)).collect();

        s.update(t0 + Duration::from_millis(50), &mut rng);
        let after: Vec<_> = s.bands.iter().map(|b| (b.target, b.speed)).collect();
        assert_eq!(snapshot, after);

        s.update(t0 + Duration::from_millis(100), &mut rng);
        let redrawn: Vec<_> = s.bands.iter().map(|b| (b.target, b.speed)).collect();
        assert_ne!(snapshot, redrawn);
    }

    #[test]
    fn transient_pulls_toward_max_less_for_higher_bands() {
        let mut s = sim();
        let quiet: Vec<f32> = (0..4).map(|i| s.band_value(i)).collect();
        s.transient.trigger();
        for i in 0..4 {
            let band = s.bands[i];
            let expected = band.current + (band.max - band.current) * (1.0 - i as f32 * 0.2) * 0.5;
            assert!((s.band_value(i) - expected).abs() < 1e-6);
            assert!(s.band_value(i) > quiet[i]);
        }
        assert_eq!(s.band_value(9), 0.0);
    }
}
