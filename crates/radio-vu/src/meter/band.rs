use rand::Rng;

use crate::config::BandConfig;

/// Synthetic amplitude channel driving a slice of the meter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub min: f32,
    pub max: f32,
    pub current: f32,
    pub target: f32,
    pub speed: f32,
}

impl From<BandConfig> for Band {
    fn from(c: BandConfig) -> Self {
        Self {
            min: c.min,
            max: c.max,
            current: c.current,
            target: c.target,
            speed: c.speed,
        }
    }
}

impl Band {
    /// Draws a fresh target in `[min, max]` and a fresh speed in `speed_range`.
    pub fn retarget<R: Rng + ?Sized>(&mut self, rng: &mut R, speed_range: (f32, f32)) {
        self.target = rng.random_range(self.min..=self.max);
        self.speed = rng.random_range(speed_range.0..=speed_range.1);
    }

    /// Moves `current` toward `target` by at most `speed`, never past it.
    pub fn ease(&mut self) {
        if self.current < self.target {
            self.current = (self.current + self.speed).min(self.target);
        } else {
            self.current = (self.current - self.speed).max(self.target);
        }
    }
}
