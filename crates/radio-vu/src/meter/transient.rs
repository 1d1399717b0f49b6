use rand::Rng;

use crate::config::TransientConfig;

/// Short impulse shared by every band while `current > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transient {
    pub chance: f64,
    pub duration: u32,
    pub current: u32,
}

impl From<TransientConfig> for Transient {
    fn from(c: TransientConfig) -> Self {
        Self {
            chance: c.chance,
            duration: c.duration,
            current: 0,
        }
    }
}

impl Transient {
    pub fn is_active(&self) -> bool {
        self.current > 0
    }

    /// Counts an active impulse down, or rolls for a new one.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.current > 0 {
            self.current -= 1;
        } else if rng.random_bool(self.chance) {
            self.trigger();
        }
    }

    pub fn trigger(&mut self) {
        self.current = self.duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn trigger_counts_down_to_zero() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut t = Transient::from(TransientConfig::default());
        t.trigger();
        assert_eq!(t.current, 3);
        for expected in [2, 1, 0] {
            t.tick(&mut rng);
            assert_eq!(t.current, expected);
        }
        assert!(!t.is_active());
    }

    #[test]
    fn never_fires_with_zero_chance() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut t = Transient::from(TransientConfig {
            chance: 0.0,
            duration: 3,
        });
        for _ in 0..1000 {
            t.tick(&mut rng);
            assert_eq!(t.current, 0);
        }
    }

    #[test]
    fn certain_chance_fires_on_first_idle_tick() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut t = Transient::from(TransientConfig {
            chance: 1.0,
            duration: 3,
        });
        t.tick(&mut rng);
        assert_eq!(t.current, 3);
    }
}
