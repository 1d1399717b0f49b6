use rand::Rng;

use crate::config::MeterConfig;

/// What one bar displays for a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarLevel {
    pub height_px: f32,
    pub opacity: f32,
}

/// Maps a normalized value to bar geometry.
#[derive(Clone, Copy, Debug)]
pub struct BarScale {
    pub min_height_px: f32,
    pub max_height_px: f32,
    pub min_value: f32,
    pub rest_opacity: f32,
}

impl BarScale {
    pub fn from_config(config: &MeterConfig) -> Self {
        Self {
            min_height_px: config.min_height_px,
            max_height_px: config.max_height_px,
            min_value: config.min_value,
            rest_opacity: config.rest_opacity,
        }
    }

    pub fn clamp_value(&self, value: f32) -> f32 {
        value.clamp(self.min_value, 1.0)
    }

    pub fn level(&self, value: f32) -> BarLevel {
        BarLevel {
            height_px: self.min_height_px + (self.max_height_px - self.min_height_px) * value,
            opacity: self.rest_opacity + (1.0 - self.rest_opacity) * value,
        }
    }

    pub fn rest(&self) -> BarLevel {
        BarLevel {
            height_px: self.min_height_px,
            opacity: self.rest_opacity,
        }
    }
}

/// Band index for a bar at `position` in `[0, 1)`, given ascending band edges.
pub fn band_for_position(position: f32, edges: &[f32]) -> usize {
    edges
        .iter()
        .position(|&edge| position < edge)
        .unwrap_or(edges.len())
}

/// Clockwise rotation of bar `index` out of `count`, in degrees.
pub fn bar_rotation_deg(index: usize, count: usize) -> f32 {
    index as f32 * (360.0 / count.max(1) as f32)
}

/// Decorative star placement. Percentages are relative to the star container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub left_pct: f32,
    pub top_pct: f32,
    pub size_px: f32,
    pub delay_s: f32,
}

pub fn star_field<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Star> {
    (0..count)
        .map(|_| Star {
            left_pct: rng.random_range(0.0..100.0),
            top_pct: rng.random_range(0.0..100.0),
            size_px: rng.random_range(1.0..5.0),
            delay_s: rng.random_range(0.0..5.0),
        })
        .collect()
}
