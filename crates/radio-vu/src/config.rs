use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_STREAM_URL: &str = "https://cbdj.homelinux.org:8443/cbdj?type=http&nocache=14";

/// Starting state of one synthetic band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    pub min: f32,
    pub max: f32,
    pub current: f32,
    pub target: f32,
    pub speed: f32,
}

impl BandConfig {
    pub const fn new(min: f32, max: f32, current: f32, target: f32, speed: f32) -> Self {
        Self {
            min,
            max,
            current,
            target,
            speed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransientConfig {
    /// Per-frame probability of firing while idle.
    pub chance: f64,
    /// Frames an impulse lasts.
    pub duration: u32,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            chance: 0.03,
            duration: 3,
        }
    }
}

/// Tuning of the simulated meter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub bar_count: usize,
    pub bands: Vec<BandConfig>,
    /// Normalized bar positions where the next band starts; one fewer than `bands`.
    pub band_edges: Vec<f32>,
    pub transient: TransientConfig,
    pub retarget_interval_ms: u64,
    pub speed_range: (f32, f32),
    pub min_height_px: f32,
    pub max_height_px: f32,
    pub min_value: f32,
    pub rest_opacity: f32,
    pub noise_scale: f32,
    pub transient_pull: f32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            bar_count: 36,
            bands: vec![
                BandConfig::new(0.4, 0.9, 0.5, 0.7, 0.02),
                BandConfig::new(0.3, 0.8, 0.4, 0.6, 0.03),
                BandConfig::new(0.2, 0.7, 0.3, 0.5, 0.04),
                BandConfig::new(0.1, 0.6, 0.2, 0.4, 0.05),
            ],
            band_edges: vec![0.3, 0.5, 0.7],
            transient: TransientConfig::default(),
            retarget_interval_ms: 100,
            speed_range: (0.01, 0.05),
            min_height_px: 80.0,
            max_height_px: 160.0,
            min_value: 0.1,
            rest_opacity: 0.2,
            noise_scale: 0.1,
            transient_pull: 0.5,
        }
    }
}

impl MeterConfig {
    /// # Errors
    /// Returns [`Error::Config`] naming the first inconsistent field.
    pub fn validate(&self) -> Result<()> {
        if self.bar_count == 0 {
            return Err(Error::Config("bar_count must be positive".into()));
        }
        if self.bands.is_empty() {
            return Err(Error::Config("at least one band is required".into()));
        }
        if self.band_edges.len() + 1 != self.bands.len() {
            return Err(Error::Config(format!(
                "{} bands need {} band_edges, got {}",
                self.bands.len(),
                self.bands.len() - 1,
                self.band_edges.len()
            )));
        }
        let mut previous = 0.0;
        for &edge in &self.band_edges {
            if edge.is_nan() || edge <= previous || edge >= 1.0 {
                return Err(Error::Config(format!(
                    "band_edges must increase strictly inside (0, 1), found {edge}"
                )));
            }
            previous = edge;
        }
        for (i, band) in self.bands.iter().enumerate() {
            let in_range = |v: f32| (band.min..=band.max).contains(&v);
            if !(0.0..=1.0).contains(&band.min) || !(0.0..=1.0).contains(&band.max) || band.min > band.max {
                return Err(Error::Config(format!("band {i}: need 0 <= min <= max <= 1")));
            }
            if !in_range(band.current) || !in_range(band.target) {
                return Err(Error::Config(format!(
                    "band {i}: current and target must lie in [{}, {}]",
                    band.min, band.max
                )));
            }
        }
        let (lo, hi) = self.speed_range;
        if lo.is_nan() || hi.is_nan() || lo <= 0.0 || lo > hi || hi > 1.0 {
            return Err(Error::Config(format!(
                "speed_range must satisfy 0 < lo <= hi <= 1, got ({lo}, {hi})"
            )));
        }
        if self.min_height_px.is_nan() || self.min_height_px < 0.0 || !self.max_height_px.is_finite() {
            return Err(Error::Config("bar heights must be finite and non-negative".into()));
        }
        if self.min_height_px > self.max_height_px {
            return Err(Error::Config("min_height_px exceeds max_height_px".into()));
        }
        unit("min_value", self.min_value)?;
        unit("rest_opacity", self.rest_opacity)?;
        unit("transient_pull", self.transient_pull)?;
        if !self.noise_scale.is_finite() || self.noise_scale < 0.0 {
            return Err(Error::Config(format!(
                "noise_scale must be finite and non-negative, got {}",
                self.noise_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.transient.chance) {
            return Err(Error::Config("transient.chance must be a probability".into()));
        }
        Ok(())
    }
}

fn unit(field: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!("{field} must lie in [0, 1], got {value}")))
    }
}

/// Ids of the page elements the widget binds to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub audio: String,
    pub play_button: String,
    pub stop_button: String,
    pub status: String,
    pub meter: String,
    pub stars: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            audio: "audioPlayer".into(),
            play_button: "playBtn".into(),
            stop_button: "stopBtn".into(),
            status: "statusMessage".into(),
            meter: "vu-meter".into(),
            stars: "stars".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub stream_url: String,
    pub elements: ElementIds,
    pub star_count: usize,
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    pub meter: MeterConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            stream_url: DEFAULT_STREAM_URL.into(),
            elements: ElementIds::default(),
            star_count: 50,
            log_level: "info".into(),
            meter: MeterConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Parses a (possibly partial) JSON document over the defaults.
    ///
    /// # Errors
    /// Fails on malformed JSON or when [`PlayerConfig::validate`] rejects the result.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`Error::Config`] for an empty stream URL, an unknown log level
    /// or an inconsistent [`MeterConfig`].
    pub fn validate(&self) -> Result<()> {
        if self.stream_url.trim().is_empty() {
            return Err(Error::Config("stream_url is empty".into()));
        }
        self.level_filter()?;
        self.meter.validate()
    }

    /// # Errors
    /// Returns [`Error::Config`] when `log_level` is not a `log` level name.
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| Error::Config(format!("unknown log_level {:?}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PlayerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.meter.bar_count, 36);
        assert_eq!(config.star_count, 50);
        assert_eq!(config.level_filter().unwrap(), log::LevelFilter::Info);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PlayerConfig::from_json(
            r#"{ "stream_url": "https://example.org/live", "meter": { "bar_count": 12 } }"#,
        )
        .unwrap();
        assert_eq!(config.stream_url, "https://example.org/live");
        assert_eq!(config.meter.bar_count, 12);
        assert_eq!(config.meter.bands.len(), 4);
        assert_eq!(config.elements.play_button, "playBtn");
    }

    #[test]
    fn edges_must_match_bands() {
        let mut meter = MeterConfig::default();
        meter.band_edges.pop();
        assert!(matches!(meter.validate(), Err(Error::Config(_))));

        let mut meter = MeterConfig::default();
        meter.band_edges = vec![0.5, 0.3, 0.7];
        assert!(meter.validate().is_err());
    }

    #[test]
    fn band_start_must_sit_inside_bounds() {
        let mut meter = MeterConfig::default();
        meter.bands[2].current = 0.95;
        assert!(meter.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level_and_bad_json() {
        assert!(matches!(
            PlayerConfig::from_json(r#"{ "log_level": "loud" }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PlayerConfig::from_json("{ not json"),
            Err(Error::ConfigJson(_))
        ));
    }

    #[test]
    fn out_of_range_floats_are_rejected() {
        for json in [
            r#"{ "meter": { "min_value": 1.5 } }"#,
            r#"{ "meter": { "min_value": -0.1 } }"#,
            r#"{ "meter": { "rest_opacity": 1.5 } }"#,
            r#"{ "meter": { "transient_pull": 2.0 } }"#,
            r#"{ "meter": { "noise_scale": -1.0 } }"#,
            r#"{ "meter": { "speed_range": [0.01, 1e40] } }"#,
            r#"{ "meter": { "speed_range": [0.01, 1.5] } }"#,
            r#"{ "meter": { "min_height_px": -10.0 } }"#,
            r#"{ "meter": { "max_height_px": 1e40 } }"#,
        ] {
            assert!(PlayerConfig::from_json(json).is_err(), "{json} was accepted");
        }
    }

    #[test]
    fn nan_fields_are_rejected() {
        let mut meter = MeterConfig::default();
        meter.noise_scale = f32::NAN;
        assert!(meter.validate().is_err());

        let mut meter = MeterConfig::default();
        meter.speed_range = (0.01, f32::NAN);
        assert!(meter.validate().is_err());

        let mut meter = MeterConfig::default();
        meter.band_edges[1] = f32::NAN;
        assert!(meter.validate().is_err());

        let mut meter = MeterConfig::default();
        meter.min_height_px = f32::INFINITY;
        assert!(meter.validate().is_err());
    }

    #[test]
    fn accepted_config_keeps_bars_in_range() {
        use crate::meter::Meter;
        use rand::{rngs::SmallRng, SeedableRng};
        use web_time::Instant;

        let config = PlayerConfig::from_json(
            r#"{ "meter": { "min_value": 1.0, "rest_opacity": 1.0, "speed_range": [0.5, 1.0] } }"#,
        )
        .unwrap();
        let mut meter = Meter::new(&config.meter);
        let mut rng = SmallRng::seed_from_u64(5);
        for level in meter.step(Instant::now(), &mut rng) {
            assert_eq!(level.height_px, 160.0);
            assert!((0.0..=1.0).contains(&level.opacity));
        }
        assert!(meter.reset().iter().all(|l| l.opacity == 1.0));
    }
}
