//! Separation rules and thresholds for conflict detection and resolution.

use crate::error::ConfigError;
use crate::spatial::{FT, NM};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highest ring number the zone classifier supports.
pub const MAX_ZONE_RINGS: u8 = 10;

/// Configuration for the separation-assurance pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationRules {
    /// Horizontal protection radius in meters
    pub rpz_m: f64,
    /// Vertical half-height of the protected zone in meters
    pub hpz_m: f64,
    /// Lookahead window for conflict prediction in seconds
    pub lookahead_s: f64,
    /// Multiplier on `rpz_m` used for the hard horizontal radius when
    /// deciding whether guidance may be released
    pub resolution_margin: f64,
    /// Tracks closer than this (degrees) while inside the hard radius
    /// count as a bouncing conflict
    pub bouncing_track_deg: f64,
    /// Simulation-time window over which experiment statistics are kept
    pub experiment_window: ExperimentWindow,
    /// Perturbation of the perceived geometry
    pub noise: SurveillanceNoise,
    /// Naming of the concentric zone areas
    pub zones: ZoneLayout,
}

impl Default for SeparationRules {
    fn default() -> Self {
        Self {
            rpz_m: 5.0 * NM,
            hpz_m: 1000.0 * FT,
            lookahead_s: 300.0,
            resolution_margin: 1.05,
            bouncing_track_deg: 30.0,
            experiment_window: ExperimentWindow::default(),
            noise: SurveillanceNoise::default(),
            zones: ZoneLayout::default(),
        }
    }
}

/// Open interval of simulation time, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExperimentWindow {
    pub start_s: f64,
    pub end_s: f64,
}

impl Default for ExperimentWindow {
    fn default() -> Self {
        Self {
            start_s: 2100.0,
            end_s: 5700.0,
        }
    }
}

impl ExperimentWindow {
    /// True when `simt` lies strictly inside the window.
    pub fn contains(&self, simt: f64) -> bool {
        simt > self.start_s && simt < self.end_s
    }
}

/// Gaussian noise on perceived bearing, distance and altitude.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveillanceNoise {
    pub enabled: bool,
    /// Standard deviation of the bearing error in degrees
    pub bearing_std_deg: f64,
    /// Standard deviation of the distance error in meters
    pub distance_std_m: f64,
    /// Standard deviation of the altitude error in meters
    pub altitude_std_m: f64,
    /// Fixed seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,
}

/// Names of the nested areas the zone classifier looks up.
///
/// Rings are `{ring_prefix}1` (outermost) up to `{ring_prefix}{rings}`;
/// the core area overrides every ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneLayout {
    pub ring_prefix: String,
    pub rings: u8,
    pub core_name: String,
}

impl Default for ZoneLayout {
    fn default() -> Self {
        Self {
            ring_prefix: "ZONE".to_string(),
            rings: MAX_ZONE_RINGS,
            core_name: "INNERCIRCLE".to_string(),
        }
    }
}

impl ZoneLayout {
    /// Area name of ring `number`.
    pub fn ring_name(&self, number: u8) -> String {
        format!("{}{}", self.ring_prefix, number)
    }
}

impl SeparationRules {
    /// Hard horizontal radius used by the resume decision.
    pub fn resolution_radius_m(&self) -> f64 {
        self.rpz_m * self.resolution_margin
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("rpz_m", self.rpz_m)?;
        positive("hpz_m", self.hpz_m)?;
        positive("lookahead_s", self.lookahead_s)?;
        positive("bouncing_track_deg", self.bouncing_track_deg)?;

        if !self.resolution_margin.is_finite() || self.resolution_margin < 1.0 {
            return Err(ConfigError::MarginTooSmall(self.resolution_margin));
        }

        non_negative("bearing_std_deg", self.noise.bearing_std_deg)?;
        non_negative("distance_std_m", self.noise.distance_std_m)?;
        non_negative("altitude_std_m", self.noise.altitude_std_m)?;

        let window = self.experiment_window;
        if window.start_s > window.end_s {
            return Err(ConfigError::InvertedWindow {
                start_s: window.start_s,
                end_s: window.end_s,
            });
        }

        if self.zones.rings == 0 || self.zones.rings > MAX_ZONE_RINGS {
            return Err(ConfigError::RingCount {
                got: self.zones.rings,
                max: MAX_ZONE_RINGS,
            });
        }
        if self.zones.ring_prefix.is_empty() {
            return Err(ConfigError::EmptyName("ring_prefix"));
        }
        if self.zones.core_name.is_empty() {
            return Err(ConfigError::EmptyName("core_name"));
        }

        Ok(())
    }

    /// Parse rules from JSON; omitted fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Read and parse a JSON rules file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeDeviation { field, value })
    }
}
