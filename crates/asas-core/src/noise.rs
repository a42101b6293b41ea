//! Gaussian surveillance errors applied to the perceived geometry.

use crate::rules::SurveillanceNoise;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Sampler for bearing, distance and altitude errors.
///
/// A disabled model never touches its generator, so perceived and true
/// geometry coincide exactly.
pub struct NoiseModel {
    rng: StdRng,
    bearing: Option<Normal<f64>>,
    distance: Option<Normal<f64>>,
    altitude: Option<Normal<f64>>,
}

impl NoiseModel {
    pub fn new(config: &SurveillanceNoise) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let gate = |std: f64| {
            if config.enabled && std > 0.0 {
                Normal::new(0.0, std).ok()
            } else {
                None
            }
        };
        Self {
            rng,
            bearing: gate(config.bearing_std_deg),
            distance: gate(config.distance_std_m),
            altitude: gate(config.altitude_std_m),
        }
    }

    /// A model that adds no error.
    pub fn disabled() -> Self {
        Self::new(&SurveillanceNoise::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.bearing.is_some() || self.distance.is_some() || self.altitude.is_some()
    }

    /// Bearing error in degrees.
    pub fn bearing_error(&mut self) -> f64 {
        sample(&mut self.rng, self.bearing.as_ref())
    }

    /// Distance error in meters.
    pub fn distance_error(&mut self) -> f64 {
        sample(&mut self.rng, self.distance.as_ref())
    }

    /// Altitude error in meters.
    pub fn altitude_error(&mut self) -> f64 {
        sample(&mut self.rng, self.altitude.as_ref())
    }
}

fn sample(rng: &mut StdRng, dist: Option<&Normal<f64>>) -> f64 {
    dist.map(|d| d.sample(rng)).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_model_is_exact() {
        let mut noise = NoiseModel::disabled();
        assert!(!noise.is_enabled());
        assert_eq!(noise.bearing_error(), 0.0);
        assert_eq!(noise.distance_error(), 0.0);
        assert_eq!(noise.altitude_error(), 0.0);
    }

    #[test]
    fn seeded_models_repeat() {
        let config = SurveillanceNoise {
            enabled: true,
            bearing_std_deg: 1.0,
            distance_std_m: 50.0,
            altitude_std_m: 15.0,
            seed: Some(7),
        };
        let mut a = NoiseModel::new(&config);
        let mut b = NoiseModel::new(&config);
        for _ in 0..5 {
            assert_eq!(a.distance_error(), b.distance_error());
        }
        assert!(a.is_enabled());
    }

    #[test]
    fn zero_deviation_channel_stays_silent() {
        let config = SurveillanceNoise {
            enabled: true,
            bearing_std_deg: 0.0,
            distance_std_m: 10.0,
            altitude_std_m: 0.0,
            seed: Some(1),
        };
        let mut noise = NoiseModel::new(&config);
        assert_eq!(noise.bearing_error(), 0.0);
        assert_eq!(noise.altitude_error(), 0.0);
    }
}
