//! Ground-truth physics and noisy fix generation.
//!
//! Vehicles move on a local flat-earth approximation (meters converted to
//! degrees at the current latitude), which is accurate to well under the
//! GPS noise floor over the few kilometers a scenario covers.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use v2v_core::geo::EARTH_RADIUS_M;
use v2v_core::motion::{Fix, BRAKE_DECEL_KMH_PER_S};
use v2v_env::AgentId;

/// Simulation parameters.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed; every random stream in a run derives from it
    pub seed: u64,

    /// Physics tick rate in Hz
    pub tick_rate_hz: u32,

    /// Maximum run duration in seconds
    pub max_duration_secs: f64,

    /// GPS noise standard deviation per axis, meters
    pub fix_noise_std_m: f64,

    /// Interval between position fixes per vehicle, seconds
    pub fix_interval_secs: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate_hz: 10,
            max_duration_secs: 60.0,
            // Good-conditions GPS: sub-meter per-axis error.
            fix_noise_std_m: 0.5,
            fix_interval_secs: 1.0,
        }
    }
}

/// One ground-truth vehicle on an analytic course.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: AgentId,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_deg: f64,

    /// When set, the vehicle decelerates at the hard-braking rate until
    /// stopped.
    pub braking: bool,
}

impl SimVehicle {
    pub fn new(id: AgentId, latitude: f64, longitude: f64, speed_kmh: f64, heading_deg: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
            speed_kmh,
            heading_deg,
            braking: false,
        }
    }

    /// Advances the vehicle by `dt_s` seconds along its heading.
    pub fn advance(&mut self, dt_s: f64) {
        if self.braking {
            self.speed_kmh = (self.speed_kmh - BRAKE_DECEL_KMH_PER_S * dt_s).max(0.0);
        }

        let distance_m = self.speed_kmh / 3.6 * dt_s;
        let theta = self.heading_deg.to_radians();
        let north_m = theta.cos() * distance_m;
        let east_m = theta.sin() * distance_m;

        self.latitude += (north_m / EARTH_RADIUS_M).to_degrees();
        self.longitude +=
            (east_m / (EARTH_RADIUS_M * self.latitude.to_radians().cos())).to_degrees();
    }

    /// Samples a GPS fix of the true position with per-axis Gaussian noise.
    pub fn noisy_fix(&self, timestamp_ms: i64, rng: &mut ChaCha8Rng, std_m: f64) -> Fix {
        let (north_err_m, east_err_m) = if std_m > 0.0 {
            let normal = Normal::new(0.0, std_m).expect("finite noise std");
            (normal.sample(rng), normal.sample(rng))
        } else {
            // Keep the stream position stable across noise settings.
            let _: (f64, f64) = (rng.gen(), rng.gen());
            (0.0, 0.0)
        };

        Fix {
            latitude: self.latitude + (north_err_m / EARTH_RADIUS_M).to_degrees(),
            longitude: self.longitude
                + (east_err_m / (EARTH_RADIUS_M * self.latitude.to_radians().cos())).to_degrees(),
            timestamp_ms,
        }
    }
}
