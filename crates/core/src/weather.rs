//! Weather-history collaborator
//!
//! The engine never fetches anything itself: a [`WeatherProvider`] hands
//! it a complete, gap-interpolated hourly series before the run starts,
//! and fails closed — an empty result is an error, never an empty series
//! silently passed through. Fetches are idempotent by contract: same
//! location, same range, same series.
//!
//! A network-backed provider lives behind the trait in the application
//! layer; this crate ships [`SyntheticWeather`], a deterministic diurnal
//! model used by the demo and by tests.

use crate::error::PmiError;
use crate::series::{TemperatureSample, TemperatureSeries};
use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Geographic location of the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f32,
    pub longitude: f32,
}

impl Location {
    /// Busan station (35.1796 N, 129.0756 E)
    pub fn busan() -> Self {
        Location { latitude: 35.1796, longitude: 129.0756 }
    }

    /// Seoul station (37.5665 N, 126.9780 E)
    pub fn seoul() -> Self {
        Location { latitude: 37.5665, longitude: 126.9780 }
    }

    /// Daegu station (35.8714 N, 128.6014 E)
    pub fn daegu() -> Self {
        Location { latitude: 35.8714, longitude: 128.6014 }
    }
}

/// Closed time range for a history query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Source of historical temperature series
pub trait WeatherProvider {
    /// Fetch an hourly series covering `range` at `location`
    ///
    /// Implementations interpolate interior gaps before returning, so the
    /// engine receives a dense series.
    ///
    /// # Errors
    /// Returns [`PmiError::CollaboratorUnavailable`] when no data exists
    /// for the query; callers must not invoke the engine in that case.
    fn fetch(&self, location: Location, range: TimeRange) -> Result<TemperatureSeries, PmiError>;
}

/// Deterministic synthetic weather with a diurnal cycle
///
/// Hourly temperatures follow a triangular day cycle peaking at 14:00
/// (amplitude `diurnal_amplitude_c` above `base_temp_c`), plus optional
/// seeded jitter. The same seed always produces the same series, keeping
/// demo runs and tests reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticWeather {
    /// Baseline temperature (°C)
    pub base_temp_c: f32,
    /// Peak diurnal elevation above baseline (°C)
    pub diurnal_amplitude_c: f32,
    /// Uniform jitter half-width (°C); 0 disables jitter
    pub jitter_c: f32,
    /// RNG seed for the jitter stream
    pub seed: u64,
}

impl SyntheticWeather {
    /// Constant-temperature generator (no cycle, no jitter)
    pub fn constant(temp_c: f32) -> Self {
        SyntheticWeather {
            base_temp_c: temp_c,
            diurnal_amplitude_c: 0.0,
            jitter_c: 0.0,
            seed: 0,
        }
    }

    /// Diurnal offset at a given hour of day
    ///
    /// Peaks at 14:00, falls off linearly to zero twelve hours away.
    fn diurnal_offset(&self, hour_of_day: f32) -> f32 {
        self.diurnal_amplitude_c * ((12.0 - (hour_of_day - 14.0).abs()) / 12.0)
    }
}

impl WeatherProvider for SyntheticWeather {
    fn fetch(&self, _location: Location, range: TimeRange) -> Result<TemperatureSeries, PmiError> {
        if range.end <= range.start {
            return Err(PmiError::CollaboratorUnavailable(format!(
                "empty weather range: {} to {}",
                range.start, range.end
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut samples = Vec::new();
        let mut t = range.end;
        while t >= range.start {
            let jitter = if self.jitter_c > 0.0 {
                rng.random_range(-self.jitter_c..=self.jitter_c)
            } else {
                0.0
            };
            samples.push(TemperatureSample {
                time: t,
                temp_c: self.base_temp_c + self.diurnal_offset(t.hour() as f32) + jitter,
            });
            t -= Duration::hours(1);
        }

        Ok(TemperatureSeries::new(samples).interpolate_gaps(Duration::hours(1)))
    }
}
