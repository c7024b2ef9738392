//! Ordered temperature history
//!
//! The back-calculation engine walks history from the discovery time
//! backwards, so a series is kept sorted newest-to-oldest. Interior gaps
//! are linearly interpolated at the weather boundary before the engine
//! sees the data; any gap that survives is tolerated — missing time is
//! simply not accumulated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One ambient temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    /// Observation timestamp (UTC)
    pub time: DateTime<Utc>,
    /// Ambient temperature (°C)
    pub temp_c: f32,
}

/// Temperature history ordered newest-to-oldest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSeries {
    samples: Vec<TemperatureSample>,
}

impl TemperatureSeries {
    /// Build a series, sorting descending by timestamp
    pub fn new(mut samples: Vec<TemperatureSample>) -> Self {
        samples.sort_by(|a, b| b.time.cmp(&a.time));
        TemperatureSeries { samples }
    }

    /// The discovery reference point: the most recent timestamp
    pub fn discovery_time(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|s| s.time)
    }

    /// Mean ambient temperature over the whole period (°C)
    ///
    /// Used as the deep-soil asymptote by the burial correction. Returns
    /// 0.0 for an empty series; the engine rejects empty series before
    /// this value is ever used.
    pub fn mean_temp_c(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.samples.iter().map(|s| s.temp_c).sum();
        sum / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in newest-to-oldest order
    pub fn samples(&self) -> &[TemperatureSample] {
        &self.samples
    }

    /// Fill interior gaps larger than `interval` by linear interpolation
    ///
    /// Inserted samples are spaced `interval` apart walking backwards from
    /// the newer end of each gap, with temperatures interpolated between
    /// the gap's endpoints. Endpoints are kept verbatim.
    pub fn interpolate_gaps(&self, interval: Duration) -> TemperatureSeries {
        if self.samples.len() < 2 || interval <= Duration::zero() {
            return self.clone();
        }

        let mut filled = Vec::with_capacity(self.samples.len());
        for pair in self.samples.windows(2) {
            let newer = pair[0];
            let older = pair[1];
            filled.push(newer);

            let gap = newer.time - older.time;
            if gap <= interval {
                continue;
            }
            let gap_s = gap.num_seconds() as f32;
            let mut t = newer.time - interval;
            while t > older.time {
                let frac = (t - older.time).num_seconds() as f32 / gap_s;
                filled.push(TemperatureSample {
                    time: t,
                    temp_c: older.temp_c + (newer.temp_c - older.temp_c) * frac,
                });
                t -= interval;
            }
        }
        if let Some(last) = self.samples.last() {
            filled.push(*last);
        }
        TemperatureSeries::new(filled)
    }
}
