//! Reverse-time ADH back-calculation
//!
//! The engine walks the temperature history from discovery backwards,
//! accumulating degree-hours above the species' lower developmental
//! threshold, and stops at the first sample where the accumulator meets
//! the target for the observed stage. That sample's timestamp is the
//! estimated oviposition/colonization time. Walking backwards means the
//! first crossing is the most recent time the observed development could
//! have started, which is exactly the post-mortem interval bound wanted.
//!
//! The engine is a pure function: no I/O, no shared state, identical
//! inputs give an identical trace and estimate.

use crate::corrections::{Boundary, CorrectionContext};
use crate::error::PmiError;
use crate::series::TemperatureSeries;
use crate::species::{LifeStage, SpeciesProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Audit record for one processed sample
///
/// One record is appended per sample regardless of whether it
/// contributed heat, so the full history is auditable. The trace is the
/// compliance artifact and is never summarized before the report stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Sample timestamp
    pub time: DateTime<Utc>,
    /// Raw ambient reading (°C)
    pub base_temp_c: f32,
    /// Fully corrected effective temperature (°C)
    pub effective_temp_c: f32,
    /// Self-heating component of the effective temperature (°C)
    pub self_heating_c: f32,
    /// Instantaneous ADH contribution of this sample
    pub contribution_adh: f32,
    /// Accumulator value after this sample
    pub accumulated_adh: f32,
    /// Target ADH for the observed stage
    pub target_adh: f32,
    /// Growth suspended because the effective temperature reached the UDT
    pub overheated: bool,
    /// The transient event covered this sample
    pub event_active: bool,
}

/// Result of one back-calculation run
///
/// Created fresh per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmiEstimate {
    /// Estimated oviposition/colonization timestamp
    pub onset_time: DateTime<Utc>,
    /// Hours between onset and discovery
    pub hours_before_discovery: f32,
    /// Total ADH accumulated when the target was met
    pub total_adh: f32,
    /// Target ADH for the observed stage
    pub target_adh: f32,
    /// Full per-sample audit trail, newest to oldest
    pub trace: Vec<TraceRecord>,
}

/// Whether growth is suspended at `temp` given the upper threshold
fn udt_suspends(temp: f32, udt: f32, boundary: Boundary) -> bool {
    match boundary {
        Boundary::Inclusive => temp >= udt,
        Boundary::Exclusive => temp > udt,
    }
}

/// Whether `temp` is warm enough for growth given the lower threshold
fn ldt_permits(temp: f32, ldt: f32, boundary: Boundary) -> bool {
    match boundary {
        // Inclusive-suspends: the threshold itself still suspends growth
        Boundary::Inclusive => temp >= ldt,
        Boundary::Exclusive => temp > ldt,
    }
}

/// Back-calculate the onset time for an observed development stage
///
/// Iterates `series` newest-to-oldest, corrects each sample through
/// `ctx`, accumulates `(effective - LDT) * multiplier` for samples
/// strictly between the developmental thresholds, and stops at the first
/// sample where the accumulator meets the stage target. Overheat
/// dominates: a sample at or above the UDT contributes nothing even
/// though it also exceeds the LDT.
///
/// # Errors
/// - [`PmiError::CollaboratorUnavailable`] if the series is empty
/// - [`PmiError::UnknownReference`] if the species lacks data for `stage`
/// - [`PmiError::InvalidInput`] if the growth-rate multiplier is not
///   strictly positive
/// - [`PmiError::InsufficientHistory`] if the series is exhausted before
///   the accumulator reaches the target; the estimate is never
///   extrapolated beyond the supplied window
pub fn back_calculate(
    profile: &SpeciesProfile,
    stage: LifeStage,
    series: &TemperatureSeries,
    ctx: &CorrectionContext,
) -> Result<PmiEstimate, PmiError> {
    let Some(discovery) = series.discovery_time() else {
        return Err(PmiError::CollaboratorUnavailable(
            "temperature series is empty".to_string(),
        ));
    };
    if ctx.growth_rate_multiplier <= 0.0 {
        return Err(PmiError::InvalidInput(format!(
            "growth-rate multiplier must be positive, got {}",
            ctx.growth_rate_multiplier
        )));
    }
    let target_adh = profile.target_adh(stage)?;

    info!(
        species = %profile.id,
        stage = stage.name(),
        target_adh,
        samples = series.len(),
        "starting ADH back-calculation"
    );

    let mean_ambient = series.mean_temp_c();
    let mut accumulated = 0.0_f32;
    let mut trace = Vec::with_capacity(series.len());

    for sample in series.samples() {
        // Ages are measured against the fixed discovery time so the event
        // window covers the same samples on every run.
        let age_h = (discovery - sample.time).num_seconds() as f32 / 3600.0;

        let corrected = ctx.effective_temperature(
            sample.temp_c,
            mean_ambient,
            age_h,
            profile,
            target_adh,
            accumulated,
        );

        let overheated = udt_suspends(corrected.effective_temp_c, profile.udt_c, ctx.udt_boundary);
        let contribution = if overheated {
            0.0
        } else if ldt_permits(corrected.effective_temp_c, profile.ldt_c, ctx.ldt_boundary) {
            (corrected.effective_temp_c - profile.ldt_c) * ctx.growth_rate_multiplier
        } else {
            0.0
        };
        accumulated += contribution;

        trace.push(TraceRecord {
            time: sample.time,
            base_temp_c: sample.temp_c,
            effective_temp_c: corrected.effective_temp_c,
            self_heating_c: corrected.self_heating_c,
            contribution_adh: contribution,
            accumulated_adh: accumulated,
            target_adh,
            overheated,
            event_active: corrected.event_active,
        });

        if accumulated >= target_adh {
            let hours = (discovery - sample.time).num_seconds() as f32 / 3600.0;
            debug!(
                onset = %sample.time,
                hours_before_discovery = hours,
                total_adh = accumulated,
                "target reached"
            );
            return Ok(PmiEstimate {
                onset_time: sample.time,
                hours_before_discovery: hours,
                total_adh: accumulated,
                target_adh,
                trace,
            });
        }
    }

    warn!(
        accumulated_adh = accumulated,
        target_adh, "series exhausted before reaching target"
    );
    Err(PmiError::InsufficientHistory {
        accumulated_adh: accumulated,
        target_adh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrections::{SelfHeating, SelfHeatingPolicy, ThermalEvent};
    use crate::series::TemperatureSample;
    use crate::species::SpeciesTable;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn constant_series(hours: usize, temp_c: f32) -> TemperatureSeries {
        let discovery = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let samples = (0..hours)
            .map(|i| TemperatureSample {
                time: discovery - Duration::hours(i as i64),
                temp_c,
            })
            .collect();
        TemperatureSeries::new(samples)
    }

    fn lucilia() -> SpeciesProfile {
        SpeciesTable::builtin().get("lucilia_sericata").unwrap().clone()
    }

    /// Minimal profile with round thresholds: LDT 9, UDT 35
    fn reference_profile(target: f32) -> SpeciesProfile {
        SpeciesProfile::new(
            "test_species",
            "Test species",
            9.0,
            35.0,
            vec![(LifeStage::Instar3Wandering, target)],
        )
        .unwrap()
    }

    #[test]
    fn test_constant_series_reaches_target_at_expected_sample() {
        // 100 hourly samples at 20 °C, LDT 9 → 11 ADH/sample; target 220
        // is met at the 20th sample (index 19), 19 hours before discovery.
        let profile = reference_profile(220.0);
        let series = constant_series(100, 20.0);
        let ctx = CorrectionContext::default();

        let est =
            back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx).unwrap();

        assert_relative_eq!(est.hours_before_discovery, 19.0);
        assert_eq!(
            est.onset_time,
            series.discovery_time().unwrap() - Duration::hours(19)
        );
        assert_relative_eq!(est.total_adh, 220.0);
        assert_eq!(est.trace.len(), 20);
        for record in &est.trace {
            assert_relative_eq!(record.contribution_adh, 11.0);
        }
    }

    #[test]
    fn test_unreachable_target_is_insufficient_history() {
        // 100 samples × 11 ADH = 1100 achievable; 2000 is out of reach
        let profile = reference_profile(2000.0);
        let series = constant_series(100, 20.0);
        let ctx = CorrectionContext::default();

        match back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx) {
            Err(PmiError::InsufficientHistory {
                accumulated_adh,
                target_adh,
            }) => {
                assert_relative_eq!(accumulated_adh, 1100.0, epsilon = 1e-2);
                assert_relative_eq!(target_adh, 2000.0);
            }
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }
    }

    #[test]
    fn test_target_zero_onsets_at_discovery() {
        let profile = reference_profile(0.0);
        let series = constant_series(10, 20.0);
        let ctx = CorrectionContext::default();

        let est =
            back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx).unwrap();
        assert_eq!(est.onset_time, series.discovery_time().unwrap());
        assert_relative_eq!(est.hours_before_discovery, 0.0);
    }

    #[test]
    fn test_overheat_dominates_ldt() {
        // 40 °C with UDT 35: zero contribution, flagged, despite LDT 9
        let profile = reference_profile(100.0);
        let series = constant_series(1, 40.0);
        let ctx = CorrectionContext::default();

        let err =
            back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx).unwrap_err();
        match err {
            PmiError::InsufficientHistory { accumulated_adh, .. } => {
                assert_relative_eq!(accumulated_adh, 0.0);
            }
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }
    }

    #[test]
    fn test_overheated_samples_are_traced() {
        // Mixed series: hot samples contribute nothing but are recorded
        let discovery = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let series = TemperatureSeries::new(vec![
            TemperatureSample { time: discovery, temp_c: 40.0 },
            TemperatureSample {
                time: discovery - Duration::hours(1),
                temp_c: 20.0,
            },
        ]);
        let profile = reference_profile(11.0);
        let ctx = CorrectionContext::default();

        let est =
            back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx).unwrap();
        assert_eq!(est.trace.len(), 2);
        assert!(est.trace[0].overheated);
        assert_relative_eq!(est.trace[0].contribution_adh, 0.0);
        assert!(!est.trace[1].overheated);
        assert_relative_eq!(est.trace[1].contribution_adh, 11.0);
    }

    #[test]
    fn test_boundary_contributions_are_zero() {
        // Exactly LDT and exactly UDT both contribute nothing by default
        let profile = reference_profile(10.0);
        let ctx = CorrectionContext::default();

        for temp in [9.0, 35.0] {
            let series = constant_series(3, temp);
            let err = back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx)
                .unwrap_err();
            assert!(
                matches!(err, PmiError::InsufficientHistory { accumulated_adh, .. }
                    if accumulated_adh == 0.0),
                "temp {temp} should contribute nothing"
            );
        }
    }

    #[test]
    fn test_configurable_ldt_boundary() {
        // Inclusive-permits LDT: exactly 9 °C still contributes zero
        // heat (9 - 9 = 0) but samples just above both count; verify the
        // boundary switch changes classification, not arithmetic.
        let profile = reference_profile(10.0);
        let series = constant_series(3, 9.0);
        let ctx = CorrectionContext {
            ldt_boundary: Boundary::Inclusive,
            ..CorrectionContext::default()
        };

        let err = back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx)
            .unwrap_err();
        // Permitted but (9-9)*1 = 0: still no accumulation
        assert!(matches!(err, PmiError::InsufficientHistory { accumulated_adh, .. }
            if accumulated_adh == 0.0));
    }

    #[test]
    fn test_growth_multiplier_scales_contribution() {
        let profile = reference_profile(220.0);
        let series = constant_series(100, 20.0);
        let ctx = CorrectionContext {
            growth_rate_multiplier: 2.0,
            ..CorrectionContext::default()
        };

        let est =
            back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx).unwrap();
        // 22 ADH per sample → target met at index 9
        assert_relative_eq!(est.hours_before_discovery, 9.0);
        assert_relative_eq!(est.trace[0].contribution_adh, 22.0);
    }

    #[test]
    fn test_non_positive_multiplier_rejected() {
        let profile = reference_profile(220.0);
        let series = constant_series(10, 20.0);
        for mult in [0.0, -1.0] {
            let ctx = CorrectionContext {
                growth_rate_multiplier: mult,
                ..CorrectionContext::default()
            };
            let err = back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx)
                .unwrap_err();
            assert!(matches!(err, PmiError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_empty_series_rejected() {
        let profile = reference_profile(220.0);
        let series = TemperatureSeries::new(vec![]);
        let ctx = CorrectionContext::default();

        let err = back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx)
            .unwrap_err();
        assert!(matches!(err, PmiError::CollaboratorUnavailable(_)));
    }

    #[test]
    fn test_accumulation_is_monotonic() {
        let profile = lucilia();
        let discovery = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        // Mix of cold, warm, and overheated samples
        let temps = [12.0, 3.0, 25.0, 40.0, 18.0, 9.0, 30.0, 22.0];
        let series = TemperatureSeries::new(
            temps
                .iter()
                .enumerate()
                .map(|(i, &t)| TemperatureSample {
                    time: discovery - Duration::hours(i as i64),
                    temp_c: t,
                })
                .collect(),
        );
        let ctx = CorrectionContext::default();

        let err = back_calculate(&profile, LifeStage::Pupa, &series, &ctx).unwrap_err();
        assert!(matches!(err, PmiError::InsufficientHistory { .. }));

        // Re-run against a reachable target to inspect the trace
        let est = back_calculate(&profile, LifeStage::Egg, &series, &ctx);
        if let Ok(est) = est {
            let mut last = 0.0;
            for record in &est.trace {
                assert!(record.accumulated_adh >= last, "accumulator decreased");
                last = record.accumulated_adh;
            }
        }
    }

    #[test]
    fn test_engine_is_idempotent() {
        let profile = lucilia();
        let series = constant_series(300, 24.0);
        let ctx = CorrectionContext {
            self_heating: SelfHeating {
                max_delta_c: 5.0,
                policy: SelfHeatingPolicy::StageCurve,
            },
            solar_delta_c: -2.0,
            ..CorrectionContext::default()
        };

        let a = back_calculate(&profile, LifeStage::Instar3Feeding, &series, &ctx).unwrap();
        let b = back_calculate(&profile, LifeStage::Instar3Feeding, &series, &ctx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_event_window_against_discovery_time() {
        // Event ended 5 h ago, lasted 3 h: +10 °C over ages [5, 8].
        let profile = reference_profile(1_000_000.0);
        let series = constant_series(12, 20.0);
        let ctx = CorrectionContext {
            event: Some(ThermalEvent {
                temp_delta_c: 10.0,
                duration_h: 3.0,
                end_hours_before_discovery: 5.0,
            }),
            ..CorrectionContext::default()
        };

        let err = back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx)
            .unwrap_err();
        assert!(matches!(err, PmiError::InsufficientHistory { .. }));

        // Reachable target to inspect the trace: 11/sample outside the
        // window, 21/sample inside, cumulative hits 150 at age 9 h
        let profile = reference_profile(150.0);
        let est =
            back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx).unwrap();
        // Age 4 h: outside the window
        let at_4h = &est.trace[4];
        assert!(!at_4h.event_active);
        assert_relative_eq!(at_4h.effective_temp_c, 20.0);
        // Age 6 h: inside the window
        let at_6h = &est.trace[6];
        assert!(at_6h.event_active);
        assert_relative_eq!(at_6h.effective_temp_c, 30.0);
    }

    #[test]
    fn test_first_crossing_wins() {
        // Target reached exactly at sample index 1; samples further back
        // must not appear in the trace.
        let profile = reference_profile(22.0);
        let series = constant_series(50, 20.0);
        let ctx = CorrectionContext::default();

        let est =
            back_calculate(&profile, LifeStage::Instar3Wandering, &series, &ctx).unwrap();
        assert_eq!(est.trace.len(), 2);
        assert_relative_eq!(est.hours_before_discovery, 1.0);
    }
}
