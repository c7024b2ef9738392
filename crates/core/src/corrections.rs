//! Per-run correction context and the fixed composition order
//!
//! One [`CorrectionContext`] describes every environmental modifier in
//! effect for a single engine run. The modifiers are composed in a fixed
//! order for each sample — soil damping, then self-heating, then solar
//! exposure, then transient events — because later terms depend on
//! earlier ones and threshold clamping must see the fully corrected
//! value. Nothing in the context mutates between samples; the only state
//! threaded through a run is the ADH accumulator itself.

use crate::physics;
use crate::species::SpeciesProfile;
use serde::{Deserialize, Serialize};

pub use crate::physics::event::ThermalEvent;

/// Threshold boundary handling for growth suspension
///
/// Historical variants of the model disagree on whether a temperature
/// exactly at a developmental threshold suspends growth, so the
/// inclusivity is configurable per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// The threshold value itself suspends growth
    Inclusive,
    /// Growth is suspended only strictly beyond the threshold
    Exclusive,
}

/// Which maggot-mass heating model to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfHeatingPolicy {
    /// Constant bonus once development has passed the first instar
    FlatThreshold,
    /// Heating keyed to biological age; full strength only while feeding
    StageCurve,
}

/// Maggot-mass self-heating settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfHeating {
    /// Peak temperature elevation (°C); 0 disables the correction
    pub max_delta_c: f32,
    pub policy: SelfHeatingPolicy,
}

impl Default for SelfHeating {
    fn default() -> Self {
        SelfHeating {
            max_delta_c: 0.0,
            policy: SelfHeatingPolicy::StageCurve,
        }
    }
}

/// Burial correction settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilCorrection {
    /// Directly measured soil temperature (°C); overrides ambient verbatim
    pub measured_temp_c: Option<f32>,
    /// Burial depth (cm); drives the damping fraction when no measured
    /// temperature is supplied
    pub depth_cm: f32,
}

/// Environmental modifiers for one engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionContext {
    /// Burial correction; `None` for surface remains
    pub soil: Option<SoilCorrection>,
    /// Maggot-mass heating
    pub self_heating: SelfHeating,
    /// Constant solar exposure delta (°C): positive in direct sun,
    /// negative in deep shade, zero indoors or buried
    pub solar_delta_c: f32,
    /// Single bounded thermal event; `None` if no event occurred
    pub event: Option<ThermalEvent>,
    /// Growth-rate multiplier for chemical/physiological accelerants,
    /// strictly positive (1.0 = no correction)
    pub growth_rate_multiplier: f32,
    /// Upper-threshold boundary handling; default inclusive
    /// (temperature at UDT suspends growth)
    pub udt_boundary: Boundary,
    /// Lower-threshold boundary handling; default exclusive
    /// (growth requires temperature strictly above LDT)
    pub ldt_boundary: Boundary,
}

impl Default for CorrectionContext {
    fn default() -> Self {
        CorrectionContext {
            soil: None,
            self_heating: SelfHeating::default(),
            solar_delta_c: 0.0,
            event: None,
            growth_rate_multiplier: 1.0,
            udt_boundary: Boundary::Inclusive,
            ldt_boundary: Boundary::Exclusive,
        }
    }
}

/// Fully corrected temperature for one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CorrectedSample {
    /// Effective temperature after all corrections (°C)
    pub effective_temp_c: f32,
    /// Self-heating component included in the effective temperature (°C)
    pub self_heating_c: f32,
    /// Whether the transient event covered this sample
    pub event_active: bool,
}

impl CorrectionContext {
    /// Compose all corrections for one sample
    ///
    /// # Arguments
    /// * `base_temp_c` - Raw ambient reading (°C)
    /// * `mean_ambient_c` - Period mean ambient (soil asymptote, °C)
    /// * `age_h` - Sample age in hours before the fixed discovery time
    /// * `profile` - Species whose stage thresholds gate self-heating
    /// * `target_adh` - Total ADH required for the observed stage
    /// * `accumulated_adh` - Accumulator value before this sample
    pub(crate) fn effective_temperature(
        &self,
        base_temp_c: f32,
        mean_ambient_c: f32,
        age_h: f32,
        profile: &SpeciesProfile,
        target_adh: f32,
        accumulated_adh: f32,
    ) -> CorrectedSample {
        // 1. Soil/burial damping
        let mut temp = match self.soil {
            Some(SoilCorrection {
                measured_temp_c: Some(measured),
                ..
            }) => measured,
            Some(SoilCorrection {
                measured_temp_c: None,
                depth_cm,
            }) => physics::soil_damped_temperature(base_temp_c, depth_cm, mean_ambient_c),
            None => base_temp_c,
        };

        // 2. Maggot-mass self-heating
        let heating = if self.self_heating.max_delta_c > 0.0 {
            match self.self_heating.policy {
                SelfHeatingPolicy::FlatThreshold => physics::flat_heating(
                    accumulated_adh,
                    profile,
                    self.self_heating.max_delta_c,
                ),
                SelfHeatingPolicy::StageCurve => {
                    // Biological age at this point of the reverse walk
                    let remaining = (target_adh - accumulated_adh).max(0.0);
                    physics::stage_curve_heating(remaining, profile, self.self_heating.max_delta_c)
                }
            }
        } else {
            0.0
        };
        temp += heating;

        // 3. Solar exposure
        temp += self.solar_delta_c;

        // 4. Transient event
        let (event_delta, event_active) = match &self.event {
            Some(event) => physics::event_delta(event, age_h),
            None => (0.0, false),
        };
        temp += event_delta;

        CorrectedSample {
            effective_temp_c: temp,
            self_heating_c: heating,
            event_active,
        }
    }
}
