//! Short-interval cooling estimate (Henssge-style)
//!
//! Independent closed-form cross-check for early post-mortem intervals,
//! before insect evidence is informative. Uses a two-exponential-style
//! decay approximation of rectal cooling with body-mass and
//! clothing/insulation correction factors. Stateless and entirely
//! separate from the ADH engine; the two estimates meet only in the
//! report.
//!
//! # Scientific References
//! - Henssge, C. (1988). "Death time estimation in case work I: the
//!   rectal temperature time of death nomogram",
//!   Forensic Science International, 38(3-4), 209-236

use crate::error::PmiError;
use serde::{Deserialize, Serialize};

/// Normal living core temperature (°C)
const NORMAL_BODY_TEMP_C: f32 = 37.2;

/// Empirical cooling constant for the decay approximation
const COOLING_CONSTANT: f32 = 10.0;

/// Reference body mass for the mass correction (kg)
const REFERENCE_MASS_KG: f32 = 70.0;

/// Result of one cooling estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoolingEstimate {
    /// Estimated hours since death
    pub hours: f32,
    /// Heuristic confidence half-width (hours): a fixed base plus a
    /// small fraction of the estimate, not a rigorous interval
    pub confidence_h: f32,
}

/// Estimate hours since death from a single temperature pair
///
/// # Arguments
/// * `rectal_c` - Measured rectal temperature (°C)
/// * `ambient_c` - Ambient temperature at the scene (°C)
/// * `body_mass_kg` - Body mass (kg)
/// * `clothing_factor` - Insulation correction (1.0 naked, higher for
///   clothing/covering)
///
/// # Errors
/// Returns [`PmiError::InvalidInput`] when the model is inapplicable:
/// rectal temperature at or below ambient, or ambient at or above normal
/// body temperature.
pub fn estimate_hours_since_death(
    rectal_c: f32,
    ambient_c: f32,
    body_mass_kg: f32,
    clothing_factor: f32,
) -> Result<CoolingEstimate, PmiError> {
    let temp_diff = rectal_c - ambient_c;
    let initial_diff = NORMAL_BODY_TEMP_C - ambient_c;

    if temp_diff <= 0.0 || initial_diff <= 0.0 {
        return Err(PmiError::InvalidInput(format!(
            "cooling model inapplicable: rectal {rectal_c} °C vs ambient {ambient_c} °C"
        )));
    }

    let y = temp_diff / initial_diff;
    let hours = if y >= 1.0 {
        // No net cooling yet per the model
        0.0
    } else {
        let mass_factor = (body_mass_kg / REFERENCE_MASS_KG).powf(1.0 / 3.0);
        -COOLING_CONSTANT * y.ln() * mass_factor * clothing_factor
    };

    Ok(CoolingEstimate {
        hours,
        confidence_h: 2.0 + hours * 0.1,
    })
}
