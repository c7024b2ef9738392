//! Burial damping of ambient temperature
//!
//! Soil attenuates surface temperature swings: the deeper the burial, the
//! closer the local temperature sits to the period's mean ambient
//! temperature. Empirical attenuation is 1.5% of the swing per centimetre
//! of depth, saturating at full damping, with an extra cooling term in
//! hot weather (soil stays cooler than hot air).
//!
//! # Scientific References
//! - Rodriguez, W.C. & Bass, W.M. (1985). "Decomposition of buried
//!   bodies and methods that may aid in their location",
//!   Journal of Forensic Sciences, 30(3), 836-852

/// Damping fraction toward the period mean per centimetre of depth
const DAMP_PER_CM: f32 = 0.015;

/// Extra cooling per centimetre when ambient exceeds the hot threshold (°C)
const HOT_OFFSET_PER_CM: f32 = 0.05;

/// Ambient temperature above which buried remains run cooler than air (°C)
const HOT_THRESHOLD_C: f32 = 20.0;

/// Local temperature at burial depth
///
/// # Arguments
/// * `base_temp_c` - Surface ambient temperature (°C)
/// * `depth_cm` - Burial depth (cm)
/// * `mean_ambient_c` - Mean ambient temperature over the period (°C)
///
/// # Returns
/// Effective local temperature (°C). Depth 0 returns the base temperature
/// unchanged; at saturating depth the result is the period mean, less the
/// hot-weather offset when the surface reading exceeds 20 °C.
pub(crate) fn soil_damped_temperature(base_temp_c: f32, depth_cm: f32, mean_ambient_c: f32) -> f32 {
    let damp = (depth_cm * DAMP_PER_CM).min(1.0);
    let mut local = base_temp_c * (1.0 - damp) + mean_ambient_c * damp;
    if base_temp_c > HOT_THRESHOLD_C {
        local -= depth_cm * HOT_OFFSET_PER_CM;
    }
    local
}
