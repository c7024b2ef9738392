//! Maggot-mass self-heating
//!
//! Aggregated larvae raise the local temperature well above ambient. Two
//! policies exist in practice and both are kept as named strategies
//! (selected per run via [`crate::corrections::SelfHeatingPolicy`]):
//!
//! - **flat**: a constant bonus once development has passed the first
//!   instar, the model used by older casework tooling;
//! - **stage curve**: heating keyed to the larva's biological age, full
//!   strength only during third-instar feeding, the model matching
//!   observed mass thermogenesis.
//!
//! # Scientific References
//! - Charabidze, D. et al. (2011). "Larval-mass effect: characterisation
//!   of heat emission by necrophagous blowfly aggregates",
//!   Forensic Science International, 211(1-3), 61-66

use crate::species::{LifeStage, SpeciesProfile};

/// Curve weight between the first- and second-instar thresholds
const EARLY_INSTAR_FRACTION: f32 = 0.3;
/// Curve weight between feeding end and wandering end
const POST_FEEDING_FRACTION: f32 = 0.2;

/// Flat threshold-gated heating
///
/// Full heating once the accumulator has reached the first-instar
/// threshold (boundary inclusive), nothing before. Species without
/// first-instar data heat from the start, matching a zero threshold.
pub(crate) fn flat_heating(accumulated_adh: f32, profile: &SpeciesProfile, max_delta_c: f32) -> f32 {
    let instar_1 = profile.stage_threshold(LifeStage::Instar1).unwrap_or(0.0);
    if accumulated_adh >= instar_1 {
        max_delta_c
    } else {
        0.0
    }
}

/// Stage-curve heating keyed to remaining developmental distance
///
/// `remaining_adh` is the larva's biological age at the sample being
/// processed: the target total minus what the reverse loop has already
/// accumulated (never negative). Bins against the species' stage
/// thresholds:
///
/// | biological age | heating |
/// |---|---|
/// | below first instar | 0 |
/// | first to second instar | 30% of max |
/// | second instar to feeding end | 100% of max |
/// | feeding end to wandering end | 20% of max |
/// | beyond wandering end | 0 |
pub(crate) fn stage_curve_heating(
    remaining_adh: f32,
    profile: &SpeciesProfile,
    max_delta_c: f32,
) -> f32 {
    let instar_1 = profile.stage_threshold(LifeStage::Instar1).unwrap_or(0.0);
    let instar_2 = profile.stage_threshold(LifeStage::Instar2).unwrap_or(0.0);
    let feed_end = profile
        .stage_threshold(LifeStage::Instar3Feeding)
        .unwrap_or(0.0);
    let wander_end = profile
        .stage_threshold(LifeStage::Instar3Wandering)
        .unwrap_or(0.0);

    if remaining_adh < instar_1 {
        0.0
    } else if remaining_adh < instar_2 {
        max_delta_c * EARLY_INSTAR_FRACTION
    } else if remaining_adh < feed_end {
        max_delta_c
    } else if remaining_adh < wander_end {
        max_delta_c * POST_FEEDING_FRACTION
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesTable;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_policy_gates_on_first_instar() {
        let table = SpeciesTable::builtin();
        let sp = table.get("lucilia_sericata").unwrap(); // instar_1 at 300

        assert_relative_eq!(flat_heating(299.9, sp, 5.0), 0.0);
        // Exactly the threshold activates heating
        assert_relative_eq!(flat_heating(300.0, sp, 5.0), 5.0);
        assert_relative_eq!(flat_heating(1000.0, sp, 5.0), 5.0);
    }

    #[test]
    fn test_stage_curve_bins() {
        let table = SpeciesTable::builtin();
        // Thresholds: i1 300, i2 800, feed 1400, wander 2400
        let sp = table.get("lucilia_sericata").unwrap();

        assert_relative_eq!(stage_curve_heating(100.0, sp, 10.0), 0.0);
        assert_relative_eq!(stage_curve_heating(500.0, sp, 10.0), 3.0);
        assert_relative_eq!(stage_curve_heating(1000.0, sp, 10.0), 10.0);
        assert_relative_eq!(stage_curve_heating(2000.0, sp, 10.0), 2.0);
        assert_relative_eq!(stage_curve_heating(3000.0, sp, 10.0), 0.0);
    }

    #[test]
    fn test_stage_curve_bin_edges() {
        let table = SpeciesTable::builtin();
        let sp = table.get("lucilia_sericata").unwrap();

        // Lower bin boundary belongs to the next bin (strict less-than)
        assert_relative_eq!(stage_curve_heating(300.0, sp, 10.0), 3.0);
        assert_relative_eq!(stage_curve_heating(800.0, sp, 10.0), 10.0);
        assert_relative_eq!(stage_curve_heating(1400.0, sp, 10.0), 2.0);
        assert_relative_eq!(stage_curve_heating(2400.0, sp, 10.0), 0.0);
    }
}
