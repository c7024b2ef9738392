//! Species and life-stage reference table
//!
//! Static developmental constants for forensically relevant blowfly
//! species: lower/upper developmental thresholds and the cumulative
//! accumulated degree-hours (ADH) needed to reach each life stage.
//!
//! # Scientific References
//! - Jung, J. & Yoon, M. (2015). "Development of Lucilia sericata under
//!   Busan climate conditions", Korean Police Studies, 14(1), 225-240
//! - Grassberger, M. & Reiter, C. (2001). "Effect of temperature on
//!   Lucilia sericata development", Forensic Science International, 120

use crate::error::PmiError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Blowfly life stages in developmental order
///
/// `Instar3Feeding` and `Instar3Wandering` split the third instar at the
/// end of active feeding; the split matters because maggot-mass heating
/// is strongest during feeding and stops during wandering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    /// Egg, prior to first hatch
    Egg,
    /// First instar larva
    Instar1,
    /// Second instar larva
    Instar2,
    /// Third instar larva, actively feeding
    Instar3Feeding,
    /// Third instar larva, post-feeding wandering phase
    Instar3Wandering,
    /// Pupa
    Pupa,
    /// Eclosed adult
    Adult,
}

impl LifeStage {
    /// Parse a stage name from untrusted free-form input
    ///
    /// Accepts the snake_case keys used by field notes and scenario
    /// parsers (`egg`, `instar_1`, `instar_3_feed`, ...). Returns `None`
    /// for anything unrecognized; callers ignore unknown stages rather
    /// than failing the run.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "egg" | "eggs" => Some(LifeStage::Egg),
            "instar_1" | "instar1" | "first_instar" => Some(LifeStage::Instar1),
            "instar_2" | "instar2" | "second_instar" => Some(LifeStage::Instar2),
            "instar_3_feed" | "instar_3_feeding" | "third_instar_feeding" => {
                Some(LifeStage::Instar3Feeding)
            }
            "instar_3_wander" | "instar_3_wandering" | "third_instar_wandering" => {
                Some(LifeStage::Instar3Wandering)
            }
            "pupa" | "pupae" => Some(LifeStage::Pupa),
            "adult" | "adults" => Some(LifeStage::Adult),
            _ => None,
        }
    }

    /// Canonical snake_case name, matching the parse aliases
    pub fn name(self) -> &'static str {
        match self {
            LifeStage::Egg => "egg",
            LifeStage::Instar1 => "instar_1",
            LifeStage::Instar2 => "instar_2",
            LifeStage::Instar3Feeding => "instar_3_feed",
            LifeStage::Instar3Wandering => "instar_3_wander",
            LifeStage::Pupa => "pupa",
            LifeStage::Adult => "adult",
        }
    }
}

/// Developmental constants for one species
///
/// Immutable reference data; constructed once at table load. Stage
/// thresholds are cumulative ADH from oviposition and must be
/// non-decreasing in developmental order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesProfile {
    /// Stable lookup key (e.g. `lucilia_sericata_busan`)
    pub id: String,
    /// Human-readable name for reports
    pub display_name: String,
    /// Lower developmental threshold (°C); no growth at or below
    pub ldt_c: f32,
    /// Upper developmental threshold (°C); growth suspended at or above
    pub udt_c: f32,
    /// Cumulative ADH required to reach each stage, in developmental order
    stages: Vec<(LifeStage, f32)>,
}

impl SpeciesProfile {
    /// Build a profile, validating stage ordering
    ///
    /// # Errors
    /// Returns [`PmiError::InvalidInput`] if stage thresholds are not
    /// monotonically non-decreasing in developmental order, or if the
    /// thresholds themselves are out of biological order.
    pub fn new(
        id: &str,
        display_name: &str,
        ldt_c: f32,
        udt_c: f32,
        stages: Vec<(LifeStage, f32)>,
    ) -> Result<Self, PmiError> {
        if udt_c <= ldt_c {
            return Err(PmiError::InvalidInput(format!(
                "UDT ({udt_c}) must exceed LDT ({ldt_c}) for {id}"
            )));
        }
        for pair in stages.windows(2) {
            let (earlier, adh_earlier) = pair[0];
            let (later, adh_later) = pair[1];
            if later <= earlier {
                return Err(PmiError::InvalidInput(format!(
                    "stages for {id} out of developmental order at {}",
                    later.name()
                )));
            }
            if adh_later < adh_earlier {
                return Err(PmiError::InvalidInput(format!(
                    "ADH threshold for {} ({adh_later}) below {} ({adh_earlier}) in {id}",
                    later.name(),
                    earlier.name()
                )));
            }
        }
        Ok(SpeciesProfile {
            id: id.to_string(),
            display_name: display_name.to_string(),
            ldt_c,
            udt_c,
            stages,
        })
    }

    /// Cumulative ADH target for the observed stage
    ///
    /// # Errors
    /// Returns [`PmiError::UnknownReference`] if this species has no data
    /// for the requested stage.
    pub fn target_adh(&self, stage: LifeStage) -> Result<f32, PmiError> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|&(_, adh)| adh)
            .ok_or_else(|| {
                PmiError::UnknownReference(format!(
                    "no {} data for {}",
                    stage.name(),
                    self.id
                ))
            })
    }

    /// Stage threshold used by the self-heating curve
    ///
    /// Absent stages are treated as threshold zero by callers, so this
    /// returns an `Option` rather than an error.
    pub fn stage_threshold(&self, stage: LifeStage) -> Option<f32> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|&(_, adh)| adh)
    }

    /// Stages available for this species, in developmental order
    pub fn stages(&self) -> impl Iterator<Item = (LifeStage, f32)> + '_ {
        self.stages.iter().copied()
    }
}

/// Lookup table of built-in species profiles
///
/// Loaded once at process start; read-only thereafter.
#[derive(Debug, Clone)]
pub struct SpeciesTable {
    profiles: FxHashMap<String, SpeciesProfile>,
}

impl SpeciesTable {
    /// Built-in reference data
    ///
    /// Three profiles: the global-average Lucilia sericata, the
    /// cold-adapted Busan population (Jung & Yoon 2015, LDT 4.5 °C), and
    /// the thermophilic Chrysomya megacephala.
    pub fn builtin() -> Self {
        use LifeStage::{Adult, Egg, Instar1, Instar2, Instar3Feeding, Instar3Wandering, Pupa};

        let profiles = [
            SpeciesProfile::new(
                "lucilia_sericata",
                "Lucilia sericata (global average)",
                9.0,
                35.0,
                vec![
                    (Egg, 20.0),
                    (Instar1, 300.0),
                    (Instar2, 800.0),
                    (Instar3Feeding, 1400.0),
                    (Instar3Wandering, 2400.0),
                    (Pupa, 4000.0),
                ],
            ),
            // Jung & Yoon (2015) report egg-to-larva completion at 702 ADH
            // and pupation at 702 + 4199; instar splits within 702 follow
            // the usual growth-model proportions.
            SpeciesProfile::new(
                "lucilia_sericata_busan",
                "Lucilia sericata (Korea, Busan)",
                4.5,
                35.0,
                vec![
                    (Egg, 35.0),
                    (Instar1, 150.0),
                    (Instar2, 350.0),
                    (Instar3Feeding, 550.0),
                    (Instar3Wandering, 702.0),
                    (Pupa, 4901.0),
                    (Adult, 6483.0),
                ],
            ),
            SpeciesProfile::new(
                "chrysomya_megacephala",
                "Chrysomya megacephala",
                10.0,
                40.0,
                vec![
                    (Egg, 15.0),
                    (Instar1, 300.0),
                    (Instar2, 700.0),
                    (Instar3Feeding, 1300.0),
                    (Instar3Wandering, 2200.0),
                    (Pupa, 3800.0),
                ],
            ),
        ];

        let mut table = FxHashMap::default();
        for profile in profiles {
            // Built-in data is validated by the same constructor as user
            // data; a failure here is a programming error in the constants.
            let profile = profile.unwrap_or_else(|e| panic!("built-in profile invalid: {e}"));
            table.insert(profile.id.clone(), profile);
        }
        SpeciesTable { profiles: table }
    }

    /// Look up a species by id
    ///
    /// # Errors
    /// Returns [`PmiError::UnknownReference`] if the id is not in the table.
    pub fn get(&self, species_id: &str) -> Result<&SpeciesProfile, PmiError> {
        self.profiles.get(species_id).ok_or_else(|| {
            PmiError::UnknownReference(format!("species '{species_id}' not in reference table"))
        })
    }

    /// Whitelist lookup for untrusted species names
    ///
    /// Tolerates case and whitespace differences; returns `None` instead
    /// of an error so scenario auto-fill can silently skip unknowns.
    pub fn resolve(&self, name: &str) -> Option<&SpeciesProfile> {
        let key = name.trim().to_lowercase().replace([' ', '-'], "_");
        self.profiles.get(&key)
    }

    /// All species ids in the table
    pub fn species_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_lookup() {
        let table = SpeciesTable::builtin();
        let busan = table.get("lucilia_sericata_busan").unwrap();

        assert_eq!(busan.ldt_c, 4.5);
        assert_eq!(busan.udt_c, 35.0);
        assert_eq!(busan.target_adh(LifeStage::Instar3Wandering).unwrap(), 702.0);
        assert_eq!(busan.target_adh(LifeStage::Adult).unwrap(), 6483.0);
    }

    #[test]
    fn test_unknown_species_is_tagged_error() {
        let table = SpeciesTable::builtin();
        match table.get("musca_domestica") {
            Err(PmiError::UnknownReference(_)) => {}
            other => panic!("expected UnknownReference, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_stage_is_tagged_error() {
        let table = SpeciesTable::builtin();
        let global = table.get("lucilia_sericata").unwrap();

        // Global profile has no adult ADH data
        match global.target_adh(LifeStage::Adult) {
            Err(PmiError::UnknownReference(_)) => {}
            other => panic!("expected UnknownReference, got {other:?}"),
        }
    }

    #[test]
    fn test_non_monotonic_thresholds_rejected() {
        let result = SpeciesProfile::new(
            "bad",
            "Bad data",
            9.0,
            35.0,
            vec![
                (LifeStage::Egg, 100.0),
                (LifeStage::Instar1, 50.0), // Decreasing
            ],
        );
        assert!(matches!(result, Err(PmiError::InvalidInput(_))));
    }

    #[test]
    fn test_udt_must_exceed_ldt() {
        let result = SpeciesProfile::new("bad", "Bad data", 35.0, 9.0, vec![]);
        assert!(matches!(result, Err(PmiError::InvalidInput(_))));
    }

    #[test]
    fn test_resolve_tolerates_formatting() {
        let table = SpeciesTable::builtin();
        assert!(table.resolve("Lucilia Sericata").is_some());
        assert!(table.resolve(" chrysomya_megacephala ").is_some());
        assert!(table.resolve("drosophila melanogaster").is_none());
    }

    #[test]
    fn test_stage_name_round_trip() {
        for stage in [
            LifeStage::Egg,
            LifeStage::Instar1,
            LifeStage::Instar2,
            LifeStage::Instar3Feeding,
            LifeStage::Instar3Wandering,
            LifeStage::Pupa,
            LifeStage::Adult,
        ] {
            assert_eq!(LifeStage::parse(stage.name()), Some(stage));
        }
        assert_eq!(LifeStage::parse("imago"), None);
    }
}
