//! Report assembly and export
//!
//! Merges the insect-evidence estimate, the cooling cross-check, and the
//! case metadata into one exportable artifact. The summary sheet is for
//! humans; the trace sheet mirrors every audit record verbatim — it is
//! the compliance-grade output and must round-trip every engine trace
//! field without loss.

use crate::cooling::CoolingEstimate;
use crate::corrections::CorrectionContext;
use crate::engine::PmiEstimate;
use crate::species::{LifeStage, SpeciesProfile};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Quote a CSV field when it contains a delimiter, quote, or newline
///
/// Metadata fields are free text from the investigator; numeric and
/// timestamp columns never need quoting.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Case identifiers carried into every export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetadata {
    pub case_id: String,
    pub investigator: String,
    pub location_name: String,
}

/// Assembled case report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: CaseMetadata,
    /// Species id and display name used for the run
    pub species_id: String,
    pub species_name: String,
    /// Observed life stage (canonical snake_case name)
    pub stage: String,
    /// Correction settings in effect for the run
    pub context: CorrectionContext,
    /// Insect-evidence estimate; `None` when the run failed
    pub estimate: Option<PmiEstimate>,
    /// Short-interval cooling cross-check; `None` when not applicable
    pub cooling: Option<CoolingEstimate>,
}

impl Report {
    /// Merge run results and metadata into a report
    pub fn assemble(
        metadata: CaseMetadata,
        profile: &SpeciesProfile,
        stage: LifeStage,
        context: CorrectionContext,
        estimate: Option<PmiEstimate>,
        cooling: Option<CoolingEstimate>,
    ) -> Self {
        Report {
            metadata,
            species_id: profile.id.clone(),
            species_name: profile.display_name.clone(),
            stage: stage.name().to_string(),
            context,
            estimate,
            cooling,
        }
    }

    /// Full report as pretty-printed JSON
    ///
    /// # Errors
    /// Returns the underlying serialization error; with the types in this
    /// crate that only happens on exotic float values.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Summary sheet: one `key,value` row per field
    pub fn summary_csv(&self) -> String {
        let mut out = String::from("key,value\n");
        let mut row = |key: &str, value: String| {
            let _ = writeln!(out, "{key},{}", csv_field(&value));
        };

        row("case_id", self.metadata.case_id.clone());
        row("investigator", self.metadata.investigator.clone());
        row("location", self.metadata.location_name.clone());
        row("species", self.species_id.clone());
        row("stage", self.stage.clone());
        row(
            "growth_rate_multiplier",
            format!("{}", self.context.growth_rate_multiplier),
        );
        row("solar_delta_c", format!("{}", self.context.solar_delta_c));
        row(
            "self_heating_max_c",
            format!("{}", self.context.self_heating.max_delta_c),
        );
        row(
            "self_heating_policy",
            format!("{:?}", self.context.self_heating.policy),
        );
        match &self.context.soil {
            Some(soil) => {
                row("soil_depth_cm", format!("{}", soil.depth_cm));
                row(
                    "soil_measured_temp_c",
                    soil.measured_temp_c
                        .map_or_else(|| "none".to_string(), |t| format!("{t}")),
                );
            }
            None => row("soil_correction", "inactive".to_string()),
        }
        match &self.context.event {
            Some(event) => {
                row("event_temp_delta_c", format!("{}", event.temp_delta_c));
                row("event_duration_h", format!("{}", event.duration_h));
                row(
                    "event_end_hours_before_discovery",
                    format!("{}", event.end_hours_before_discovery),
                );
            }
            None => row("event", "inactive".to_string()),
        }
        match &self.estimate {
            Some(est) => {
                row("onset_time", est.onset_time.to_rfc3339());
                row(
                    "hours_before_discovery",
                    format!("{:.1}", est.hours_before_discovery),
                );
                row("total_adh", format!("{:.2}", est.total_adh));
                row("target_adh", format!("{:.2}", est.target_adh));
            }
            None => row("onset_time", "no estimate".to_string()),
        }
        match &self.cooling {
            Some(cooling) => {
                row("cooling_hours", format!("{:.1}", cooling.hours));
                row(
                    "cooling_confidence_h",
                    format!("{:.1}", cooling.confidence_h),
                );
            }
            None => row("cooling_estimate", "not applicable".to_string()),
        }
        out
    }

    /// Trace sheet: every engine audit record, every field, verbatim
    pub fn trace_csv(&self) -> String {
        let mut out = String::from(
            "time,base_temp_c,effective_temp_c,self_heating_c,contribution_adh,\
             accumulated_adh,target_adh,overheated,event_active\n",
        );
        if let Some(est) = &self.estimate {
            for r in &est.trace {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{}",
                    csv_field(&r.time.to_rfc3339()),
                    r.base_temp_c,
                    r.effective_temp_c,
                    r.self_heating_c,
                    r.contribution_adh,
                    r.accumulated_adh,
                    r.target_adh,
                    r.overheated,
                    r.event_active
                );
            }
        }
        out
    }
}
