//! Scenario-parser collaborator and whitelist validation
//!
//! A language-model scenario parser can pre-fill run parameters from
//! free-text case notes (and optionally a scene photograph). Its output
//! is untrusted: every field is optional, species/stage/drug names are
//! free-form strings, and nothing reaches the engine without passing the
//! reference-table whitelist. Unrecognized values are dropped, not
//! errors — parser failure degrades to "no auto-fill", never a hard stop.

use crate::corrections::{CorrectionContext, ThermalEvent};
use crate::error::PmiError;
use crate::species::{LifeStage, SpeciesTable};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Best-effort structured output of the scenario parser
///
/// Mirrors the parser's JSON schema; all fields optional and unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioHints {
    pub species: Option<String>,
    pub stage: Option<String>,
    pub self_heating_max: Option<f32>,
    pub drug_type: Option<String>,
    pub event: Option<EventHints>,
    pub profiling: Option<ProfilingHints>,
}

/// Unvalidated transient-event hints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventHints {
    pub active: bool,
    pub temp_increase: Option<f32>,
    pub duration: Option<f32>,
    pub end_hours_ago: Option<f32>,
}

/// Free-form parser reasoning, shown to the investigator only; never
/// feeds the calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingHints {
    /// Parser's species probability guesses, keyed by free-form name
    pub probabilities: FxHashMap<String, f32>,
    pub reasoning: Option<String>,
}

impl ScenarioHints {
    /// Parse a raw parser response
    ///
    /// # Errors
    /// Returns [`PmiError::CollaboratorUnavailable`] for unparseable
    /// output; the caller proceeds without auto-fill.
    pub fn from_json(raw: &str) -> Result<Self, PmiError> {
        serde_json::from_str(raw).map_err(|e| {
            PmiError::CollaboratorUnavailable(format!("scenario parser output unparseable: {e}"))
        })
    }
}

/// Natural-language scenario parser
///
/// Implementations call out to a language model; failures must be
/// surfaced as [`PmiError::CollaboratorUnavailable`] so callers can fall
/// back to manual parameter entry.
pub trait ScenarioParser {
    /// Extract hints from free text and an optional scene image
    ///
    /// # Errors
    /// Returns [`PmiError::CollaboratorUnavailable`] when the backend is
    /// unreachable or its output cannot be parsed.
    fn parse(&self, text: &str, image: Option<&[u8]>) -> Result<ScenarioHints, PmiError>;
}

/// Growth-rate multiplier for a detected drug, from a fixed whitelist
///
/// Stimulants accelerate larval development, depressants slow it.
/// Unknown drug names return `None` and leave the multiplier at 1.0.
pub fn drug_multiplier(drug: &str) -> Option<f32> {
    match drug.trim().to_lowercase().as_str() {
        "cocaine" => Some(1.2),
        "methamphetamine" | "amphetamine" => Some(1.3),
        "barbiturate" | "phenobarbital" => Some(0.8),
        "diazepam" => Some(0.9),
        _ => None,
    }
}

/// Hints after whitelist validation
///
/// Only values that survived the reference-table lookup are present; the
/// context is ready to hand to the engine (possibly after the caller
/// layers on soil/solar settings the parser does not produce).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScenario {
    /// Species id resolved against the reference table
    pub species_id: Option<String>,
    /// Observed stage, present only if the resolved species has data for it
    pub stage: Option<LifeStage>,
    /// Correction context assembled from the accepted hints
    pub context: CorrectionContext,
}

/// Validate hints against the reference table
///
/// Species and stage names go through the whitelist; unrecognized values
/// are ignored. A stage is kept only when the resolved species actually
/// has ADH data for it. Event hints require `active` plus all three
/// numeric fields; anything less is dropped.
pub fn apply_hints(hints: &ScenarioHints, table: &SpeciesTable) -> ValidatedScenario {
    let profile = hints
        .species
        .as_deref()
        .and_then(|name| table.resolve(name));

    let stage = hints
        .stage
        .as_deref()
        .and_then(LifeStage::parse)
        .filter(|&s| match profile {
            Some(p) => p.stage_threshold(s).is_some(),
            None => false,
        });

    let mut context = CorrectionContext::default();

    if let Some(max) = hints.self_heating_max {
        if max > 0.0 {
            context.self_heating.max_delta_c = max;
        }
    }

    if let Some(drug) = hints.drug_type.as_deref() {
        if let Some(multiplier) = drug_multiplier(drug) {
            context.growth_rate_multiplier = multiplier;
        }
    }

    if let Some(event) = &hints.event {
        if event.active {
            if let (Some(delta), Some(duration), Some(end)) =
                (event.temp_increase, event.duration, event.end_hours_ago)
            {
                if duration > 0.0 && end >= 0.0 {
                    context.event = Some(ThermalEvent {
                        temp_delta_c: delta,
                        duration_h: duration,
                        end_hours_before_discovery: end,
                    });
                }
            }
        }
    }

    ValidatedScenario {
        species_id: profile.map(|p| p.id.clone()),
        stage,
        context,
    }
}
