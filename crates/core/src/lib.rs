//! Forensic PMI Estimation Core Library
//!
//! Estimates a post-mortem interval from insect development evidence by
//! back-calculating accumulated degree-hours (ADH) against a historical
//! temperature series, cross-checked against a short-interval body-cooling
//! estimate.
//!
//! The centerpiece is the reverse-time ADH engine: it walks history from
//! the discovery time backwards, corrects each sample for burial, solar
//! exposure, maggot-mass self-heating, and transient thermal events, and
//! stops at the first sample where accumulated thermal exposure satisfies
//! the developmental target for the observed species and stage.
//!
//! Everything here is pure, synchronous computation over in-memory data.
//! External collaborators (weather history, language-model scenario
//! parsing) sit behind traits and run strictly before or after the
//! engine, never inside it.

// Reference data and inputs
pub mod series;
pub mod species;

// Environmental correction transforms
pub mod corrections;
pub mod physics;

// Estimators
pub mod cooling;
pub mod engine;

// External collaborators and presentation surfaces
pub mod report;
pub mod scenario;
pub mod session;
pub mod weather;

pub mod error;

// Re-export the primary types
pub use cooling::{estimate_hours_since_death, CoolingEstimate};
pub use corrections::{
    Boundary, CorrectionContext, SelfHeating, SelfHeatingPolicy, SoilCorrection, ThermalEvent,
};
pub use engine::{back_calculate, PmiEstimate, TraceRecord};
pub use error::PmiError;
pub use report::{CaseMetadata, Report};
pub use scenario::{apply_hints, ScenarioHints, ScenarioParser, ValidatedScenario};
pub use series::{TemperatureSample, TemperatureSeries};
pub use session::{ScalarValue, SessionError, SessionState};
pub use species::{LifeStage, SpeciesProfile, SpeciesTable};
pub use weather::{Location, SyntheticWeather, TimeRange, WeatherProvider};
