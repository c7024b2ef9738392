//! Environmental correction transforms
//!
//! Each modifier is an independently testable pure function. Composition
//! order lives in [`crate::corrections`] and is part of the engine
//! contract: soil damping first, then self-heating, then solar exposure,
//! then transient events, so that threshold clamping always sees the
//! fully corrected value.

pub(crate) mod event;
pub(crate) mod self_heating;
pub(crate) mod soil;

pub(crate) use event::event_delta;
pub(crate) use self_heating::{flat_heating, stage_curve_heating};
pub(crate) use soil::soil_damped_temperature;
