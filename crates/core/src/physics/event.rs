//! Transient thermal events
//!
//! A bounded window of altered temperature before discovery: the body
//! spent hours in a car boot, on an electric blanket, was moved indoors.
//! The window is anchored to the fixed discovery timestamp, never to a
//! per-sample reference, so the same event covers the same samples on
//! every run.

/// Parameters of one transient thermal event
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThermalEvent {
    /// Temperature change while the event is active (°C, signed)
    pub temp_delta_c: f32,
    /// Event duration (hours)
    pub duration_h: f32,
    /// Hours before discovery at which the event ended
    pub end_hours_before_discovery: f32,
}

/// Event contribution for a sample at `age_h` hours before discovery
///
/// Returns the temperature delta and whether the event covers the sample.
/// Both window ends are inclusive.
pub(crate) fn event_delta(event: &ThermalEvent, age_h: f32) -> (f32, bool) {
    let start = event.end_hours_before_discovery;
    let end = event.end_hours_before_discovery + event.duration_h;
    if age_h >= start && age_h <= end {
        (event.temp_delta_c, true)
    } else {
        (0.0, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_coverage() {
        // Ended 5 h before discovery, lasted 3 h: covers ages [5, 8]
        let event = ThermalEvent {
            temp_delta_c: 10.0,
            duration_h: 3.0,
            end_hours_before_discovery: 5.0,
        };

        assert_eq!(event_delta(&event, 6.0), (10.0, true));
        assert_eq!(event_delta(&event, 4.0), (0.0, false));
        assert_eq!(event_delta(&event, 9.0), (0.0, false));
    }

    #[test]
    fn test_window_ends_inclusive() {
        let event = ThermalEvent {
            temp_delta_c: -4.0,
            duration_h: 2.0,
            end_hours_before_discovery: 1.0,
        };

        assert_eq!(event_delta(&event, 1.0), (-4.0, true));
        assert_eq!(event_delta(&event, 3.0), (-4.0, true));
    }
}
