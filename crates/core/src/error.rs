//! Error taxonomy for the estimation core
//!
//! Every component validates at its own boundary and reports a tagged
//! result. A wrong input is never converted into a silently wrong number:
//! the engine either produces an estimate or a distinguishable failure.

/// Errors surfaced by the estimation core
#[derive(Debug, Clone, PartialEq)]
pub enum PmiError {
    /// A caller-supplied value makes the model inapplicable
    /// (e.g. rectal temperature at or below ambient, non-positive
    /// growth-rate multiplier)
    InvalidInput(String),
    /// Requested species or life stage is absent from the reference table
    UnknownReference(String),
    /// The supplied temperature history was exhausted before accumulation
    /// reached the developmental target; no onset estimate exists within
    /// the window
    InsufficientHistory {
        /// ADH accumulated over the whole series
        accumulated_adh: f32,
        /// ADH required to reach the observed stage
        target_adh: f32,
    },
    /// An external collaborator (weather history, scenario parser) returned
    /// nothing usable; the engine must not run on partial data
    CollaboratorUnavailable(String),
}

impl std::fmt::Display for PmiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PmiError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            PmiError::UnknownReference(msg) => write!(f, "Unknown reference: {msg}"),
            PmiError::InsufficientHistory {
                accumulated_adh,
                target_adh,
            } => write!(
                f,
                "Insufficient history: accumulated {accumulated_adh:.1} ADH of {target_adh:.1} required"
            ),
            PmiError::CollaboratorUnavailable(msg) => {
                write!(f, "Collaborator unavailable: {msg}")
            }
        }
    }
}

impl std::error::Error for PmiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = PmiError::InsufficientHistory {
            accumulated_adh: 1100.0,
            target_adh: 2000.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("1100.0"), "message was {msg}");
        assert!(msg.contains("2000.0"), "message was {msg}");

        let err = PmiError::UnknownReference("musca domestica".to_string());
        assert!(err.to_string().contains("musca domestica"));
    }
}
