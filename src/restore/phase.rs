//! Restore state machine phases
//!
//! One exhaustive enum replaces the flag soup a restore lifecycle tends to
//! accumulate: exactly one phase holds at any time, and every transition
//! is a single match in the coordinator.

use std::fmt;

/// Phase of a restore episode.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RestorePhase {
    /// No snapshot yet; restoration not requested.
    Empty,
    /// Restoration requested before the snapshot arrived; begins
    /// automatically on load.
    RestoreOnceLoaded,
    /// Snapshot present; restoration not yet requested.
    Loaded,
    /// Batch/targeted restoration actively progressing.
    Restoring,
    /// Terminal: restoration aborted, owner notified once.
    Cancelled,
    /// All records processed; completion posted but not yet delivered.
    Finishing,
    /// Terminal: completion delivered exactly once.
    Finished,
}

impl RestorePhase {
    /// Absorbing phases: no further record is materialized and no further
    /// lifecycle notification is emitted.
    pub fn is_terminal(self) -> bool {
        matches!(self, RestorePhase::Cancelled | RestorePhase::Finished)
    }

    /// Phases in which cancel and targeted restore are no-ops: the episode
    /// is already over or its completion is in flight.
    pub fn is_winding_down(self) -> bool {
        matches!(
            self,
            RestorePhase::Cancelled | RestorePhase::Finishing | RestorePhase::Finished
        )
    }

    /// Returns the string representation (used in log fields).
    pub fn as_str(self) -> &'static str {
        match self {
            RestorePhase::Empty => "empty",
            RestorePhase::RestoreOnceLoaded => "restore_once_loaded",
            RestorePhase::Loaded => "loaded",
            RestorePhase::Restoring => "restoring",
            RestorePhase::Cancelled => "cancelled",
            RestorePhase::Finishing => "finishing",
            RestorePhase::Finished => "finished",
        }
    }
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(RestorePhase::Cancelled.is_terminal());
        assert!(RestorePhase::Finished.is_terminal());
        assert!(!RestorePhase::Finishing.is_terminal());
        assert!(!RestorePhase::Restoring.is_terminal());
        assert!(!RestorePhase::Empty.is_terminal());
    }

    #[test]
    fn test_winding_down_includes_finishing() {
        assert!(RestorePhase::Finishing.is_winding_down());
        assert!(RestorePhase::Cancelled.is_winding_down());
        assert!(RestorePhase::Finished.is_winding_down());
        assert!(!RestorePhase::Loaded.is_winding_down());
    }
}
