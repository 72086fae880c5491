//! Observable restore lifecycle events
//!
//! Events are explicit and typed; every log line names one of these.

use std::fmt;

/// Observable events in a restore episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Snapshot delivery
    /// Snapshot delivered to the coordinator
    SnapshotLoaded,

    // Restore lifecycle
    /// Restoration requested before the snapshot arrived; deferred
    RestoreDeferred,
    /// Batch restoration begins
    RestoreStart,
    /// One record materialized
    RecordRestored,
    /// One record dropped (unusable payload or refused by the factory)
    RecordDropped,
    /// Targeted out-of-band restore requested
    TargetedRestore,
    /// Episode cancelled and resources released
    RestoreCancelled,
    /// Episode completed; owner notified
    RestoreFinished,

    // Contract misuse
    /// A lifecycle entry point was invoked from an invalid phase
    ContractViolation,

    // Dev tooling
    /// Session manifest loaded
    ManifestLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::RestoreDeferred => "RESTORE_DEFERRED",
            Event::RestoreStart => "RESTORE_BEGIN",
            Event::RecordRestored => "RECORD_RESTORED",
            Event::RecordDropped => "RECORD_DROPPED",
            Event::TargetedRestore => "TARGETED_RESTORE",
            Event::RestoreCancelled => "RESTORE_CANCELLED",
            Event::RestoreFinished => "RESTORE_COMPLETE",
            Event::ContractViolation => "CONTRACT_VIOLATION",
            Event::ManifestLoaded => "MANIFEST_LOADED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
