//! Record materialization seam
//!
//! The factory turns persisted records into live objects. It is owned by
//! the caller and handed to the coordinator per call, so the coordinator
//! never holds a reference to owner-side state.

use crate::session::{PersistedRecord, RecordId};

/// Live object produced by materializing one persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedRecord {
    /// Identifier of the source record.
    pub id: RecordId,
    /// URL the live record actually resolved to; may differ from the
    /// persisted last-known URL.
    pub url: String,
}

/// Synchronously materializes live ("frozen") records.
pub trait RecordFactory {
    /// Creates a frozen record at the given original index.
    ///
    /// Returning `None` reports the record unusable; the coordinator drops
    /// it silently. Only called with a payload that passed the usability
    /// check, and at most once per record id.
    fn create_frozen(&mut self, record: &PersistedRecord, index: usize)
        -> Option<MaterializedRecord>;
}
