//! Delegate contract for restore progress
//!
//! The observer is the only channel through which the coordinator reports
//! per-record progress and episode lifecycle to its owner.

use crate::session::RecordId;

/// Outcome of materializing one record, reported exactly once per record
/// that is actually materialized (never for dropped records).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreDetails {
    /// Original index of the record in the snapshot.
    pub index: usize,
    /// Stable record identifier.
    pub id: RecordId,
    /// URL the live record resolved to.
    pub url: String,
    /// Whether this record sits at the active index of the standard model.
    pub is_standard_active_index: bool,
    /// Whether this record sits at the active index of the incognito model.
    pub is_incognito_active_index: bool,
    /// Whether the record belongs to the incognito model.
    pub is_incognito: bool,
    /// Whether the record arrived via a cross-instance merge.
    pub from_merge: bool,
}

/// Owner-side delegate for a restore episode.
pub trait RestoreObserver {
    /// Fired once per successfully materialized record.
    ///
    /// Batch-path events arrive in non-decreasing index order; a targeted
    /// restore may emit out of that order.
    fn on_details_read(&mut self, details: &RestoreDetails);

    /// Fired exactly once, after all batch/targeted work has concluded and
    /// the snapshot has been released. Never fired after `on_cancelled`.
    fn on_finished(&mut self);

    /// Fired exactly once when cancellation completes, synchronously or
    /// deferred to snapshot arrival.
    fn on_cancelled(&mut self);
}
