//! Loaded snapshot model
//!
//! A snapshot is the full persisted state delivered once at the start of a
//! restore episode:
//!
//! - records in original index order (insertion order is the restore order
//!   and the index space of the active index)
//! - an optional active index, tolerated out of range
//! - grouping metadata, opaque to the restore core, released together with
//!   the snapshot
//!
//! A snapshot is exclusively owned by the restore coordinator from
//! delivery until release on completion or cancellation.

use super::record::PersistedRecord;

/// Visual/grouping metadata for a set of records.
///
/// The restore core never interprets this; it travels with the snapshot so
/// the owner can rebuild group UI after restoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroup {
    /// Group handle referenced by `PersistedRecord::group`.
    pub id: u64,
    /// User-visible title.
    pub title: String,
    /// Whether the group was collapsed when captured.
    pub collapsed: bool,
}

/// The full persisted state loaded at the start of a restore episode.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<PersistedRecord>,
    active_index: Option<usize>,
    groups: Vec<TabGroup>,
}

impl Snapshot {
    /// Builds a snapshot from its parts.
    pub fn new(
        records: Vec<PersistedRecord>,
        active_index: Option<usize>,
        groups: Vec<TabGroup>,
    ) -> Self {
        Self {
            records,
            active_index,
            groups,
        }
    }

    /// Records in original index order.
    pub fn records(&self) -> &[PersistedRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The active index exactly as persisted; may be out of range.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// The index treated as active during restore.
    ///
    /// An absent or out-of-range persisted index falls back to index 0.
    /// `None` only when the snapshot has no records.
    pub fn effective_active_index(&self) -> Option<usize> {
        if self.records.is_empty() {
            return None;
        }
        match self.active_index {
            Some(index) if index < self.records.len() => Some(index),
            _ => Some(0),
        }
    }

    /// Grouping metadata captured with the records.
    pub fn groups(&self) -> &[TabGroup] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::record::{RecordId, RecordPayload};

    fn make_record(id: u64) -> PersistedRecord {
        PersistedRecord::new(
            RecordId::new(id),
            format!("https://example.com/{}", id),
            RecordPayload::new(b"state".to_vec()),
        )
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::new(Vec::new(), None, Vec::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.effective_active_index(), None);
    }

    #[test]
    fn test_active_index_in_range() {
        let snapshot = Snapshot::new(vec![make_record(1), make_record(2)], Some(1), Vec::new());
        assert_eq!(snapshot.active_index(), Some(1));
        assert_eq!(snapshot.effective_active_index(), Some(1));
    }

    #[test]
    fn test_active_index_out_of_range_falls_back_to_zero() {
        let snapshot = Snapshot::new(vec![make_record(1), make_record(2)], Some(9), Vec::new());
        assert_eq!(snapshot.active_index(), Some(9));
        assert_eq!(snapshot.effective_active_index(), Some(0));
    }

    #[test]
    fn test_absent_active_index_falls_back_to_zero() {
        let snapshot = Snapshot::new(vec![make_record(1)], None, Vec::new());
        assert_eq!(snapshot.effective_active_index(), Some(0));
    }

    #[test]
    fn test_records_keep_insertion_order() {
        let snapshot = Snapshot::new(
            vec![make_record(3), make_record(1), make_record(2)],
            None,
            Vec::new(),
        );
        let ids: Vec<u64> = snapshot.records().iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
