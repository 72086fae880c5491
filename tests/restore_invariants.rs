//! Restore episode invariant tests
//!
//! End-to-end properties of the restore coordinator driven through the
//! public API:
//! - No record is ever restored twice, however batch progression and
//!   targeted restores interleave
//! - Batch-path events arrive in non-decreasing index order
//! - Completion and cancellation each fire exactly once, never both
//! - No scheduled continuation examines more than one batch of records

use tabstore::restore::{
    run_until_idle, MaterializedRecord, RecordFactory, RestoreCoordinator, RestoreDetails,
    RestoreObserver, RestorePhase, RestoreTask, BATCH_SIZE,
};
use tabstore::scheduler::{Scheduler, TaskQueue};
use tabstore::session::{PersistedRecord, RecordId, RecordPayload, Snapshot};

// =============================================================================
// Test Utilities
// =============================================================================

#[derive(Default)]
struct PassthroughFactory {
    created: Vec<RecordId>,
}

impl RecordFactory for PassthroughFactory {
    fn create_frozen(
        &mut self,
        record: &PersistedRecord,
        _index: usize,
    ) -> Option<MaterializedRecord> {
        self.created.push(record.id);
        Some(MaterializedRecord {
            id: record.id,
            url: record.url.clone(),
        })
    }
}

#[derive(Default)]
struct RecordingObserver {
    details: Vec<RestoreDetails>,
    finished: u32,
    cancelled: u32,
}

impl RestoreObserver for RecordingObserver {
    fn on_details_read(&mut self, details: &RestoreDetails) {
        self.details.push(details.clone());
    }

    fn on_finished(&mut self) {
        self.finished += 1;
    }

    fn on_cancelled(&mut self) {
        self.cancelled += 1;
    }
}

fn make_record(id: u64) -> PersistedRecord {
    PersistedRecord::new(
        RecordId::new(id),
        format!("https://example.com/{}", id),
        RecordPayload::new(b"state".to_vec()),
    )
}

fn make_snapshot(count: u64, active_index: Option<usize>) -> Snapshot {
    Snapshot::new((0..count).map(make_record).collect(), active_index, Vec::new())
}

struct Episode {
    queue: TaskQueue<RestoreTask>,
    coordinator: RestoreCoordinator,
    factory: PassthroughFactory,
    observer: RecordingObserver,
}

impl Episode {
    fn new() -> Self {
        let mut queue = TaskQueue::new();
        let episode = queue.register();
        Self {
            queue,
            coordinator: RestoreCoordinator::new(episode),
            factory: PassthroughFactory::default(),
            observer: RecordingObserver::default(),
        }
    }

    fn load(&mut self, snapshot: Snapshot) {
        self.coordinator.on_snapshot_loaded(
            snapshot,
            &mut self.factory,
            &mut self.observer,
            &mut self.queue,
        );
    }

    fn start(&mut self, restore_active: bool) {
        self.coordinator.start(
            restore_active,
            &mut self.factory,
            &mut self.observer,
            &mut self.queue,
        );
    }

    /// Runs one queued task; returns the number of events it emitted.
    fn step(&mut self) -> usize {
        let before = self.observer.details.len();
        if let Some((_, task)) = self.queue.take_next() {
            self.coordinator.run_task(
                task,
                &mut self.factory,
                &mut self.observer,
                &mut self.queue,
            );
        }
        self.observer.details.len() - before
    }

    fn drain(&mut self) {
        run_until_idle(
            &mut self.coordinator,
            &mut self.queue,
            &mut self.factory,
            &mut self.observer,
        );
    }

    fn restored_indices(&self) -> Vec<usize> {
        self.observer.details.iter().map(|d| d.index).collect()
    }
}

// =============================================================================
// No double restoration
// =============================================================================

/// Each record id appears in at most one event, however batch progression
/// interleaves with targeted restores.
#[test]
fn test_no_double_restoration_under_interleaving() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(20, Some(4)));

    ep.coordinator
        .restore_by_url("https://example.com/11", &mut ep.factory, &mut ep.observer);
    ep.start(true);
    ep.step();
    ep.coordinator
        .restore_by_id(RecordId::new(11), &mut ep.factory, &mut ep.observer);
    ep.coordinator
        .restore_by_id(RecordId::new(17), &mut ep.factory, &mut ep.observer);
    ep.step();
    ep.coordinator
        .restore_by_id(RecordId::new(4), &mut ep.factory, &mut ep.observer);
    ep.drain();

    let mut ids: Vec<u64> = ep.observer.details.iter().map(|d| d.id.get()).collect();
    ids.sort_unstable();
    let before = ids.len();
    ids.dedup();
    assert_eq!(ids.len(), before, "a record id was restored twice");

    // Everything was restored exactly once overall.
    assert_eq!(ep.observer.details.len(), 20);
    assert_eq!(ep.factory.created.len(), 20);
}

// =============================================================================
// Forward-only cursor
// =============================================================================

/// Batch-path events arrive in non-decreasing index order across the
/// whole episode (targeted restores are explicitly out-of-band jumps).
#[test]
fn test_batch_events_in_nondecreasing_index_order() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(13, None));
    ep.start(false);
    ep.drain();

    let indices = ep.restored_indices();
    assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(indices.len(), 13);
}

// =============================================================================
// Exactly-once completion and cancellation
// =============================================================================

#[test]
fn test_completion_fires_exactly_once() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(7, None));
    ep.start(false);
    ep.drain();
    ep.drain();

    assert_eq!(ep.observer.finished, 1);
    assert_eq!(ep.observer.cancelled, 0);
    assert_eq!(ep.coordinator.phase(), RestorePhase::Finished);
}

#[test]
fn test_cancellation_fires_exactly_once_after_load() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(7, None));
    ep.start(false);

    ep.coordinator.cancel(&mut ep.observer);
    ep.coordinator.cancel(&mut ep.observer);
    ep.drain();

    assert_eq!(ep.observer.cancelled, 1);
    assert_eq!(ep.observer.finished, 0);
}

/// Cancellation before the snapshot ever arrives is honored the instant
/// the snapshot is delivered; nothing is restored.
#[test]
fn test_cancel_before_snapshot_load() {
    let mut ep = Episode::new();
    ep.coordinator.cancel(&mut ep.observer);
    assert_eq!(ep.observer.cancelled, 0);

    ep.load(make_snapshot(5, None));

    assert_eq!(ep.observer.cancelled, 1);
    assert!(ep.observer.details.is_empty());
    assert_eq!(ep.observer.finished, 0);
    assert_eq!(ep.coordinator.phase(), RestorePhase::Cancelled);
}

// =============================================================================
// Empty snapshot fast path
// =============================================================================

#[test]
fn test_empty_snapshot_completes_without_events() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(0, None));
    ep.start(true);
    ep.drain();

    assert!(ep.observer.details.is_empty());
    assert_eq!(ep.observer.finished, 1);
    assert_eq!(ep.coordinator.phase(), RestorePhase::Finished);
}

// =============================================================================
// Active-first ordering
// =============================================================================

#[test]
fn test_active_record_event_comes_first() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(9, Some(6)));
    ep.start(true);
    ep.drain();

    assert_eq!(ep.restored_indices()[0], 6);
    assert!(ep.observer.details[0].is_standard_active_index);
}

#[test]
fn test_out_of_range_active_index_restores_first_record() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(4, Some(100)));
    ep.start(true);
    ep.drain();

    assert_eq!(ep.restored_indices()[0], 0);
    assert!(ep.observer.details[0].is_standard_active_index);
    assert_eq!(ep.observer.details.len(), 4);
}

// =============================================================================
// Batch bound
// =============================================================================

/// No single scheduled continuation restores more than BATCH_SIZE records.
#[test]
fn test_no_continuation_exceeds_batch_size() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(23, None));
    ep.start(false);

    while !ep.queue.is_idle() {
        let emitted = ep.step();
        assert!(emitted <= BATCH_SIZE);
    }

    assert_eq!(ep.observer.details.len(), 23);
    assert_eq!(ep.observer.finished, 1);
}

// =============================================================================
// Concrete scenarios
// =============================================================================

/// Twelve records, active index 3, start(true): event 1 is index 3, then
/// 0,1,2,4,5,... in order, batches of at most five, one completion.
#[test]
fn test_twelve_records_active_three() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(12, Some(3)));
    ep.start(true);

    // Active restored synchronously, before any batch task ran.
    assert_eq!(ep.restored_indices(), vec![3]);

    while !ep.queue.is_idle() {
        assert!(ep.step() <= BATCH_SIZE);
    }

    assert_eq!(
        ep.restored_indices(),
        vec![3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11]
    );
    assert_eq!(ep.observer.finished, 1);
}

/// Targeted restore by URL before start: one immediate event, and the
/// batch pass later skips that record.
#[test]
fn test_targeted_url_before_start_not_repeated() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(3, None));

    ep.coordinator
        .restore_by_url("https://example.com/1", &mut ep.factory, &mut ep.observer);
    assert_eq!(ep.restored_indices(), vec![1]);

    ep.start(false);
    ep.drain();

    assert_eq!(ep.restored_indices(), vec![1, 0, 2]);
    assert_eq!(ep.observer.finished, 1);
}

// =============================================================================
// Episode liveness
// =============================================================================

/// After the driver releases a terminal episode, further posts for it are
/// refused and stale queued tasks are dead.
#[test]
fn test_released_episode_accepts_no_more_tasks() {
    let mut ep = Episode::new();
    ep.load(make_snapshot(2, None));
    ep.start(false);
    ep.drain();

    let episode = ep.coordinator.episode();
    assert!(!ep.queue.is_live(episode));
    assert!(!ep.queue.post(episode, RestoreTask::RestoreBatch));
    assert!(ep.queue.is_idle());
}

// =============================================================================
// Degraded content
// =============================================================================

/// Unusable payloads are dropped without an event and without preventing
/// completion; the drop consumes batch budget but nothing else.
#[test]
fn test_unusable_payloads_do_not_block_completion() {
    let mut records: Vec<PersistedRecord> = (0..6).map(make_record).collect();
    records[0].payload = RecordPayload::empty();
    records[3].payload = RecordPayload::with_checksum(b"state".to_vec(), 0xBAD_C0DE);

    let mut ep = Episode::new();
    ep.load(Snapshot::new(records, Some(3), Vec::new()));
    ep.start(true);
    ep.drain();

    // Active (index 3) was unusable: dropped, no event for it.
    assert_eq!(ep.restored_indices(), vec![1, 2, 4, 5]);
    assert_eq!(ep.observer.finished, 1);
}
