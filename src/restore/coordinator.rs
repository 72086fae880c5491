//! Incremental restore coordinator
//!
//! Drives one restore episode: turning a delivered snapshot back into live
//! records in bounded batches, with out-of-band targeted restores and
//! caller-initiated cancellation.
//!
//! # Execution model
//!
//! Everything runs on one logical thread. The coordinator never loops over
//! the whole snapshot in place: each batch step examines at most
//! [`BATCH_SIZE`] records and then posts a continuation task, so other
//! pending work (a cancel call, a targeted restore) can interleave between
//! batches. Collaborators are passed into every entry point by the caller;
//! the coordinator owns nothing but its own state and the snapshot.
//!
//! # Guarantees
//!
//! - The cursor only advances forward; no index is examined twice
//! - Each record id reaches the factory at most once
//! - The snapshot is released exactly once, on completion or cancellation
//! - `on_finished` and `on_cancelled` each fire at most once per episode,
//!   and never both
//! - Every deferred continuation checks for cancellation before any side
//!   effect

use std::collections::HashSet;

use crate::observability::{log_event, Event, Logger};
use crate::scheduler::{EpisodeId, Scheduler};
use crate::session::{PersistedRecord, RecordId, Snapshot};

use super::factory::RecordFactory;
use super::observer::{RestoreDetails, RestoreObserver};
use super::phase::RestorePhase;

/// Maximum records examined by one scheduled batch step.
pub const BATCH_SIZE: usize = 5;

/// Unit of deferred restore work, processed by the owning event loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RestoreTask {
    /// Examine the next batch of records at the cursor.
    RestoreBatch,
    /// Deliver the exactly-once completion notification.
    DeliverCompletion,
}

/// State machine for one restore episode.
///
/// Created per episode; receives at most one snapshot; discarded after
/// reaching a terminal phase. A fresh coordinator is required for a
/// subsequent episode.
pub struct RestoreCoordinator {
    phase: RestorePhase,
    episode: EpisodeId,
    snapshot: Option<Snapshot>,
    cursor: usize,
    ignored: HashSet<RecordId>,
    restore_active_immediately: bool,
    cancel_delivered: bool,
}

impl RestoreCoordinator {
    /// Creates a coordinator bound to a registered episode.
    pub fn new(episode: EpisodeId) -> Self {
        Self {
            phase: RestorePhase::Empty,
            episode,
            snapshot: None,
            cursor: 0,
            ignored: HashSet::new(),
            restore_active_immediately: false,
            cancel_delivered: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    /// Episode this coordinator posts tasks under.
    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    /// Records the batch pass has not yet examined.
    pub fn pending(&self) -> usize {
        self.snapshot
            .as_ref()
            .map(|s| s.len().saturating_sub(self.cursor))
            .unwrap_or(0)
    }

    /// Delivers the loaded snapshot. Called exactly once by the loader.
    ///
    /// If restoration was requested before the snapshot arrived, it begins
    /// here. If cancellation won the race instead, the snapshot is
    /// released on the spot and the deferred notification fires.
    pub fn on_snapshot_loaded<F, O, S>(
        &mut self,
        snapshot: Snapshot,
        factory: &mut F,
        observer: &mut O,
        scheduler: &mut S,
    ) where
        F: RecordFactory,
        O: RestoreObserver,
        S: Scheduler<RestoreTask>,
    {
        match self.phase {
            RestorePhase::Empty => {
                log_event(
                    Event::SnapshotLoaded,
                    &[("records", &snapshot.len().to_string())],
                );
                self.snapshot = Some(snapshot);
                self.phase = RestorePhase::Loaded;
            }
            RestorePhase::RestoreOnceLoaded => {
                log_event(
                    Event::SnapshotLoaded,
                    &[("records", &snapshot.len().to_string())],
                );
                self.snapshot = Some(snapshot);
                self.phase = RestorePhase::Loaded;
                let restore_active = self.restore_active_immediately;
                self.start(restore_active, factory, observer, scheduler);
            }
            RestorePhase::Cancelled => {
                drop(snapshot);
                self.deliver_cancellation(observer);
            }
            RestorePhase::Loaded
            | RestorePhase::Restoring
            | RestorePhase::Finishing
            | RestorePhase::Finished => {
                Logger::warn(
                    Event::ContractViolation.as_str(),
                    &[
                        ("entry_point", "on_snapshot_loaded"),
                        ("phase", self.phase.as_str()),
                    ],
                );
            }
        }
    }

    /// Begins restoration.
    ///
    /// Before the snapshot has arrived this latches the request and
    /// returns; restoration then begins automatically on load. Once a
    /// pass is already progressing (or over), the call is a no-op.
    ///
    /// With `restore_active_immediately` set, the record at the active
    /// index is materialized synchronously before the first batch task is
    /// posted; an absent or out-of-range active index falls back to the
    /// first record.
    pub fn start<F, O, S>(
        &mut self,
        restore_active_immediately: bool,
        factory: &mut F,
        observer: &mut O,
        scheduler: &mut S,
    ) where
        F: RecordFactory,
        O: RestoreObserver,
        S: Scheduler<RestoreTask>,
    {
        match self.phase {
            RestorePhase::Empty => {
                self.restore_active_immediately = restore_active_immediately;
                self.phase = RestorePhase::RestoreOnceLoaded;
                log_event(Event::RestoreDeferred, &[]);
            }
            RestorePhase::Loaded => {
                self.phase = RestorePhase::Restoring;
                let record_count = self.snapshot.as_ref().map_or(0, Snapshot::len);
                log_event(
                    Event::RestoreStart,
                    &[
                        ("records", &record_count.to_string()),
                        ("restore_active", if restore_active_immediately { "true" } else { "false" }),
                    ],
                );

                if record_count == 0 {
                    self.phase = RestorePhase::Finishing;
                    scheduler.post(self.episode, RestoreTask::DeliverCompletion);
                    return;
                }

                if restore_active_immediately {
                    self.restore_active_record(factory, observer);
                }
                scheduler.post(self.episode, RestoreTask::RestoreBatch);
            }
            RestorePhase::RestoreOnceLoaded
            | RestorePhase::Restoring
            | RestorePhase::Cancelled
            | RestorePhase::Finishing
            | RestorePhase::Finished => {
                // No double start.
            }
        }
    }

    /// Aborts the episode. Idempotent once winding down.
    ///
    /// With a snapshot owned, it is released and the owner notified
    /// synchronously; before the snapshot has arrived, both are deferred
    /// to `on_snapshot_loaded`.
    pub fn cancel<O: RestoreObserver>(&mut self, observer: &mut O) {
        if self.phase.is_winding_down() {
            return;
        }

        let had_snapshot = self.snapshot.take().is_some();
        self.phase = RestorePhase::Cancelled;

        if had_snapshot {
            self.deliver_cancellation(observer);
        }
    }

    /// Immediately materializes the first record at or past the cursor
    /// that is not already handled and satisfies `predicate`.
    ///
    /// At most one record is restored per call; the batch pass will skip
    /// it later. No match, no snapshot, or a winding-down phase is a
    /// silent no-op. Already-passed records are never revisited.
    pub fn restore_by_predicate<P, F, O>(&mut self, predicate: P, factory: &mut F, observer: &mut O)
    where
        P: Fn(&PersistedRecord) -> bool,
        F: RecordFactory,
        O: RestoreObserver,
    {
        if self.phase.is_winding_down() {
            return;
        }
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };

        let active_index = snapshot.effective_active_index();
        let found = snapshot
            .records()
            .iter()
            .enumerate()
            .skip(self.cursor)
            .find(|(_, record)| !self.ignored.contains(&record.id) && predicate(record))
            .map(|(index, _)| index);

        if let Some(index) = found {
            let record = &snapshot.records()[index];
            self.ignored.insert(record.id);
            Logger::trace(
                Event::TargetedRestore.as_str(),
                &[
                    ("index", &index.to_string()),
                    ("record_id", &record.id.to_string()),
                ],
            );
            self.resolve_record(record, index, active_index, factory, observer);
        }

        self.snapshot = Some(snapshot);
    }

    /// Targeted restore of the first pending record with this URL.
    pub fn restore_by_url<F, O>(&mut self, url: &str, factory: &mut F, observer: &mut O)
    where
        F: RecordFactory,
        O: RestoreObserver,
    {
        self.restore_by_predicate(|record| record.url == url, factory, observer);
    }

    /// Targeted restore of the record with this id.
    pub fn restore_by_id<F, O>(&mut self, id: RecordId, factory: &mut F, observer: &mut O)
    where
        F: RecordFactory,
        O: RestoreObserver,
    {
        self.restore_by_predicate(move |record| record.id == id, factory, observer);
    }

    /// Drops a not-yet-restored record from the batch pass: its live
    /// counterpart was closed before restoration reached it. A no-op for
    /// records already handled and in winding-down phases.
    pub fn discard_by_id(&mut self, id: RecordId) {
        if self.phase.is_winding_down() || self.snapshot.is_none() {
            return;
        }
        self.ignored.insert(id);
    }

    /// Dispatches one unit of deferred work taken from the queue.
    pub fn run_task<F, O, S>(
        &mut self,
        task: RestoreTask,
        factory: &mut F,
        observer: &mut O,
        scheduler: &mut S,
    ) where
        F: RecordFactory,
        O: RestoreObserver,
        S: Scheduler<RestoreTask>,
    {
        match task {
            RestoreTask::RestoreBatch => self.restore_batch(factory, observer, scheduler),
            RestoreTask::DeliverCompletion => self.deliver_completion(observer),
        }
    }

    fn restore_active_record<F, O>(&mut self, factory: &mut F, observer: &mut O)
    where
        F: RecordFactory,
        O: RestoreObserver,
    {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };

        if let Some(index) = snapshot.effective_active_index() {
            let record = &snapshot.records()[index];
            // A targeted restore may already have handled the active record.
            if !self.ignored.contains(&record.id) {
                self.resolve_record(record, index, Some(index), factory, observer);
            }
        }

        self.snapshot = Some(snapshot);
    }

    fn restore_batch<F, O, S>(&mut self, factory: &mut F, observer: &mut O, scheduler: &mut S)
    where
        F: RecordFactory,
        O: RestoreObserver,
        S: Scheduler<RestoreTask>,
    {
        // Cancellation is level-triggered: every deferred continuation
        // checks before any side effect.
        if self.phase == RestorePhase::Cancelled {
            return;
        }
        if self.phase != RestorePhase::Restoring {
            return;
        }
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };

        let active_index = snapshot.effective_active_index();
        let total = snapshot.len();

        let mut examined = 0;
        while examined < BATCH_SIZE && self.cursor < total {
            let index = self.cursor;
            self.cursor += 1;
            examined += 1;

            let record = &snapshot.records()[index];
            if self.ignored.contains(&record.id) {
                continue;
            }
            self.resolve_record(record, index, active_index, factory, observer);
        }

        let more_remaining = self.cursor < total;
        self.snapshot = Some(snapshot);

        if more_remaining {
            scheduler.post(self.episode, RestoreTask::RestoreBatch);
        } else {
            self.phase = RestorePhase::Finishing;
            scheduler.post(self.episode, RestoreTask::DeliverCompletion);
        }
    }

    fn deliver_completion<O: RestoreObserver>(&mut self, observer: &mut O) {
        if self.phase == RestorePhase::Cancelled {
            return;
        }
        if self.phase != RestorePhase::Finishing {
            return;
        }

        self.phase = RestorePhase::Finished;
        self.snapshot = None;
        log_event(Event::RestoreFinished, &[("episode", &self.episode.to_string())]);
        observer.on_finished();
    }

    fn deliver_cancellation<O: RestoreObserver>(&mut self, observer: &mut O) {
        if self.cancel_delivered {
            return;
        }
        self.cancel_delivered = true;
        log_event(Event::RestoreCancelled, &[("episode", &self.episode.to_string())]);
        observer.on_cancelled();
    }

    /// Materializes one record and reports the outcome.
    ///
    /// Unusable payloads are dropped without an event (tolerated content
    /// loss). The id enters the ignore set immediately before the factory
    /// is handed the record, so no path can materialize it again.
    fn resolve_record<F, O>(
        &mut self,
        record: &PersistedRecord,
        index: usize,
        active_index: Option<usize>,
        factory: &mut F,
        observer: &mut O,
    ) where
        F: RecordFactory,
        O: RestoreObserver,
    {
        if !record.payload.is_usable() {
            Logger::trace(
                Event::RecordDropped.as_str(),
                &[
                    ("index", &index.to_string()),
                    ("reason", "unusable_payload"),
                    ("record_id", &record.id.to_string()),
                ],
            );
            return;
        }

        self.ignored.insert(record.id);

        let Some(materialized) = factory.create_frozen(record, index) else {
            Logger::trace(
                Event::RecordDropped.as_str(),
                &[
                    ("index", &index.to_string()),
                    ("reason", "factory_refused"),
                    ("record_id", &record.id.to_string()),
                ],
            );
            return;
        };

        let is_active = active_index == Some(index);
        let details = RestoreDetails {
            index,
            id: record.id,
            url: materialized.url,
            is_standard_active_index: is_active && !record.is_incognito,
            is_incognito_active_index: is_active && record.is_incognito,
            is_incognito: record.is_incognito,
            from_merge: record.from_merge,
        };

        Logger::trace(
            Event::RecordRestored.as_str(),
            &[
                ("index", &index.to_string()),
                ("record_id", &record.id.to_string()),
            ],
        );
        observer.on_details_read(&details);
    }
}
