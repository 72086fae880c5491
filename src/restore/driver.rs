//! Cooperative event-loop driver
//!
//! The queue is drained on the single logical thread that owns the
//! coordinator; each task is dispatched back into it. Real embedders
//! interleave other work between tasks; this driver is the degenerate
//! loop used by the CLI, tests, and owners with nothing else pending.

use crate::scheduler::TaskQueue;

use super::coordinator::{RestoreCoordinator, RestoreTask};
use super::factory::RecordFactory;
use super::observer::RestoreObserver;

/// Drains the queue until no live task remains, then releases the
/// coordinator's episode once it has reached a terminal phase (making any
/// stale task for it dead in the queue's live set).
pub fn run_until_idle<F, O>(
    coordinator: &mut RestoreCoordinator,
    queue: &mut TaskQueue<RestoreTask>,
    factory: &mut F,
    observer: &mut O,
) where
    F: RecordFactory,
    O: RestoreObserver,
{
    while let Some((episode, task)) = queue.take_next() {
        debug_assert_eq!(episode, coordinator.episode());
        coordinator.run_task(task, factory, observer, queue);
    }

    if coordinator.phase().is_terminal() {
        queue.release(coordinator.episode());
    }
}
