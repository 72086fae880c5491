//! Incremental session-restore subsystem
//!
//! Restores a window's persisted records into live objects in bounded
//! batches, without blocking the owning event loop and without restoring
//! any record twice.
//!
//! # Episode lifecycle
//!
//! 1. A coordinator is created against a registered episode
//! 2. The external loader delivers the snapshot (before or after `start`)
//! 3. Batch steps of at most [`BATCH_SIZE`] records run as queued tasks
//! 4. Targeted restores may jump ahead of the batch cursor at any time
//! 5. The episode ends in exactly one of `Finished` or `Cancelled`
//!
//! Per-record progress and lifecycle reach the owner only through the
//! [`RestoreObserver`] delegate.

mod coordinator;
mod driver;
mod factory;
mod observer;
mod phase;

pub use coordinator::{RestoreCoordinator, RestoreTask, BATCH_SIZE};
pub use driver::run_until_idle;
pub use factory::{MaterializedRecord, RecordFactory};
pub use observer::{RestoreDetails, RestoreObserver};
pub use phase::RestorePhase;
