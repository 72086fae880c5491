//! CLI command implementations
//!
//! Both commands are thin drivers over the library: `inspect` only reads
//! the manifest; `replay` runs a real restore episode through the
//! coordinator and task queue and reports what happened.

use std::path::Path;

use serde::Serialize;

use crate::observability::{log_event, Event};
use crate::restore::{
    run_until_idle, MaterializedRecord, RecordFactory, RestoreCoordinator, RestoreDetails,
    RestoreObserver,
};
use crate::scheduler::TaskQueue;
use crate::session::{PersistedRecord, SessionManifest};

use super::args::Command;
use super::errors::CliResult;

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Inspect { session } => inspect(&session),
        Command::Replay {
            session,
            restore_active,
            target_url,
        } => replay(&session, restore_active, target_url.as_deref()),
    }
}

#[derive(Debug, Serialize)]
struct InspectSummary {
    captured_at: String,
    records: usize,
    restorable: usize,
    unrestorable: usize,
    active_index: Option<usize>,
    effective_active_index: Option<usize>,
    groups: usize,
}

/// Summarize a session manifest without restoring anything
pub fn inspect(session: &Path) -> CliResult<()> {
    let manifest = SessionManifest::load(session)?;
    log_event(
        Event::ManifestLoaded,
        &[("records", &manifest.records.len().to_string())],
    );

    let captured_at = manifest.captured_at.to_rfc3339();
    let snapshot = manifest.into_snapshot()?;

    let restorable = snapshot
        .records()
        .iter()
        .filter(|r| r.payload.is_usable())
        .count();

    let summary = InspectSummary {
        captured_at,
        records: snapshot.len(),
        restorable,
        unrestorable: snapshot.len() - restorable,
        active_index: snapshot.active_index(),
        effective_active_index: snapshot.effective_active_index(),
        groups: snapshot.groups().len(),
    };

    print_json(&summary)
}

/// Factory used by replay: every usable record materializes.
struct ReplayFactory;

impl RecordFactory for ReplayFactory {
    fn create_frozen(
        &mut self,
        record: &PersistedRecord,
        _index: usize,
    ) -> Option<MaterializedRecord> {
        Some(MaterializedRecord {
            id: record.id,
            url: record.url.clone(),
        })
    }
}

#[derive(Default)]
struct ReplayObserver {
    details: usize,
    finished: bool,
    cancelled: bool,
}

impl RestoreObserver for ReplayObserver {
    fn on_details_read(&mut self, _details: &RestoreDetails) {
        self.details += 1;
    }

    fn on_finished(&mut self) {
        self.finished = true;
    }

    fn on_cancelled(&mut self) {
        self.cancelled = true;
    }
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    records: usize,
    restored: usize,
    dropped: usize,
    finished: bool,
    cancelled: bool,
}

/// Drive a full restore episode over a session manifest
pub fn replay(session: &Path, restore_active: bool, target_url: Option<&str>) -> CliResult<()> {
    let manifest = SessionManifest::load(session)?;
    log_event(
        Event::ManifestLoaded,
        &[("records", &manifest.records.len().to_string())],
    );

    let snapshot = manifest.into_snapshot()?;
    let total = snapshot.len();

    let mut queue = TaskQueue::new();
    let episode = queue.register();
    let mut coordinator = RestoreCoordinator::new(episode);
    let mut factory = ReplayFactory;
    let mut observer = ReplayObserver::default();

    coordinator.on_snapshot_loaded(snapshot, &mut factory, &mut observer, &mut queue);

    if let Some(url) = target_url {
        coordinator.restore_by_url(url, &mut factory, &mut observer);
    }

    coordinator.start(restore_active, &mut factory, &mut observer, &mut queue);
    run_until_idle(&mut coordinator, &mut queue, &mut factory, &mut observer);

    let summary = ReplaySummary {
        records: total,
        restored: observer.details,
        dropped: total - observer.details,
        finished: observer.finished,
        cancelled: observer.cancelled,
    };

    print_json(&summary)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| super::errors::CliError::io_error(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
