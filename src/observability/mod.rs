//! Observability subsystem for tabstore
//!
//! Structured JSON logging with typed lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only: no side effects on restore execution
//! 2. No async or background threads
//! 3. Deterministic output (sorted keys, one line per event)

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields at INFO severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(Severity::Info, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::SnapshotLoaded, &[("records", "12")]);
        log_event(Event::RestoreFinished, &[]);
    }
}
