//! Application telemetry events and sinks.
//!
//! Status delivery is mostly fire-and-forget: nobody awaits a scheduled
//! write, so its outcome has to travel through a side channel. Telemetry
//! events are that channel, alongside `tracing` output. The binary records
//! them to stderr as JSON lines; embedders can plug in their own sink.

use std::io;

use serde::{Deserialize, Serialize};

/// Which delivery path produced a status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPath {
    /// Leading write of a throttle window.
    Throttle,
    /// Trailing write after the debounce quiet period.
    Debounce,
    /// Unscheduled write issued straight from an entry point.
    Direct,
}

impl DispatchPath {
    /// Returns a stable lowercase label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Throttle => "throttle",
            Self::Debounce => "debounce",
            Self::Direct => "direct",
        }
    }
}

/// A structured telemetry event emitted by beacon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Records the current database schema version after migrations apply.
    SchemaVersionRecorded {
        /// Diesel migration version string (e.g. `20261001000000`).
        schema_version: String,
    },

    /// A status write reached GitHub successfully.
    StatusDispatched {
        /// Delivery path that issued the write.
        path: DispatchPath,
        /// Status state sent.
        state: String,
        /// Commit the status was attached to.
        sha: String,
    },

    /// A scheduled status write failed with nobody awaiting it.
    ScheduledWriteFailed {
        /// Delivery path that issued the write.
        path: DispatchPath,
        /// Rendered error.
        message: String,
    },

    /// A best-effort side operation failed without affecting the caller.
    NonFatalError {
        /// Operation that failed.
        operation: String,
        /// Rendered error.
        message: String,
    },

    /// An entry point was skipped by the activation gate.
    GateSkipped {
        /// Entry point that was skipped.
        operation: String,
        /// Why the gate stayed closed.
        reason: String,
    },

    /// The terminal error status could not be reported.
    TerminalReportFailed {
        /// Rendered error.
        message: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for CI log inspection and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Telemetry helpers shared by unit and integration tests.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::{Mutex, PoisonError};

    use super::{DispatchPath, TelemetryEvent, TelemetrySink};

    /// Sink that keeps every event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingSink {
        /// Drains and returns the recorded events.
        pub fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .drain(..)
                .collect()
        }

        /// Returns a copy of the recorded events without draining them.
        pub fn snapshot(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Counts successful dispatches issued through `path`.
        pub fn dispatch_count(&self, path: DispatchPath) -> usize {
            self.snapshot()
                .iter()
                .filter(|event| {
                    matches!(
                        event,
                        TelemetryEvent::StatusDispatched { path: recorded, .. } if *recorded == path
                    )
                })
                .count()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
        }
    }
}
