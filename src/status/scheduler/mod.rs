//! Throttle plus debounce delivery of in-progress statuses.
//!
//! Every [`StatusScheduler::submit`] is offered to two independent paths
//! that share only the downstream writer:
//!
//! - the [`Throttle`] path writes the submitted request at once when no
//!   throttle write happened in the last window, and drops it otherwise;
//! - the [`Debounce`] path keeps the latest request and writes it once no
//!   submit has arrived for the quiet period.
//!
//! An isolated submit is therefore written twice. Writes are not retried;
//! failures go to `tracing` and telemetry.

mod debounce;
mod throttle;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

pub use debounce::Debounce;
pub use throttle::Throttle;

use crate::error::CallSite;
use crate::telemetry::{DispatchPath, TelemetryEvent, TelemetrySink};

use super::model::ResolvedStatusRequest;
use super::writer::StatusWrite;

/// Default throttle window.
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(5000);

/// Default debounce quiet period.
pub const DEFAULT_DEBOUNCE_QUIET: Duration = Duration::from_millis(2500);

/// Timing of the two delivery paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTiming {
    /// Throttle window.
    pub throttle_window: Duration,
    /// Debounce quiet period.
    pub debounce_quiet: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            throttle_window: DEFAULT_THROTTLE_WINDOW,
            debounce_quiet: DEFAULT_DEBOUNCE_QUIET,
        }
    }
}

type Scheduled = (ResolvedStatusRequest, CallSite);

struct SchedulerState {
    throttle: Throttle,
    debounce: Debounce<Scheduled>,
    in_flight: Vec<JoinHandle<()>>,
}

impl SchedulerState {
    fn track(&mut self, handle: JoinHandle<()>) {
        self.in_flight.retain(|task| !task.is_finished());
        self.in_flight.push(handle);
    }
}

struct Shared {
    writer: Arc<dyn StatusWrite>,
    telemetry: Arc<dyn TelemetrySink>,
    state: Mutex<SchedulerState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn dispatch(&self, path: DispatchPath, request: ResolvedStatusRequest, site: CallSite) {
        match self.writer.write(&request, site).await {
            Ok(()) => {
                debug!(path = path.as_str(), sha = %request.sha, "scheduled status delivered");
                self.telemetry.record(TelemetryEvent::StatusDispatched {
                    path,
                    state: request.request.state.as_str().to_owned(),
                    sha: request.sha.as_str().to_owned(),
                });
            }
            Err(error) => {
                warn!(path = path.as_str(), %error, "scheduled status write failed");
                self.telemetry.record(TelemetryEvent::ScheduledWriteFailed {
                    path,
                    message: error.to_string(),
                });
            }
        }
    }
}

/// Process-wide delivery policy for frequent status updates.
///
/// Owned by the composition root and shared by reference. Clones share the
/// same state.
#[derive(Clone)]
pub struct StatusScheduler {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for StatusScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusScheduler").finish_non_exhaustive()
    }
}

impl StatusScheduler {
    /// Creates a scheduler delivering through `writer`.
    #[must_use]
    pub fn new(
        writer: Arc<dyn StatusWrite>,
        timing: SchedulerTiming,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                writer,
                telemetry,
                state: Mutex::new(SchedulerState {
                    throttle: Throttle::new(timing.throttle_window),
                    debounce: Debounce::new(timing.debounce_quiet),
                    in_flight: Vec::new(),
                }),
            }),
        }
    }

    /// Offers `request` to both delivery paths and returns immediately.
    ///
    /// Must be called from within a Tokio runtime; outside one the request
    /// is logged and dropped.
    pub fn submit(&self, request: ResolvedStatusRequest, called_from: CallSite) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(sha = %request.sha, "no async runtime; status update dropped");
            return;
        };

        let mut state = self.shared.lock();

        if state.throttle.offer(Instant::now()) {
            debug!(sha = %request.sha, state = %request.request.state, "throttle window open");
            let shared = Arc::clone(&self.shared);
            let throttled = request.clone();
            let handle = runtime.spawn(async move {
                shared
                    .dispatch(DispatchPath::Throttle, throttled, called_from)
                    .await;
            });
            state.track(handle);
        } else {
            debug!(sha = %request.sha, "inside throttle window; dropped by throttle");
        }

        let quiet = state.debounce.quiet();
        let Some(generation) = state.debounce.arm((request, called_from)) else {
            debug!("scheduler disposed; submit ignored");
            return;
        };
        let shared = Arc::clone(&self.shared);
        let timer_runtime = runtime.clone();
        let timer = runtime.spawn(async move {
            tokio::time::sleep(quiet).await;
            let mut timer_state = shared.lock();
            let Some((latest, site)) = timer_state.debounce.fire(generation) else {
                return;
            };
            debug!(sha = %latest.sha, "debounce quiet period elapsed");
            let writer_shared = Arc::clone(&shared);
            let handle = timer_runtime.spawn(async move {
                writer_shared
                    .dispatch(DispatchPath::Debounce, latest, site)
                    .await;
            });
            timer_state.track(handle);
        });
        state.debounce.set_timer(timer);
    }

    /// Waits for in-flight writes, then delivers any pending debounced
    /// request without waiting for its quiet period.
    ///
    /// The scheduler never calls this on its own; short-lived processes that
    /// must not lose the final update call it before exiting.
    pub async fn flush(&self) {
        self.await_in_flight().await;

        let pending = self.shared.lock().debounce.take_pending();
        if let Some((request, site)) = pending {
            self.shared
                .dispatch(DispatchPath::Debounce, request, site)
                .await;
        }

        // A timer that fired while the first batch was awaited tracked a
        // write of its own.
        self.await_in_flight().await;
    }

    async fn await_in_flight(&self) {
        let in_flight = std::mem::take(&mut self.shared.lock().in_flight);
        for task in in_flight {
            if let Err(error) = task.await {
                warn!(%error, "scheduled status task did not complete");
            }
        }
    }

    /// Cancels the pending debounce timer and ignores later submits.
    ///
    /// Writes already started still run to completion.
    pub fn dispose(&self) {
        let mut state = self.shared.lock();
        state.throttle.dispose();
        state.debounce.dispose();
        debug!("status scheduler disposed");
    }

    /// Returns true while a debounced request waits for its quiet period.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.shared.lock().debounce.has_pending()
    }
}

#[cfg(test)]
mod tests;
