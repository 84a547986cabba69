//! Timing tests for the throttle plus debounce scheduler.
//!
//! All tests run on Tokio's paused clock, so sleeps advance virtual time
//! deterministically.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};

use super::{SchedulerTiming, StatusScheduler};
use crate::error::{CallSite, ReportError};
use crate::github::GitHubError;
use crate::local::CommitSha;
use crate::status::{ResolvedStatusRequest, StatusRequest, StatusState, StatusWrite};
use crate::telemetry::test_support::RecordingSink;
use crate::telemetry::{DispatchPath, TelemetryEvent};

const SHA: &str = "feedfacefeedfacefeedfacefeedfacefeedface";

/// Writer that records when each write happened and what it carried.
struct RecordingWriter {
    start: Instant,
    fail: bool,
    writes: Mutex<Vec<(u64, ResolvedStatusRequest)>>,
}

impl RecordingWriter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            fail: false,
            writes: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            fail: true,
            writes: Mutex::new(Vec::new()),
        })
    }

    fn writes(&self) -> Vec<(u64, ResolvedStatusRequest)> {
        self.writes.lock().expect("writes lock").clone()
    }

    /// `(elapsed ms, description)` pairs in completion order.
    fn timeline(&self) -> Vec<(u64, String)> {
        self.writes()
            .into_iter()
            .map(|(at, request)| (at, request.request.description.unwrap_or_default()))
            .collect()
    }
}

#[async_trait]
impl StatusWrite for RecordingWriter {
    async fn write(
        &self,
        request: &ResolvedStatusRequest,
        called_from: CallSite,
    ) -> Result<(), ReportError> {
        let elapsed = Instant::now().duration_since(self.start);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).expect("elapsed fits in u64");
        self.writes
            .lock()
            .expect("writes lock")
            .push((elapsed_ms, request.clone()));
        if self.fail {
            return Err(ReportError::remote_write(
                "create status",
                called_from,
                GitHubError::Network {
                    message: "connection reset".to_owned(),
                },
            ));
        }
        Ok(())
    }
}

fn request(label: &str) -> ResolvedStatusRequest {
    StatusRequest::new(StatusState::Pending)
        .with_description(label)
        .resolve(CommitSha::parse(SHA).expect("sha"), "main".to_owned())
}

fn scheduler(
    writer: Arc<RecordingWriter>,
    timing: SchedulerTiming,
) -> (StatusScheduler, Arc<RecordingSink>) {
    let telemetry = Arc::new(RecordingSink::default());
    (
        StatusScheduler::new(writer, timing, telemetry.clone()),
        telemetry,
    )
}

fn timeline(expected: &[(u64, &str)]) -> Vec<(u64, String)> {
    expected
        .iter()
        .map(|(at, label)| (*at, (*label).to_owned()))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn isolated_submit_is_written_by_both_paths() {
    let writer = RecordingWriter::new();
    let (scheduler, telemetry) = scheduler(writer.clone(), SchedulerTiming::default());

    scheduler.submit(request("only"), CallSite::capture());
    sleep(Duration::from_secs(10)).await;

    assert_eq!(writer.timeline(), timeline(&[(0, "only"), (2500, "only")]));
    assert_eq!(telemetry.dispatch_count(DispatchPath::Throttle), 1);
    assert_eq!(telemetry.dispatch_count(DispatchPath::Debounce), 1);
}

#[tokio::test(start_paused = true)]
async fn throttle_fires_once_per_window_with_the_request_current_at_window_start() {
    // A longer quiet period keeps the debounce silent until the burst ends.
    let timing = SchedulerTiming {
        throttle_window: Duration::from_millis(5000),
        debounce_quiet: Duration::from_millis(3000),
    };
    let writer = RecordingWriter::new();
    let (scheduler, telemetry) = scheduler(writer.clone(), timing);

    let submits = 6_u64;
    for index in 0..submits {
        scheduler.submit(request(&format!("#{index}")), CallSite::capture());
        sleep(Duration::from_millis(2500)).await;
    }
    sleep(Duration::from_secs(10)).await;

    // 6 submits at 2.5s spacing cover 15s, so ceil(15 / 5) throttle writes.
    assert_eq!(telemetry.dispatch_count(DispatchPath::Throttle), 3);
    assert_eq!(
        writer.timeline(),
        timeline(&[(0, "#0"), (5000, "#2"), (10_000, "#4"), (15_500, "#5")])
    );
}

#[tokio::test(start_paused = true)]
async fn debounce_delivers_the_last_request_once_after_the_burst() {
    let writer = RecordingWriter::new();
    let (scheduler, telemetry) = scheduler(writer.clone(), SchedulerTiming::default());

    for index in 0..10 {
        scheduler.submit(request(&format!("#{index}")), CallSite::capture());
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_secs(10)).await;

    // Last submit at 900ms; quiet period 2500ms.
    assert_eq!(writer.timeline(), timeline(&[(0, "#0"), (3400, "#9")]));
    assert_eq!(telemetry.dispatch_count(DispatchPath::Debounce), 1);
}

#[tokio::test(start_paused = true)]
async fn identical_requests_produce_identical_writes() {
    let writer = RecordingWriter::new();
    let (scheduler, _telemetry) = scheduler(writer.clone(), SchedulerTiming::default());

    scheduler.submit(request("same"), CallSite::capture());
    sleep(Duration::from_secs(6)).await;
    scheduler.submit(request("same"), CallSite::capture());
    sleep(Duration::from_secs(6)).await;

    let writes = writer.writes();
    assert_eq!(writes.len(), 4);
    assert!(writes.iter().all(|(_, written)| *written == request("same")));
}

#[tokio::test(start_paused = true)]
async fn failed_writes_are_reported_per_path_and_do_not_stop_delivery() {
    let writer = RecordingWriter::failing();
    let (scheduler, telemetry) = scheduler(writer.clone(), SchedulerTiming::default());

    scheduler.submit(request("a"), CallSite::capture());
    sleep(Duration::from_secs(6)).await;
    scheduler.submit(request("b"), CallSite::capture());
    sleep(Duration::from_secs(6)).await;

    assert_eq!(writer.writes().len(), 4);
    let failures: Vec<_> = telemetry
        .take()
        .into_iter()
        .filter_map(|event| match event {
            TelemetryEvent::ScheduledWriteFailed { path, .. } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(
        failures,
        vec![
            DispatchPath::Throttle,
            DispatchPath::Debounce,
            DispatchPath::Throttle,
            DispatchPath::Debounce,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn flush_delivers_pending_request_without_waiting() {
    let writer = RecordingWriter::new();
    let (scheduler, _telemetry) = scheduler(writer.clone(), SchedulerTiming::default());

    scheduler.submit(request("first"), CallSite::capture());
    scheduler.submit(request("final"), CallSite::capture());
    scheduler.flush().await;

    assert_eq!(writer.timeline(), timeline(&[(0, "first"), (0, "final")]));
    assert!(!scheduler.has_pending());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(writer.writes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn dispose_cancels_pending_debounce_and_ignores_later_submits() {
    let writer = RecordingWriter::new();
    let (scheduler, _telemetry) = scheduler(writer.clone(), SchedulerTiming::default());

    scheduler.submit(request("before"), CallSite::capture());
    scheduler.dispose();
    scheduler.submit(request("after"), CallSite::capture());
    sleep(Duration::from_secs(10)).await;

    assert_eq!(writer.timeline(), timeline(&[(0, "before")]));
    assert!(!scheduler.has_pending());
}

#[test]
fn submit_outside_a_runtime_is_dropped() {
    let writer = RecordingWriter::new();
    let (scheduler, _telemetry) = scheduler(writer.clone(), SchedulerTiming::default());

    scheduler.submit(request("lost"), CallSite::capture());

    assert!(writer.writes().is_empty());
    assert!(!scheduler.has_pending());
}
