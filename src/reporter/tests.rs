//! Tests for the reporter entry points.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;

use super::{CiReporter, ReporterParts};
use crate::ci::{CiEnvironment, CiVariables, MapEnvironment};
use crate::error::ReportError;
use crate::gate::{ActivationGate, AuthContext, Gated, SkipReason};
use crate::github::{
    GitHubError, MockCommentGateway, MockPullRequestGateway, MockStatusGateway,
    PersonalAccessToken, PullRequestNumber, RepositoryLocator,
};
use crate::identity::IdentityError;
use crate::local::MockRepositoryInspector;
use crate::persistence::NoopStatusAudit;
use crate::status::{SchedulerTiming, StatusContext, StatusRequest, StatusState};
use crate::telemetry::test_support::RecordingSink;
use crate::telemetry::{DispatchPath, TelemetryEvent};

const SHA: &str = "c0ffeec0ffeec0ffeec0ffeec0ffeec0ffeec0ff";

const CI_VARS: &[(&str, &str)] = &[
    ("TRAVIS", "true"),
    ("TRAVIS_COMMIT", SHA),
    ("TRAVIS_BRANCH", "main"),
    ("TRAVIS_JOB_ID", "123456"),
];

struct Harness {
    statuses: MockStatusGateway,
    pull_requests: MockPullRequestGateway,
    comments: MockCommentGateway,
    telemetry: Arc<RecordingSink>,
}

impl Harness {
    fn new() -> Self {
        Self {
            statuses: MockStatusGateway::new(),
            pull_requests: MockPullRequestGateway::new(),
            comments: MockCommentGateway::new(),
            telemetry: Arc::new(RecordingSink::default()),
        }
    }

    fn build(self, env: &[(&str, &str)], authenticated: bool) -> (CiReporter, Arc<RecordingSink>) {
        let ci = CiEnvironment::new(
            Arc::new(MapEnvironment::from_pairs(env.iter().copied())),
            CiVariables::travis(),
        );
        let auth = if authenticated {
            AuthContext::with_token(PersonalAccessToken::new("ghp_test").expect("token"))
        } else {
            AuthContext::anonymous()
        };
        let mut inspector = MockRepositoryInspector::new();
        inspector.expect_full_commit_hash().never();
        inspector.expect_branch_name().never();
        let telemetry = self.telemetry;

        let reporter = CiReporter::new(ReporterParts {
            gate: ActivationGate::new(ci.is_ci(), auth, telemetry.clone()),
            ci,
            locator: RepositoryLocator::from_server_url("https://github.com", "acme", "widgets")
                .expect("locator"),
            ci_host: "travis-ci.com".to_owned(),
            inspector: Arc::new(inspector),
            statuses: Arc::new(self.statuses),
            pull_requests: Arc::new(self.pull_requests),
            comments: Arc::new(self.comments),
            context: StatusContext::default(),
            audit: Arc::new(NoopStatusAudit),
            timing: SchedulerTiming::default(),
            telemetry: telemetry.clone(),
        });
        (reporter, telemetry)
    }
}

fn pr(value: u64) -> PullRequestNumber {
    PullRequestNumber::new(value).expect("pr number")
}

#[rstest]
#[case::outside_ci(&[("TRAVIS_COMMIT", SHA)], true, SkipReason::NotCi)]
#[case::without_token(CI_VARS, false, SkipReason::Unauthenticated)]
#[tokio::test(start_paused = true)]
async fn closed_gate_makes_every_write_a_silent_no_op(
    #[case] env: &[(&str, &str)],
    #[case] authenticated: bool,
    #[case] reason: SkipReason,
) {
    let mut harness = Harness::new();
    harness.statuses.expect_create_status().never();
    harness.comments.expect_create_issue_comment().never();
    let (reporter, _telemetry) = harness.build(env, authenticated);

    let update = reporter
        .update_status(StatusRequest::new(StatusState::Pending), None)
        .await;
    let comment = reporter.post_comment(pr(1), "hello").await;
    let terminal = reporter.report_error("boom").await;
    reporter.flush().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(update, Ok(Gated::Skipped(reason)));
    assert_eq!(comment, Ok(Gated::Skipped(reason)));
    assert_eq!(terminal, Ok(Gated::Skipped(reason)));
}

#[tokio::test]
async fn report_error_links_to_the_ci_job() {
    let mut harness = Harness::new();
    harness
        .statuses
        .expect_create_status()
        .withf(|locator, sha, status| {
            locator.full_name() == "acme/widgets"
                && sha == SHA
                && status.state == "error"
                && status.description.as_deref() == Some("integration shard 3 crashed")
                && status.target_url.as_deref()
                    == Some("https://travis-ci.com/acme/widgets/jobs/123456")
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let (reporter, telemetry) = harness.build(CI_VARS, true);

    let outcome = reporter
        .report_error("integration shard 3 crashed")
        .await
        .expect("report should succeed");

    assert_eq!(outcome, Gated::Ran(()));
    assert_eq!(telemetry.dispatch_count(DispatchPath::Direct), 1);
}

#[tokio::test]
async fn failed_error_report_is_loud() {
    let mut harness = Harness::new();
    harness.statuses.expect_create_status().returning(|_, _, _| {
        Err(GitHubError::Authentication {
            message: "Bad credentials".to_owned(),
        })
    });
    let (reporter, telemetry) = harness.build(CI_VARS, true);

    let error = reporter
        .report_error("boom")
        .await
        .expect_err("report should fail");

    assert!(matches!(error, ReportError::RemoteWrite { .. }));
    assert!(telemetry.take().iter().any(|event| matches!(
        event,
        TelemetryEvent::TerminalReportFailed { message } if message.contains("Bad credentials")
    )));
}

#[tokio::test(start_paused = true)]
async fn update_status_is_delivered_by_both_scheduler_paths() {
    let mut harness = Harness::new();
    harness
        .statuses
        .expect_create_status()
        .withf(|_, sha, status| sha == SHA && status.state == "pending")
        .times(2)
        .returning(|_, _, _| Ok(()));
    let (reporter, telemetry) = harness.build(CI_VARS, true);

    let outcome = reporter
        .update_status(
            StatusRequest::new(StatusState::Pending).with_description("running"),
            None,
        )
        .await
        .expect("update should queue");
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(outcome, Gated::Ran(()));
    assert_eq!(telemetry.dispatch_count(DispatchPath::Throttle), 1);
    assert_eq!(telemetry.dispatch_count(DispatchPath::Debounce), 1);
}

#[tokio::test]
async fn publish_status_writes_once_without_scheduling() {
    let mut harness = Harness::new();
    harness
        .statuses
        .expect_create_status()
        .withf(|_, _, status| status.state == "success")
        .times(1)
        .returning(|_, _, _| Ok(()));
    let (reporter, telemetry) = harness.build(CI_VARS, true);

    let outcome = reporter
        .publish_status(StatusRequest::new(StatusState::Success), Some("release"))
        .await
        .expect("publish should succeed");

    assert_eq!(outcome, Gated::Ran(()));

    assert_eq!(telemetry.dispatch_count(DispatchPath::Direct), 1);
    assert_eq!(telemetry.dispatch_count(DispatchPath::Throttle), 0);
}

#[tokio::test]
async fn unresolvable_identity_is_returned_and_nothing_is_written() {
    let mut harness = Harness::new();
    harness.statuses.expect_create_status().never();
    // CI with a token, but neither commit nor local checkout available.
    let env: &[(&str, &str)] = &[("TRAVIS", "true"), ("TRAVIS_BRANCH", "main")];
    let ci = CiEnvironment::new(
        Arc::new(MapEnvironment::from_pairs(env.iter().copied())),
        CiVariables::travis(),
    );
    let mut inspector = MockRepositoryInspector::new();
    inspector
        .expect_full_commit_hash()
        .returning(|| Err(crate::local::InspectionError::NotARepository));
    let telemetry = harness.telemetry.clone();
    let reporter = CiReporter::new(ReporterParts {
        gate: ActivationGate::new(
            true,
            AuthContext::with_token(PersonalAccessToken::new("ghp_test").expect("token")),
            telemetry.clone(),
        ),
        ci,
        locator: RepositoryLocator::from_server_url("https://github.com", "acme", "widgets")
            .expect("locator"),
        ci_host: "travis-ci.com".to_owned(),
        inspector: Arc::new(inspector),
        statuses: Arc::new(harness.statuses),
        pull_requests: Arc::new(harness.pull_requests),
        comments: Arc::new(harness.comments),
        context: StatusContext::default(),
        audit: Arc::new(NoopStatusAudit),
        timing: SchedulerTiming::default(),
        telemetry,
    });

    let error = reporter
        .update_status(StatusRequest::new(StatusState::Pending), None)
        .await
        .expect_err("identity should be missing");

    assert!(matches!(
        error,
        ReportError::IdentityResolution(IdentityError::NoCommitSha { .. })
    ));
}

#[tokio::test]
async fn reads_are_not_gated() {
    let mut harness = Harness::new();
    harness
        .pull_requests
        .expect_pull_request_base()
        .times(1)
        .returning(|_, _| {
            Ok(Some(crate::github::PullRequestBase {
                base_ref: "develop".to_owned(),
            }))
        });
    // Outside CI and anonymous: reads still run.
    let (reporter, _telemetry) = harness.build(&[], false);

    let base = reporter
        .pull_request_base_branch(pr(42))
        .await
        .expect("read should run");

    assert_eq!(base, "origin/develop");
}
