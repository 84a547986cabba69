//! Tests for identity resolution and fallback ordering.

use std::sync::Arc;

use rstest::rstest;

use super::{FallbackChain, IdentityError, IdentityResolver, ValueProvider};
use crate::ci::{CiEnvironment, CiVariables, MapEnvironment};
use crate::local::{CommitSha, InspectionError, MockRepositoryInspector};

const PR_SHA: &str = "1111111111111111111111111111111111111111";
const COMMIT_SHA: &str = "2222222222222222222222222222222222222222";
const LOCAL_SHA: &str = "3333333333333333333333333333333333333333";

fn travis(pairs: &[(&str, &str)]) -> CiEnvironment {
    CiEnvironment::new(
        Arc::new(MapEnvironment::from_pairs(pairs.iter().copied())),
        CiVariables::travis(),
    )
}

/// Inspector that must never be asked anything.
fn untouched_inspector() -> MockRepositoryInspector {
    let mut inspector = MockRepositoryInspector::new();
    inspector.expect_full_commit_hash().never();
    inspector.expect_branch_name().never();
    inspector
}

fn local_inspector(sha_calls: usize, branch_calls: usize) -> MockRepositoryInspector {
    let mut inspector = MockRepositoryInspector::new();
    inspector
        .expect_full_commit_hash()
        .times(sha_calls)
        .returning(|| CommitSha::parse(LOCAL_SHA).map_err(|_| InspectionError::UnbornHead));
    inspector
        .expect_branch_name()
        .times(branch_calls)
        .returning(|| Ok("local-branch".to_owned()));
    inspector
}

fn resolver(pairs: &[(&str, &str)], inspector: MockRepositoryInspector) -> IdentityResolver {
    IdentityResolver::new(&travis(pairs), Arc::new(inspector))
}

#[tokio::test]
async fn pull_request_values_win_over_plain_ci_values() {
    let resolver = resolver(
        &[
            ("TRAVIS_PULL_REQUEST_SHA", PR_SHA),
            ("TRAVIS_COMMIT", COMMIT_SHA),
            ("TRAVIS_PULL_REQUEST_BRANCH", "feature-x"),
            ("TRAVIS_BRANCH", "main"),
        ],
        untouched_inspector(),
    );

    let identity = resolver.resolve(None).await.expect("identity should resolve");

    assert_eq!(identity.sha.as_str(), PR_SHA);
    assert_eq!(identity.branch, "feature-x");
}

#[tokio::test]
async fn commit_sha_is_used_without_consulting_local_checkout() {
    let resolver = resolver(
        &[
            ("TRAVIS_PULL_REQUEST_SHA", ""),
            ("TRAVIS_COMMIT", COMMIT_SHA),
            ("TRAVIS_BRANCH", "main"),
        ],
        untouched_inspector(),
    );

    let sha = resolver.resolve_sha().await.expect("sha should resolve");

    assert_eq!(sha.as_str(), COMMIT_SHA);
}

#[tokio::test]
async fn local_checkout_fills_in_missing_ci_values() {
    let resolver = resolver(&[], local_inspector(1, 1));

    let identity = resolver.resolve(None).await.expect("identity should resolve");

    assert_eq!(identity.sha.as_str(), LOCAL_SHA);
    assert_eq!(identity.branch, "local-branch");
}

#[tokio::test]
async fn fields_fall_back_independently() {
    // CI supplies the branch but not the commit: only the commit lookup may
    // reach the local checkout.
    let resolver = resolver(&[("TRAVIS_BRANCH", "main")], local_inspector(1, 0));

    let identity = resolver.resolve(None).await.expect("identity should resolve");

    assert_eq!(identity.sha.as_str(), LOCAL_SHA);
    assert_eq!(identity.branch, "main");
}

#[rstest]
#[case::override_beats_ci(Some("release/1.2"), "release/1.2")]
#[case::blank_override_ignored(Some("  "), "feature-x")]
#[case::no_override(None, "feature-x")]
#[tokio::test]
async fn explicit_branch_takes_precedence(
    #[case] branch_override: Option<&str>,
    #[case] expected: &str,
) {
    let resolver = resolver(
        &[("TRAVIS_PULL_REQUEST_BRANCH", "feature-x")],
        untouched_inspector(),
    );

    let branch = resolver
        .resolve_branch(branch_override)
        .await
        .expect("branch should resolve");

    assert_eq!(branch, expected);
}

#[tokio::test]
async fn exhausted_sha_chain_names_every_source() {
    let mut inspector = MockRepositoryInspector::new();
    inspector
        .expect_full_commit_hash()
        .times(1)
        .returning(|| Err(InspectionError::NotARepository));
    let resolver = resolver(&[], inspector);

    let error = resolver.resolve_sha().await.expect_err("sha should be missing");

    assert_eq!(
        error,
        IdentityError::NoCommitSha {
            tried: vec![
                "$TRAVIS_PULL_REQUEST_SHA".to_owned(),
                "$TRAVIS_COMMIT".to_owned(),
                "local HEAD commit".to_owned(),
            ],
        }
    );
}

#[tokio::test]
async fn exhausted_branch_chain_is_an_error() {
    let mut inspector = MockRepositoryInspector::new();
    inspector
        .expect_branch_name()
        .times(1)
        .returning(|| Err(InspectionError::DetachedHead));
    let resolver = resolver(&[], inspector);

    let error = resolver
        .resolve_branch(None)
        .await
        .expect_err("branch should be missing");

    assert!(matches!(error, IdentityError::NoBranch { tried } if tried.len() == 3));
}

#[tokio::test]
async fn abbreviated_ci_sha_is_rejected_rather_than_skipped() {
    let resolver = resolver(&[("TRAVIS_COMMIT", "2222222")], untouched_inspector());

    let error = resolver.resolve_sha().await.expect_err("short sha should fail");

    assert_eq!(
        error,
        IdentityError::InvalidCommitSha {
            source_name: "$TRAVIS_COMMIT".to_owned(),
            value: "2222222".to_owned(),
        }
    );
}

struct Fixed(Option<&'static str>);

#[async_trait::async_trait]
impl ValueProvider for Fixed {
    fn describe(&self) -> String {
        format!("fixed {:?}", self.0)
    }

    async fn provide(&self) -> Option<String> {
        self.0.map(ToOwned::to_owned)
    }
}

#[tokio::test]
async fn chain_skips_blank_values_and_trims_winner() {
    let chain = FallbackChain::new()
        .then(Fixed(None))
        .then(Fixed(Some("   ")))
        .then(Fixed(Some(" winner ")))
        .then(Fixed(Some("never reached")));

    let resolved = chain.resolve().await.expect("a value should win");

    assert_eq!(resolved.value, "winner");
    assert_eq!(resolved.source, r#"fixed Some(" winner ")"#);
}
