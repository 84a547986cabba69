//! Builds a [`CiReporter`] from configuration and the process environment.

use std::env;
use std::sync::Arc;

use beacon::ci::{CiEnvironment, ProcessEnvironment};
use beacon::gate::{ActivationGate, AuthContext, CredentialSource, StaticToken};
use beacon::github::OctocrabGateway;
use beacon::local::{Git2Inspector, NoCheckout, RepositoryInspector};
use beacon::persistence::{NoopStatusAudit, SqliteStatusAudit, StatusAuditStore};
use beacon::reporter::{CiReporter, ReporterParts};
use beacon::telemetry::{StderrJsonlTelemetrySink, TelemetrySink};
use beacon::{BeaconConfig, ReportError};
use tracing::debug;

use super::migrations::map_persistence_error;

/// Assembles the reporter the CLI operations run against.
///
/// The token is loaded once here: configuration first, then the token file.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] when the repository is not
/// configured or the GitHub client cannot be built, and the mapped
/// persistence error when the audit database URL is unusable.
pub fn build_reporter(config: &BeaconConfig) -> Result<CiReporter, ReportError> {
    let locator = config.require_repository_locator()?;
    let ci = CiEnvironment::from_process();
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(StderrJsonlTelemetrySink);

    let configured = StaticToken::new(config.resolve_token());
    let token_file = config.token_file(&ProcessEnvironment);
    let mut sources: Vec<&dyn CredentialSource> = vec![&configured];
    if let Some(file) = &token_file {
        sources.push(file);
    }
    let auth = AuthContext::load(&sources);
    let gate = ActivationGate::new(ci.is_ci(), auth, Arc::clone(&telemetry));

    let gateway = Arc::new(
        OctocrabGateway::for_repository(gate.auth().token(), &locator).map_err(|error| {
            ReportError::Configuration {
                message: error.to_string(),
            }
        })?,
    );

    Ok(CiReporter::new(ReporterParts {
        gate,
        ci,
        locator,
        ci_host: config.ci_host.clone(),
        inspector: local_inspector(),
        statuses: gateway.clone(),
        pull_requests: gateway.clone(),
        comments: gateway,
        context: config.status_context(),
        audit: audit_store(config)?,
        timing: config.scheduler_timing(),
        telemetry,
    }))
}

fn local_inspector() -> Arc<dyn RepositoryInspector> {
    let discovered = env::current_dir()
        .map_err(|error| error.to_string())
        .and_then(|dir| Git2Inspector::discover(&dir).map_err(|error| error.to_string()));
    let Ok(inspector) = discovered.inspect_err(|reason| {
        debug!(%reason, "no local checkout; relying on CI variables");
    }) else {
        return Arc::new(NoCheckout);
    };
    Arc::new(inspector)
}

fn audit_store(config: &BeaconConfig) -> Result<Arc<dyn StatusAuditStore>, ReportError> {
    let Some(database_url) = config.database_url.as_deref() else {
        return Ok(Arc::new(NoopStatusAudit));
    };
    let store = SqliteStatusAudit::new(database_url).map_err(|error| map_persistence_error(&error))?;
    Ok(Arc::new(store))
}
