//! Activation policy shared by every public entry point.
//!
//! Two independent checks decide whether an operation touches GitHub at
//! all: the process must run under CI, and a token must have been loaded.
//! When either fails the operation returns [`Gated::Skipped`] without error
//! and without side effects, so the same build scripts run unchanged on
//! developer machines and credential-less forks.

mod credentials;

use std::sync::Arc;

use tracing::debug;

pub use credentials::{CredentialSource, StaticToken, TokenFile};

use crate::github::PersonalAccessToken;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Why the gate stayed closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The process is not running under the recognised CI environment.
    NotCi,
    /// No credential was available at startup.
    Unauthenticated,
}

impl SkipReason {
    /// Returns a stable label for logs and telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotCi => "not_ci",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a gated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Gated<T> {
    /// The gate was open and the operation ran.
    Ran(T),
    /// The gate was closed; nothing happened.
    Skipped(SkipReason),
}

impl<T> Gated<T> {
    /// Returns true when the operation was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns the value when the operation ran.
    #[must_use]
    pub fn ran(self) -> Option<T> {
        match self {
            Self::Ran(value) => Some(value),
            Self::Skipped(_) => None,
        }
    }

    /// Maps the value of an operation that ran.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gated<U> {
        match self {
            Self::Ran(value) => Gated::Ran(f(value)),
            Self::Skipped(reason) => Gated::Skipped(reason),
        }
    }
}

/// Authentication state, fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<PersonalAccessToken>,
}

impl AuthContext {
    /// Takes the first valid token any source supplies.
    ///
    /// Sources are consulted in order; a blank value falls through to the
    /// next source.
    #[must_use]
    pub fn load(sources: &[&dyn CredentialSource]) -> Self {
        let token = sources.iter().find_map(|source| {
            source
                .load_token()
                .and_then(|raw| PersonalAccessToken::new(raw).ok())
        });
        Self { token }
    }

    /// Builds an authenticated context from a known token.
    #[must_use]
    pub const fn with_token(token: PersonalAccessToken) -> Self {
        Self { token: Some(token) }
    }

    /// Builds a context with no credential.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// Returns true when a token was loaded.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the loaded token.
    #[must_use]
    pub const fn token(&self) -> Option<&PersonalAccessToken> {
        self.token.as_ref()
    }
}

/// The CI and authentication checks every entry point runs first.
#[derive(Clone)]
pub struct ActivationGate {
    in_ci: bool,
    auth: AuthContext,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for ActivationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationGate")
            .field("in_ci", &self.in_ci)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ActivationGate {
    /// Creates a gate from the two independent checks.
    #[must_use]
    pub fn new(in_ci: bool, auth: AuthContext, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            in_ci,
            auth,
            telemetry,
        }
    }

    /// Returns the authentication state.
    #[must_use]
    pub const fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Returns true when both checks pass.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.in_ci && self.auth.is_authenticated()
    }

    /// Checks both gates for `operation`, reporting a skip when closed.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when either check fails. This is not a
    /// failure; callers turn it into [`Gated::Skipped`].
    pub fn admit(&self, operation: &str) -> Result<(), SkipReason> {
        let reason = if !self.in_ci {
            SkipReason::NotCi
        } else if !self.auth.is_authenticated() {
            SkipReason::Unauthenticated
        } else {
            return Ok(());
        };

        debug!(operation, %reason, "gate closed; skipping");
        self.telemetry.record(TelemetryEvent::GateSkipped {
            operation: operation.to_owned(),
            reason: reason.as_str().to_owned(),
        });
        Err(reason)
    }
}
