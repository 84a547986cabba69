//! Capability-typed value providers and the ordered chain that tries them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::ci::{CiEnvironment, CiValue};
use crate::local::RepositoryInspector;

/// One candidate source for an identity value.
///
/// Blank values count as absent so the chain moves on to the next source.
#[async_trait]
pub trait ValueProvider: Send + Sync {
    /// Names the source for logs and error messages.
    fn describe(&self) -> String;

    /// Returns the value, or `None` when this source has nothing to offer.
    async fn provide(&self) -> Option<String>;
}

/// A value CI exported as an environment variable.
#[derive(Debug, Clone)]
pub struct CiValueProvider {
    env: CiEnvironment,
    value: CiValue,
}

impl CiValueProvider {
    /// Reads `value` from `env`.
    #[must_use]
    pub const fn new(env: CiEnvironment, value: CiValue) -> Self {
        Self { env, value }
    }
}

#[async_trait]
impl ValueProvider for CiValueProvider {
    fn describe(&self) -> String {
        format!("${}", self.env.key(self.value))
    }

    async fn provide(&self) -> Option<String> {
        self.env.value(self.value)
    }
}

/// HEAD commit of the local checkout.
#[derive(Clone)]
pub struct LocalCommitProvider {
    inspector: Arc<dyn RepositoryInspector>,
}

impl LocalCommitProvider {
    /// Asks `inspector` for HEAD.
    #[must_use]
    pub fn new(inspector: Arc<dyn RepositoryInspector>) -> Self {
        Self { inspector }
    }
}

#[async_trait]
impl ValueProvider for LocalCommitProvider {
    fn describe(&self) -> String {
        "local HEAD commit".to_owned()
    }

    async fn provide(&self) -> Option<String> {
        match self.inspector.full_commit_hash().await {
            Ok(sha) => Some(sha.as_str().to_owned()),
            Err(error) => {
                warn!(%error, "local commit lookup failed");
                None
            }
        }
    }
}

/// Branch HEAD is attached to in the local checkout.
#[derive(Clone)]
pub struct LocalBranchProvider {
    inspector: Arc<dyn RepositoryInspector>,
}

impl LocalBranchProvider {
    /// Asks `inspector` for the current branch.
    #[must_use]
    pub fn new(inspector: Arc<dyn RepositoryInspector>) -> Self {
        Self { inspector }
    }
}

#[async_trait]
impl ValueProvider for LocalBranchProvider {
    fn describe(&self) -> String {
        "local HEAD branch".to_owned()
    }

    async fn provide(&self) -> Option<String> {
        match self.inspector.branch_name().await {
            Ok(branch) => Some(branch),
            Err(error) => {
                warn!(%error, "local branch lookup failed");
                None
            }
        }
    }
}

/// A value found by a [`FallbackChain`], tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The value.
    pub value: String,
    /// Description of the provider that supplied it.
    pub source: String,
}

/// Providers tried strictly in order; the first non-blank value wins.
///
/// Later providers are never consulted once an earlier one answers.
#[derive(Default)]
pub struct FallbackChain {
    providers: Vec<Box<dyn ValueProvider>>,
}

impl FallbackChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a lower-priority provider.
    #[must_use]
    pub fn then(mut self, provider: impl ValueProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Describes every provider, highest priority first.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.providers.iter().map(|provider| provider.describe()).collect()
    }

    /// Walks the chain until a provider answers.
    pub async fn resolve(&self) -> Option<Resolved> {
        for provider in &self.providers {
            let source = provider.describe();
            match provider.provide().await {
                Some(value) if !value.trim().is_empty() => {
                    debug!(%source, "identity value resolved");
                    return Some(Resolved {
                        value: value.trim().to_owned(),
                        source,
                    });
                }
                _ => debug!(%source, "no value; falling back"),
            }
        }
        None
    }
}
