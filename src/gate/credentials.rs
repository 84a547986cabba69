//! Credential sources read once at startup.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::{debug, warn};

use crate::ci::EnvironmentProbe;

/// Supplies a GitHub token, if one is available.
///
/// Absence is not an error: it only disables authenticated operations.
pub trait CredentialSource: Send + Sync {
    /// Returns the token, or `None` when this source has none.
    fn load_token(&self) -> Option<String>;
}

/// A token supplied directly, typically from configuration.
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Wraps an optional token value.
    #[must_use]
    pub const fn new(token: Option<String>) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.0.is_some() { "<set>" } else { "<unset>" };
        f.debug_tuple("StaticToken").field(&state).finish()
    }
}

impl CredentialSource for StaticToken {
    fn load_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A token stored in a local file, one token per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFile {
    path: Utf8PathBuf,
}

impl TokenFile {
    /// Reads the token from `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file location.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns `$XDG_CONFIG_HOME/beacon/github-token`, falling back to
    /// `$HOME/.config/beacon/github-token`.
    #[must_use]
    pub fn default_location(env: &dyn EnvironmentProbe) -> Option<Utf8PathBuf> {
        let non_blank = |key: &str| env.get(key).filter(|value| !value.trim().is_empty());

        let config_home = non_blank("XDG_CONFIG_HOME")
            .map(Utf8PathBuf::from)
            .or_else(|| non_blank("HOME").map(|home| Utf8PathBuf::from(home).join(".config")))?;

        Some(config_home.join("beacon").join("github-token"))
    }

    fn read(&self) -> std::io::Result<String> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = self.path.file_name().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
        })?;

        Dir::open_ambient_dir(parent, ambient_authority())?.read_to_string(file_name)
    }
}

impl CredentialSource for TokenFile {
    fn load_token(&self) -> Option<String> {
        match self.read() {
            Ok(contents) => Some(contents.trim().to_owned()).filter(|token| !token.is_empty()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path, "no token file");
                None
            }
            Err(error) => {
                warn!(path = %self.path, %error, "token file could not be read");
                None
            }
        }
    }
}
