//! engine::traits
//!
//! Engine trait definition for the external repository engine.
//!
//! # Design
//!
//! The `Engine` trait mirrors the call contract of a content-addressed
//! repository engine: open a repository layout on disk, resolve symbolic
//! revisions, read and persist grouped key-value configuration, and pull
//! refs/objects from a named remote. Every method is synchronous and may
//! block for as long as the underlying operation takes.
//!
//! Failures cross the boundary as an opaque [`EngineError`]: a coarse
//! [`EngineErrorCode`] plus the engine's message text, preserved
//! verbatim. The error adapter in [`crate::error`] wraps that signal
//! exactly once with call-site context; nothing else in the crate
//! inspects engine failures directly.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cairn::engine::{mock::MockEngine, Engine};
//!
//! let mock = MockEngine::new();
//! mock.register_repo("/data/repo");
//! let engine: Arc<dyn Engine> = Arc::new(mock);
//!
//! let token = engine.open(std::path::Path::new("/data/repo")).unwrap();
//! assert!(engine.get_config_value(token, "core", "mode").is_none());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Checksum;
use crate::pull::{CancellationToken, OptionsBag, ProgressSink};

/// Coarse classification of an engine failure.
///
/// The engine reports failures as an opaque message plus one of these
/// codes; the adapter in [`crate::error`] keys off the code when mapping
/// into the crate's error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorCode {
    /// The requested object, ref, remote, or repository does not exist.
    NotFound,

    /// Filesystem-level failure reading or writing the repository.
    Io,

    /// On-disk repository layout is damaged or unreadable.
    Corrupt,

    /// Transfer-level failure talking to a remote.
    Network,

    /// The operation observed a triggered cancellation token.
    Cancelled,

    /// Anything the engine does not classify further.
    Other,
}

/// A failure signal from the engine.
///
/// The message text is the engine's own and is preserved verbatim when
/// adapted into [`crate::error::Error`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EngineError {
    code: EngineErrorCode,
    message: String,
}

impl EngineError {
    /// Create an engine error from a code and message.
    pub fn new(code: EngineErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The failure classification.
    pub fn code(&self) -> EngineErrorCode {
        self.code
    }

    /// The engine's message text, verbatim.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Opaque token naming an engine-side opened repository.
///
/// The engine owns the underlying resource; a token is a non-owning
/// view, only meaningful against the engine instance that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepoToken(pub(crate) u64);

/// A scalar configuration value.
///
/// The engine's persisted configuration is grouped, textually keyed, and
/// scalar-valued. Booleans are what this crate writes today; strings and
/// integers ride along so flag-style editing generalizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Text value.
    Str(String),
}

impl ConfigValue {
    /// Interpret the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Interpret the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

/// Trait for repository engine implementations.
///
/// Implementations must be thread-safe (`Send + Sync`); a single engine
/// instance may be shared by many repository handles. Note that sharing
/// one *handle* still requires external synchronization; see
/// [`crate::repo::Repository`].
///
/// # Configuration model
///
/// `get_config_value` and `set_config_value` operate on the in-memory
/// configuration of an opened repository and cannot fail; only
/// [`Engine::write_config`] touches persistent storage and reports
/// errors. This matches the read/modify/write-back cycle the
/// [`crate::repo::ConfigEditor`] builds on.
pub trait Engine: Send + Sync {
    /// Open the repository layout at `path`.
    ///
    /// The path must already contain the engine's on-disk repository
    /// structure; engines do not create or initialize layouts here.
    fn open(&self, path: &Path) -> Result<RepoToken, EngineError>;

    /// Resolve a refspec (branch, tag, or partial checksum) to its full
    /// canonical checksum.
    ///
    /// With `allow_missing`, an unresolvable refspec is `Ok(None)`
    /// rather than an error; without it, absence is an [`EngineError`]
    /// with code [`EngineErrorCode::NotFound`].
    fn resolve_rev(
        &self,
        repo: RepoToken,
        refspec: &str,
        allow_missing: bool,
    ) -> Result<Option<Checksum>, EngineError>;

    /// Read a scalar from the repository's configuration.
    ///
    /// Returns `None` for an unset key.
    fn get_config_value(&self, repo: RepoToken, group: &str, key: &str) -> Option<ConfigValue>;

    /// Set a scalar in the repository's in-memory configuration.
    ///
    /// The change is not persisted until [`Engine::write_config`].
    fn set_config_value(&self, repo: RepoToken, group: &str, key: &str, value: ConfigValue);

    /// Persist the repository's configuration.
    fn write_config(&self, repo: RepoToken) -> Result<(), EngineError>;

    /// Pull refs and objects from a named remote.
    ///
    /// `options` is an open key-value bag; this crate populates at most
    /// the `override-remote-name` and `refs` entries, but engines may
    /// accept others. Progress updates, when a sink is supplied, are
    /// written concurrently with the transfer; cancellation, when a
    /// token is supplied, is observed cooperatively at engine-defined
    /// intervals and surfaces as an [`EngineError`] with code
    /// [`EngineErrorCode::Cancelled`].
    fn pull(
        &self,
        repo: RepoToken,
        remote: &str,
        options: &OptionsBag,
        progress: Option<&ProgressSink>,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_display_is_verbatim_message() {
        let err = EngineError::new(EngineErrorCode::Io, "disk on fire");
        assert_eq!(err.to_string(), "disk on fire");
        assert_eq!(err.code(), EngineErrorCode::Io);
    }

    #[test]
    fn config_value_accessors() {
        assert_eq!(ConfigValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ConfigValue::Int(7).as_int(), Some(7));
        assert_eq!(ConfigValue::from("x").as_str(), Some("x"));
        assert_eq!(ConfigValue::Bool(true).as_str(), None);
    }

    #[test]
    fn config_value_serializes_as_bare_scalar() {
        let json = serde_json::to_string(&ConfigValue::Bool(true)).unwrap();
        assert_eq!(json, "true");
        let json = serde_json::to_string(&ConfigValue::from("text")).unwrap();
        assert_eq!(json, "\"text\"");
    }
}
