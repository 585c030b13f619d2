//! error
//!
//! Crate error taxonomy and the engine error adapter.
//!
//! # Taxonomy
//!
//! Every failure a caller can see is one of the [`Error`] variants.
//! Failures originating in the engine are wrapped exactly once, at the
//! point of detection, carrying the operation context and the engine's
//! message verbatim as the error source. Cancellation is its own kind,
//! distinct from transfer failure, so callers can tell a user-initiated
//! abort from a genuine error.
//!
//! # Call-site context
//!
//! The adapter functions are `#[track_caller]` and stamp the adapting
//! call's source location into the wrapped error, so a failure can be
//! attributed without re-entering the engine.
//!
//! # Contract
//!
//! The adapter must only be invoked when a failure actually occurred.
//! Handing it an absent signal is a programming error in this crate and
//! yields [`Error::NilError`] rather than being treated as success.

use std::panic::Location;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::{EngineError, EngineErrorCode};

/// Errors from repository client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument was rejected before reaching the engine.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the input
        reason: String,
    },

    /// An operation was invoked on an unopened (or closed) handle.
    #[error("{operation}: repository handle is not initialized")]
    NotInitialized {
        /// The operation that was attempted
        operation: &'static str,
    },

    /// The engine could not open the repository layout.
    #[error("{}: failed to open repository at '{}': {}", .location, .path.display(), .source)]
    OpenFailed {
        /// The path that was handed to the engine
        path: PathBuf,
        /// Where the failure was adapted
        location: &'static Location<'static>,
        /// The engine's diagnostic, verbatim
        source: EngineError,
    },

    /// A refspec could not be resolved to a checksum.
    #[error("{location}: failed to resolve '{refspec}': {source}")]
    ResolveFailed {
        /// The refspec that was being resolved
        refspec: String,
        /// Where the failure was adapted
        location: &'static Location<'static>,
        /// The engine's diagnostic, verbatim
        source: EngineError,
    },

    /// Persisting the repository configuration failed.
    #[error("{location}: failed to write repository config: {source}")]
    ConfigWriteFailed {
        /// Where the failure was adapted
        location: &'static Location<'static>,
        /// The engine's diagnostic, verbatim
        source: EngineError,
    },

    /// A pull transfer failed.
    #[error("{location}: pull from '{remote}' failed: {source}")]
    PullFailed {
        /// The remote the transfer targeted
        remote: String,
        /// Where the failure was adapted
        location: &'static Location<'static>,
        /// The engine's diagnostic, verbatim
        source: EngineError,
    },

    /// The operation observed a triggered cancellation token.
    #[error("{operation} cancelled")]
    Cancelled {
        /// The operation that was cancelled
        operation: &'static str,
    },

    /// The error adapter was invoked without an error.
    ///
    /// This is a contract violation inside the crate, never a condition
    /// a correct caller can produce.
    #[error("{location}: error adapter invoked without an error")]
    NilError {
        /// Where the violation was detected
        location: &'static Location<'static>,
    },
}

impl Error {
    /// Whether the underlying engine failure was "does not exist".
    ///
    /// On the `allow_missing = false` resolution path, both a missing
    /// refspec and a genuine engine failure surface as
    /// [`Error::ResolveFailed`]; this distinguishes the two without
    /// another engine round-trip.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.engine_source(),
            Some(e) if e.code() == EngineErrorCode::NotFound
        )
    }

    /// The wrapped engine error, if this kind carries one.
    pub fn engine_source(&self) -> Option<&EngineError> {
        match self {
            Error::OpenFailed { source, .. }
            | Error::ResolveFailed { source, .. }
            | Error::ConfigWriteFailed { source, .. }
            | Error::PullFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Adapt an engine failure from an `open` call.
#[track_caller]
pub(crate) fn adapt_open(path: &Path, signal: Option<EngineError>) -> Error {
    let location = Location::caller();
    match signal {
        None => Error::NilError { location },
        Some(e) if e.code() == EngineErrorCode::Cancelled => Error::Cancelled { operation: "open" },
        Some(e) => Error::OpenFailed {
            path: path.to_path_buf(),
            location,
            source: e,
        },
    }
}

/// Adapt an engine failure from a `resolve_rev` call.
#[track_caller]
pub(crate) fn adapt_resolve(refspec: &str, signal: Option<EngineError>) -> Error {
    let location = Location::caller();
    match signal {
        None => Error::NilError { location },
        Some(e) if e.code() == EngineErrorCode::Cancelled => Error::Cancelled {
            operation: "resolve_rev",
        },
        Some(e) => Error::ResolveFailed {
            refspec: refspec.to_string(),
            location,
            source: e,
        },
    }
}

/// Adapt an engine failure from a `write_config` call.
#[track_caller]
pub(crate) fn adapt_config_write(signal: Option<EngineError>) -> Error {
    let location = Location::caller();
    match signal {
        None => Error::NilError { location },
        Some(e) if e.code() == EngineErrorCode::Cancelled => Error::Cancelled {
            operation: "write_config",
        },
        Some(e) => Error::ConfigWriteFailed {
            location,
            source: e,
        },
    }
}

/// Adapt an engine failure from a `pull` call.
#[track_caller]
pub(crate) fn adapt_pull(remote: &str, signal: Option<EngineError>) -> Error {
    let location = Location::caller();
    match signal {
        None => Error::NilError { location },
        Some(e) if e.code() == EngineErrorCode::Cancelled => Error::Cancelled { operation: "pull" },
        Some(e) => Error::PullFailed {
            remote: remote.to_string(),
            location,
            source: e,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_signal_is_a_contract_violation() {
        let err = adapt_pull("origin", None);
        assert!(matches!(err, Error::NilError { .. }));
    }

    #[test]
    fn engine_message_is_preserved_verbatim() {
        let engine_err = EngineError::new(EngineErrorCode::Network, "connection reset by peer");
        let err = adapt_pull("origin", Some(engine_err));
        match &err {
            Error::PullFailed { source, .. } => {
                assert_eq!(source.message(), "connection reset by peer");
            }
            other => panic!("expected PullFailed, got {other:?}"),
        }
        // The rendered message carries remote and diagnostic.
        let rendered = err.to_string();
        assert!(rendered.contains("origin"));
        assert!(rendered.contains("connection reset by peer"));
    }

    #[test]
    fn rendered_message_is_prefixed_with_call_site() {
        let err = adapt_config_write(Some(EngineError::new(EngineErrorCode::Io, "read-only fs")));
        assert!(err.to_string().starts_with(file!()));
    }

    #[test]
    fn cancelled_code_maps_to_cancelled_kind() {
        let err = adapt_pull(
            "origin",
            Some(EngineError::new(EngineErrorCode::Cancelled, "interrupted")),
        );
        assert!(matches!(err, Error::Cancelled { operation: "pull" }));
    }

    #[test]
    fn not_found_is_distinguishable_from_other_failures() {
        let missing = adapt_resolve(
            "main",
            Some(EngineError::new(EngineErrorCode::NotFound, "no such ref")),
        );
        assert!(missing.is_not_found());

        let corrupt = adapt_resolve(
            "main",
            Some(EngineError::new(EngineErrorCode::Corrupt, "bad object")),
        );
        assert!(!corrupt.is_not_found());
        assert!(!Error::NotInitialized { operation: "x" }.is_not_found());
    }
}
