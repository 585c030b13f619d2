//! repo::handle
//!
//! The repository handle and its lifecycle.
//!
//! # Lifecycle
//!
//! A handle is either **open** (it holds a live engine token) or
//! **uninitialized** (freshly constructed via [`Repository::unopened`],
//! or explicitly [`Repository::close`]d). Every operation validates the
//! state first: on an uninitialized handle it returns
//! [`Error::NotInitialized`] and touches nothing. There is no
//! null-pointer-style third state.
//!
//! # Ownership
//!
//! The engine owns the underlying repository resource; the handle holds
//! a non-owning token plus a shared reference to the engine that issued
//! it. Dropping or closing a handle never tears down engine state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::types::Checksum;
use crate::error::{adapt_open, adapt_resolve, Error};
use crate::engine::{Engine, RepoToken};
use crate::repo::ConfigEditor;

/// A client handle to one opened repository.
///
/// Operations are synchronous and may block. A single handle is not
/// thread-safe; share work across threads by opening one handle per
/// worker or by synchronizing externally.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use cairn::engine::mock::MockEngine;
/// use cairn::repo::Repository;
///
/// let mock = MockEngine::new();
/// mock.register_repo("/data/repo");
/// mock.commit("/data/repo", "main", b"payload");
///
/// let repo = Repository::open(Arc::new(mock), "/data/repo").unwrap();
/// let checksum = repo.resolve_rev("main", false).unwrap();
/// assert!(checksum.is_some());
/// ```
pub struct Repository {
    engine: Arc<dyn Engine>,
    open: Option<OpenState>,
}

#[derive(Debug)]
struct OpenState {
    token: RepoToken,
    path: PathBuf,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("open", &self.open)
            .finish()
    }
}

impl Repository {
    /// Config group holding repository-wide flags.
    pub const CONFIG_GROUP_CORE: &'static str = "core";

    /// Config key enabling tombstone commits.
    pub const CONFIG_KEY_TOMBSTONE_COMMITS: &'static str = "tombstone-commits";

    /// Open the repository layout at `path`.
    ///
    /// The path must already contain the engine's on-disk structure;
    /// opening never creates or initializes a repository.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `path` is empty (the engine is
    ///   not consulted)
    /// - [`Error::OpenFailed`] carrying the engine's diagnostic if the
    ///   layout is missing or unreadable
    pub fn open(engine: Arc<dyn Engine>, path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument {
                reason: "repository path cannot be empty".into(),
            });
        }

        let token = engine
            .open(path)
            .map_err(|e| adapt_open(path, Some(e)))?;
        log::debug!("opened repository at '{}'", path.display());

        Ok(Self {
            engine,
            open: Some(OpenState {
                token,
                path: path.to_path_buf(),
            }),
        })
    }

    /// Create a handle in the uninitialized state.
    ///
    /// Every operation on it fails with [`Error::NotInitialized`] until
    /// it is replaced by an opened handle. Useful as a placeholder in
    /// caller state machines and in tests.
    pub fn unopened(engine: Arc<dyn Engine>) -> Self {
        Self { engine, open: None }
    }

    /// Whether the handle currently holds an opened repository.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The path this handle was opened on, when open.
    pub fn path(&self) -> Option<&Path> {
        self.open.as_ref().map(|s| s.path.as_path())
    }

    /// Resolve a refspec (branch, tag, or partial checksum) to its full
    /// canonical checksum.
    ///
    /// With `allow_missing`, an unresolvable refspec yields `Ok(None)`:
    /// absent, not failed. Without it, absence surfaces as
    /// [`Error::ResolveFailed`]; use [`Error::is_not_found`] to tell a
    /// missing ref from a genuine engine failure.
    pub fn resolve_rev(
        &self,
        refspec: &str,
        allow_missing: bool,
    ) -> Result<Option<Checksum>, Error> {
        let token = self.require_open("resolve_rev")?;
        self.engine
            .resolve_rev(token, refspec, allow_missing)
            .map_err(|e| adapt_resolve(refspec, Some(e)))
    }

    /// Enable tombstone commits for this repository.
    ///
    /// Tombstone commits record intentional deletions, so a missing
    /// commit can be distinguished from data loss. Reads the
    /// `core.tombstone-commits` flag and persists `true` only if it is
    /// not already set; calling this twice performs exactly one write.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] on an unopened handle
    /// - [`Error::ConfigWriteFailed`] if persisting fails
    pub fn enable_tombstone_commits(&self) -> Result<(), Error> {
        self.require_open("enable_tombstone_commits")?;
        self.config().set_bool_if_changed(
            Self::CONFIG_GROUP_CORE,
            Self::CONFIG_KEY_TOMBSTONE_COMMITS,
            true,
        )
    }

    /// Get an editor over the repository's persisted configuration.
    pub fn config(&self) -> ConfigEditor<'_> {
        ConfigEditor::new(self)
    }

    /// Release this handle's view of the repository.
    ///
    /// The handle returns to the uninitialized state; subsequent
    /// operations fail with [`Error::NotInitialized`]. The engine-side
    /// resource belongs to the engine and is not torn down.
    pub fn close(&mut self) {
        if let Some(state) = self.open.take() {
            log::debug!("closed repository handle for '{}'", state.path.display());
        }
    }

    /// Validate the open state, naming `operation` in the failure.
    pub(crate) fn require_open(&self, operation: &'static str) -> Result<RepoToken, Error> {
        self.open
            .as_ref()
            .map(|s| s.token)
            .ok_or(Error::NotInitialized { operation })
    }

    /// The engine this handle was issued by.
    pub(crate) fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;

    const REPO: &str = "/data/repo";

    fn engine_with_repo() -> Arc<MockEngine> {
        let mock = MockEngine::new();
        mock.register_repo(REPO);
        Arc::new(mock)
    }

    #[test]
    fn open_empty_path_is_invalid_argument_without_engine_call() {
        let mock = engine_with_repo();
        let result = Repository::open(mock.clone(), "");
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert_eq!(mock.open_calls(), 0);
    }

    #[test]
    fn open_missing_layout_is_open_failed() {
        let mock = engine_with_repo();
        let result = Repository::open(mock, "/nowhere");
        match result {
            Err(err @ Error::OpenFailed { .. }) => assert!(err.is_not_found()),
            other => panic!("expected OpenFailed, got {other:?}"),
        }
    }

    #[test]
    fn unopened_handle_rejects_every_operation() {
        let mock = engine_with_repo();
        let repo = Repository::unopened(mock);

        assert!(!repo.is_open());
        assert!(repo.path().is_none());
        assert!(matches!(
            repo.resolve_rev("main", true),
            Err(Error::NotInitialized {
                operation: "resolve_rev"
            })
        ));
        assert!(matches!(
            repo.enable_tombstone_commits(),
            Err(Error::NotInitialized { .. })
        ));
    }

    #[test]
    fn close_returns_handle_to_uninitialized() {
        let mock = engine_with_repo();
        let mut repo = Repository::open(mock, REPO).unwrap();
        assert!(repo.is_open());

        repo.close();
        assert!(!repo.is_open());
        assert!(matches!(
            repo.resolve_rev("main", true),
            Err(Error::NotInitialized { .. })
        ));
    }

    #[test]
    fn resolve_rev_absent_vs_failed() {
        let mock = engine_with_repo();
        let repo = Repository::open(mock, REPO).unwrap();

        assert_eq!(repo.resolve_rev("ghost", true).unwrap(), None);

        let err = repo.resolve_rev("ghost", false).unwrap_err();
        assert!(matches!(err, Error::ResolveFailed { .. }));
        assert!(err.is_not_found());
    }
}
