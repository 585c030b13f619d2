//! Integration tests for the repository handle.
//!
//! These tests run the handle against the in-memory mock engine, using
//! tempfile-backed paths so every test gets a unique repository
//! location.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use cairn::core::types::Checksum;
use cairn::engine::mock::MockEngine;
use cairn::engine::ConfigValue;
use cairn::error::Error;
use cairn::repo::Repository;

/// Test fixture pairing a unique on-disk path with a mock engine that
/// has a repository registered there.
struct TestRepo {
    dir: TempDir,
    engine: Arc<MockEngine>,
}

impl TestRepo {
    /// Create a registered, still-unopened test repository.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let engine = Arc::new(MockEngine::new());
        engine.register_repo(dir.path());
        Self { dir, engine }
    }

    /// Get the path to the repository.
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a handle to this repository.
    fn open(&self) -> Repository {
        Repository::open(self.engine.clone(), self.path()).expect("failed to open test repo")
    }

    /// Write a local ref, returning the content checksum.
    fn commit(&self, refspec: &str, content: &[u8]) -> Checksum {
        self.engine.commit(self.path(), refspec, content)
    }

    /// How many times this repository's config was persisted.
    fn write_count(&self) -> u64 {
        self.engine.config_write_count(self.path())
    }
}

// =============================================================================
// Opening
// =============================================================================

#[test]
fn open_valid_repository() {
    let repo = TestRepo::new();
    let handle = repo.open();
    assert!(handle.is_open());
    assert_eq!(handle.path(), Some(repo.path()));
}

#[test]
fn open_empty_path_fails_without_engine_call() {
    let repo = TestRepo::new();
    let result = Repository::open(repo.engine.clone(), "");
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    assert_eq!(repo.engine.open_calls(), 0);
}

#[test]
fn open_unknown_path_fails_with_diagnostic() {
    let repo = TestRepo::new();
    let err = Repository::open(repo.engine.clone(), "/no/such/layout").unwrap_err();
    assert!(matches!(err, Error::OpenFailed { .. }));
    assert!(err.is_not_found());
    assert!(err.to_string().contains("/no/such/layout"));
}

// =============================================================================
// Uninitialized handles
// =============================================================================

#[test]
fn unopened_handle_has_no_side_effects() {
    let repo = TestRepo::new();
    let handle = Repository::unopened(repo.engine.clone());

    assert!(matches!(
        handle.resolve_rev("main", true),
        Err(Error::NotInitialized { .. })
    ));
    assert!(matches!(
        handle.enable_tombstone_commits(),
        Err(Error::NotInitialized { .. })
    ));
    assert!(matches!(
        handle.config().get_bool("core", "tombstone-commits"),
        Err(Error::NotInitialized { .. })
    ));
    assert!(matches!(
        handle.config().set_bool_if_changed("core", "any", true),
        Err(Error::NotInitialized { .. })
    ));

    // Nothing reached the engine.
    assert_eq!(repo.engine.open_calls(), 0);
    assert_eq!(repo.write_count(), 0);
}

#[test]
fn closed_handle_behaves_like_unopened() {
    let repo = TestRepo::new();
    let mut handle = repo.open();
    handle.close();

    assert!(!handle.is_open());
    assert!(handle.path().is_none());
    assert!(matches!(
        handle.resolve_rev("main", false),
        Err(Error::NotInitialized { .. })
    ));
}

// =============================================================================
// Revision resolution
// =============================================================================

#[test]
fn resolve_ref_to_checksum() {
    let repo = TestRepo::new();
    let checksum = repo.commit("main", b"first commit");
    let handle = repo.open();

    assert_eq!(handle.resolve_rev("main", false).unwrap(), Some(checksum));
}

#[test]
fn resolve_partial_checksum() {
    let repo = TestRepo::new();
    let checksum = repo.commit("main", b"first commit");
    let handle = repo.open();

    let prefix = checksum.short(12).to_string();
    assert_eq!(handle.resolve_rev(&prefix, false).unwrap(), Some(checksum));
}

#[test]
fn resolve_missing_with_allow_missing_is_absent_not_failed() {
    let repo = TestRepo::new();
    let handle = repo.open();

    assert_eq!(handle.resolve_rev("ghost", true).unwrap(), None);
}

#[test]
fn resolve_missing_without_allow_missing_is_resolve_failed() {
    let repo = TestRepo::new();
    let handle = repo.open();

    let err = handle.resolve_rev("ghost", false).unwrap_err();
    assert!(matches!(err, Error::ResolveFailed { .. }));
    assert!(err.is_not_found());
    assert!(err.to_string().contains("ghost"));
}

// =============================================================================
// Tombstone commits
// =============================================================================

#[test]
fn enable_tombstone_commits_persists_flag() {
    let repo = TestRepo::new();
    let handle = repo.open();

    handle.enable_tombstone_commits().unwrap();
    assert_eq!(
        repo.engine
            .persisted_value(repo.path(), "core", "tombstone-commits"),
        Some(ConfigValue::Bool(true))
    );
    assert!(handle.config().get_bool("core", "tombstone-commits").unwrap());
}

#[test]
fn enable_tombstone_commits_is_idempotent() {
    let repo = TestRepo::new();
    let handle = repo.open();

    handle.enable_tombstone_commits().unwrap();
    let persisted_after_first = repo
        .engine
        .persisted_value(repo.path(), "core", "tombstone-commits");
    assert_eq!(repo.write_count(), 1);

    // Second call: same final state, zero additional writes.
    handle.enable_tombstone_commits().unwrap();
    assert_eq!(repo.write_count(), 1);
    assert_eq!(
        repo.engine
            .persisted_value(repo.path(), "core", "tombstone-commits"),
        persisted_after_first
    );
}

#[test]
fn enable_tombstone_commits_surfaces_write_failure_verbatim() {
    let repo = TestRepo::new();
    let handle = repo.open();

    repo.engine.fail_next_write_config("disk full");
    let err = handle.enable_tombstone_commits().unwrap_err();
    match &err {
        Error::ConfigWriteFailed { source, .. } => assert_eq!(source.message(), "disk full"),
        other => panic!("expected ConfigWriteFailed, got {other:?}"),
    }

    // The failed persist wrote nothing, but the edit stays staged in
    // the engine's live config: a re-apply compares against the staged
    // value and performs no further write.
    assert_eq!(repo.write_count(), 0);
    assert_eq!(
        repo.engine
            .persisted_value(repo.path(), "core", "tombstone-commits"),
        None
    );
    handle.enable_tombstone_commits().unwrap();
    assert_eq!(repo.write_count(), 0);
}
