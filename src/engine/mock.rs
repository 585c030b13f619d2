//! engine::mock
//!
//! Mock engine implementation for deterministic testing.
//!
//! # Design
//!
//! The mock engine keeps entire repositories in memory: refs, staged
//! and persisted configuration, and named remotes whose objects are
//! "content-addressed" by the SHA-256 of the bytes handed to
//! [`MockEngine::remote_commit`]. Pulls transfer ref by ref, updating
//! the progress sink and checking the cancellation token between
//! steps, so cancellation and progress behavior can be exercised
//! without a real store.
//!
//! Probes and failure injection exist for tests: a persisted-write
//! counter, an open-call counter, the last pull request as the engine
//! saw it, and one-shot failures for `write_config` and `pull`.
//!
//! # Example
//!
//! ```
//! use cairn::engine::{mock::MockEngine, Engine};
//! use cairn::pull::PullOptions;
//!
//! let mock = MockEngine::new();
//! mock.register_repo("/data/repo");
//! let checksum = mock.remote_commit("/data/repo", "origin", "main", b"payload");
//!
//! let token = mock.open(std::path::Path::new("/data/repo")).unwrap();
//! mock.pull(token, "origin", &PullOptions::default().to_bag(), None, None)
//!     .unwrap();
//!
//! let resolved = mock.resolve_rev(token, "origin:main", false).unwrap();
//! assert_eq!(resolved, Some(checksum));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::core::types::Checksum;
use crate::engine::{ConfigValue, Engine, EngineError, EngineErrorCode, RepoToken};
use crate::pull::{CancellationToken, OptionsBag, ProgressSink, PullOptions};

/// Minimum hex digits accepted as a partial-checksum refspec.
const PARTIAL_CHECKSUM_MIN: usize = 6;

/// Mock engine for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// state.
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    /// Internal state shared across clones.
    inner: Arc<Mutex<Inner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct Inner {
    next_token: u64,
    repos: HashMap<PathBuf, RepoState>,
    opened: HashMap<RepoToken, PathBuf>,
    open_calls: u64,
    fail_next_write_config: Option<EngineError>,
    fail_next_pull: Option<EngineError>,
    step_delay: Duration,
}

/// One in-memory repository.
#[derive(Debug, Default)]
struct RepoState {
    refs: BTreeMap<String, Checksum>,
    staged_config: BTreeMap<(String, String), ConfigValue>,
    persisted_config: BTreeMap<(String, String), ConfigValue>,
    config_write_count: u64,
    remotes: BTreeMap<String, BTreeMap<String, RemoteObject>>,
    last_pull: Option<PullRecord>,
}

/// An object a remote carries for one ref.
#[derive(Debug, Clone)]
struct RemoteObject {
    checksum: Checksum,
    size: u64,
}

/// The last pull request a repository served, as the engine saw it.
#[derive(Debug, Clone)]
pub struct PullRecord {
    /// The remote the transfer targeted.
    pub remote: String,
    /// The options bag, verbatim.
    pub options: OptionsBag,
    /// The remote name the fetched refs were recorded under.
    pub recorded_under: String,
    /// The refs that were transferred, in order.
    pub fetched_refs: Vec<String>,
}

impl MockEngine {
    /// Create an empty mock engine.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Test setup
    // =========================================================================

    /// Register a repository layout at `path` so `open` succeeds there.
    pub fn register_repo(&self, path: impl Into<PathBuf>) {
        let mut inner = self.inner.lock().unwrap();
        inner.repos.entry(path.into()).or_default();
    }

    /// Write a local ref pointing at the checksum of `content`.
    ///
    /// Returns the derived checksum. Panics if `path` was never
    /// registered; that is a broken test, not a scenario.
    pub fn commit(
        &self,
        path: impl AsRef<Path>,
        refspec: impl Into<String>,
        content: &[u8],
    ) -> Checksum {
        let checksum = Self::checksum_of(content);
        let mut inner = self.inner.lock().unwrap();
        let state = inner
            .repos
            .get_mut(path.as_ref())
            .expect("repository not registered");
        state.refs.insert(refspec.into(), checksum.clone());
        checksum
    }

    /// Configure an (initially empty) remote.
    pub fn add_remote(&self, path: impl AsRef<Path>, remote: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        let state = inner
            .repos
            .get_mut(path.as_ref())
            .expect("repository not registered");
        state.remotes.entry(remote.into()).or_default();
    }

    /// Publish `content` on a remote under `refspec`, creating the
    /// remote if needed. Returns the derived checksum.
    pub fn remote_commit(
        &self,
        path: impl AsRef<Path>,
        remote: impl Into<String>,
        refspec: impl Into<String>,
        content: &[u8],
    ) -> Checksum {
        let checksum = Self::checksum_of(content);
        let mut inner = self.inner.lock().unwrap();
        let state = inner
            .repos
            .get_mut(path.as_ref())
            .expect("repository not registered");
        state.remotes.entry(remote.into()).or_default().insert(
            refspec.into(),
            RemoteObject {
                checksum: checksum.clone(),
                size: content.len() as u64,
            },
        );
        checksum
    }

    /// Make the next `write_config` call fail with `message`.
    pub fn fail_next_write_config(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_write_config = Some(EngineError::new(EngineErrorCode::Io, message));
    }

    /// Make the next `pull` call fail.
    pub fn fail_next_pull(&self, code: EngineErrorCode, message: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_pull = Some(EngineError::new(code, message));
    }

    /// Sleep this long per transferred ref, to widen cancellation
    /// windows in threaded tests.
    pub fn set_step_delay(&self, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.step_delay = delay;
    }

    // =========================================================================
    // Probes
    // =========================================================================

    /// How many times `open` was called, successfully or not.
    pub fn open_calls(&self) -> u64 {
        self.inner.lock().unwrap().open_calls
    }

    /// How many times the repository's config was persisted.
    pub fn config_write_count(&self, path: impl AsRef<Path>) -> u64 {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(path.as_ref())
            .map(|s| s.config_write_count)
            .unwrap_or(0)
    }

    /// A persisted (not merely staged) config value.
    pub fn persisted_value(
        &self,
        path: impl AsRef<Path>,
        group: &str,
        key: &str,
    ) -> Option<ConfigValue> {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(path.as_ref())?
            .persisted_config
            .get(&(group.to_string(), key.to_string()))
            .cloned()
    }

    /// The last pull request the repository served.
    pub fn last_pull(&self, path: impl AsRef<Path>) -> Option<PullRecord> {
        let inner = self.inner.lock().unwrap();
        inner.repos.get(path.as_ref())?.last_pull.clone()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn checksum_of(content: &[u8]) -> Checksum {
        let digest = Sha256::digest(content);
        Checksum::from_digest(&digest.into())
    }

    fn repo_mut<'a>(
        inner: &'a mut Inner,
        repo: RepoToken,
    ) -> Result<&'a mut RepoState, EngineError> {
        let stale = || EngineError::new(EngineErrorCode::Other, "stale repository token");
        let path = inner.opened.get(&repo).cloned().ok_or_else(stale)?;
        inner.repos.get_mut(&path).ok_or_else(stale)
    }
}

impl Engine for MockEngine {
    fn open(&self, path: &Path) -> Result<RepoToken, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        inner.open_calls += 1;
        if !inner.repos.contains_key(path) {
            return Err(EngineError::new(
                EngineErrorCode::NotFound,
                format!("no repository layout at '{}'", path.display()),
            ));
        }
        inner.next_token += 1;
        let token = RepoToken(inner.next_token);
        inner.opened.insert(token, path.to_path_buf());
        Ok(token)
    }

    fn resolve_rev(
        &self,
        repo: RepoToken,
        refspec: &str,
        allow_missing: bool,
    ) -> Result<Option<Checksum>, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let state = Self::repo_mut(&mut inner, repo)?;

        if let Some(checksum) = state.refs.get(refspec) {
            return Ok(Some(checksum.clone()));
        }

        // A full checksum resolves to itself; a hex prefix resolves if
        // it names exactly one known ref target.
        if refspec.len() >= PARTIAL_CHECKSUM_MIN
            && refspec.chars().all(|c| c.is_ascii_hexdigit())
        {
            if refspec.len() == Checksum::HEX_LEN {
                if let Ok(checksum) = Checksum::new(refspec) {
                    return Ok(Some(checksum));
                }
            }
            let prefix = refspec.to_ascii_lowercase();
            let mut candidates: Vec<&Checksum> = state
                .refs
                .values()
                .filter(|c| c.as_str().starts_with(&prefix))
                .collect();
            candidates.sort();
            candidates.dedup();
            match candidates.len() {
                1 => return Ok(Some(candidates[0].clone())),
                0 => {}
                _ => {
                    return Err(EngineError::new(
                        EngineErrorCode::Other,
                        format!("checksum prefix '{refspec}' is ambiguous"),
                    ))
                }
            }
        }

        if allow_missing {
            Ok(None)
        } else {
            Err(EngineError::new(
                EngineErrorCode::NotFound,
                format!("refspec '{refspec}' not found"),
            ))
        }
    }

    fn get_config_value(&self, repo: RepoToken, group: &str, key: &str) -> Option<ConfigValue> {
        let inner = self.inner.lock().unwrap();
        let path = inner.opened.get(&repo)?;
        inner
            .repos
            .get(path)?
            .staged_config
            .get(&(group.to_string(), key.to_string()))
            .cloned()
    }

    fn set_config_value(&self, repo: RepoToken, group: &str, key: &str, value: ConfigValue) {
        let mut inner = self.inner.lock().unwrap();
        // Stale tokens are silently ignored; the handle layer never
        // produces them.
        if let Ok(state) = Self::repo_mut(&mut inner, repo) {
            state
                .staged_config
                .insert((group.to_string(), key.to_string()), value);
        }
    }

    fn write_config(&self, repo: RepoToken) -> Result<(), EngineError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_next_write_config.take() {
            return Err(err);
        }
        let state = Self::repo_mut(&mut inner, repo)?;
        state.persisted_config = state.staged_config.clone();
        state.config_write_count += 1;
        Ok(())
    }

    fn pull(
        &self,
        repo: RepoToken,
        remote: &str,
        options: &OptionsBag,
        progress: Option<&ProgressSink>,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), EngineError> {
        // Plan the transfer under the lock, then run it without holding
        // the lock so progress readers are never blocked on us.
        let (objects, recorded_under, step_delay) = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(err) = inner.fail_next_pull.take() {
                return Err(err);
            }
            let step_delay = inner.step_delay;
            let state = Self::repo_mut(&mut inner, repo)?;
            let remote_refs = state.remotes.get(remote).ok_or_else(|| {
                EngineError::new(
                    EngineErrorCode::NotFound,
                    format!("remote '{remote}' is not configured"),
                )
            })?;

            let requested: Vec<String> = match options
                .get(PullOptions::KEY_REFS)
                .and_then(|v| v.as_str_list())
            {
                Some(list) => list.to_vec(),
                None => remote_refs.keys().cloned().collect(),
            };

            let mut objects = Vec::with_capacity(requested.len());
            for name in requested {
                let object = remote_refs.get(&name).ok_or_else(|| {
                    EngineError::new(
                        EngineErrorCode::NotFound,
                        format!("remote '{remote}' does not carry ref '{name}'"),
                    )
                })?;
                objects.push((name, object.clone()));
            }

            let recorded_under = options
                .get(PullOptions::KEY_OVERRIDE_REMOTE_NAME)
                .and_then(|v| v.as_str())
                .unwrap_or(remote)
                .to_string();

            (objects, recorded_under, step_delay)
        };

        if let Some(sink) = progress {
            sink.set_status("fetching");
            sink.set_objects(0, objects.len() as u32);
        }

        for (i, (name, object)) in objects.iter().enumerate() {
            if cancel.is_some_and(|t| t.is_cancelled()) {
                return Err(EngineError::new(
                    EngineErrorCode::Cancelled,
                    "pull interrupted by cancellation",
                ));
            }
            if !step_delay.is_zero() {
                std::thread::sleep(step_delay);
            }
            log::debug!("mock pull: fetched '{}' ({})", name, object.checksum.short(12));
            if let Some(sink) = progress {
                sink.add_bytes_transferred(object.size);
                sink.set_objects((i + 1) as u32, objects.len() as u32);
            }
        }

        // Commit the transfer: record fetched refs under the effective
        // remote name.
        let mut inner = self.inner.lock().unwrap();
        let state = Self::repo_mut(&mut inner, repo)?;
        let mut fetched_refs = Vec::with_capacity(objects.len());
        for (name, object) in objects {
            state
                .refs
                .insert(format!("{recorded_under}:{name}"), object.checksum);
            fetched_refs.push(name);
        }
        state.last_pull = Some(PullRecord {
            remote: remote.to_string(),
            options: options.clone(),
            recorded_under,
            fetched_refs,
        });

        if let Some(sink) = progress {
            sink.set_status("complete");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO: &str = "/data/repo";

    fn opened_mock() -> (MockEngine, RepoToken) {
        let mock = MockEngine::new();
        mock.register_repo(REPO);
        let token = mock.open(Path::new(REPO)).unwrap();
        (mock, token)
    }

    #[test]
    fn open_unregistered_path_is_not_found() {
        let mock = MockEngine::new();
        let err = mock.open(Path::new("/nowhere")).unwrap_err();
        assert_eq!(err.code(), EngineErrorCode::NotFound);
        assert_eq!(mock.open_calls(), 1);
    }

    #[test]
    fn commit_then_resolve() {
        let (mock, token) = opened_mock();
        let checksum = mock.commit(REPO, "main", b"first");
        assert_eq!(
            mock.resolve_rev(token, "main", false).unwrap(),
            Some(checksum)
        );
    }

    #[test]
    fn resolve_partial_checksum_prefix() {
        let (mock, token) = opened_mock();
        let checksum = mock.commit(REPO, "main", b"first");
        let prefix = checksum.short(10).to_string();
        assert_eq!(
            mock.resolve_rev(token, &prefix, false).unwrap(),
            Some(checksum)
        );
    }

    #[test]
    fn resolve_full_checksum_passes_through() {
        let (mock, token) = opened_mock();
        let loose = "7".repeat(Checksum::HEX_LEN);
        let resolved = mock.resolve_rev(token, &loose, false).unwrap().unwrap();
        assert_eq!(resolved.as_str(), loose);
    }

    #[test]
    fn write_config_persists_staged_values_and_counts() {
        let (mock, token) = opened_mock();
        mock.set_config_value(token, "core", "mode", ConfigValue::from("archive"));
        assert!(mock.persisted_value(REPO, "core", "mode").is_none());

        mock.write_config(token).unwrap();
        assert_eq!(
            mock.persisted_value(REPO, "core", "mode"),
            Some(ConfigValue::from("archive"))
        );
        assert_eq!(mock.config_write_count(REPO), 1);
    }

    #[test]
    fn injected_write_failure_fires_once() {
        let (mock, token) = opened_mock();
        mock.fail_next_write_config("disk full");
        assert_eq!(
            mock.write_config(token).unwrap_err().code(),
            EngineErrorCode::Io
        );
        mock.write_config(token).unwrap();
    }

    #[test]
    fn pull_default_set_fetches_every_remote_ref() {
        let (mock, token) = opened_mock();
        mock.remote_commit(REPO, "origin", "main", b"one");
        mock.remote_commit(REPO, "origin", "release", b"two");

        mock.pull(token, "origin", &OptionsBag::new(), None, None)
            .unwrap();

        let record = mock.last_pull(REPO).unwrap();
        assert_eq!(record.fetched_refs, vec!["main", "release"]);
        assert_eq!(record.recorded_under, "origin");
        assert!(mock
            .resolve_rev(token, "origin:release", false)
            .unwrap()
            .is_some());
    }

    #[test]
    fn pull_override_records_under_other_name() {
        let (mock, token) = opened_mock();
        mock.remote_commit(REPO, "origin", "main", b"one");

        let bag = PullOptions {
            override_remote_name: Some("mirror".into()),
            refs: vec!["main".into()],
        }
        .to_bag();
        mock.pull(token, "origin", &bag, None, None).unwrap();

        assert!(mock.resolve_rev(token, "mirror:main", true).unwrap().is_some());
        assert!(mock.resolve_rev(token, "origin:main", true).unwrap().is_none());
    }

    #[test]
    fn pull_unknown_remote_or_ref_is_not_found() {
        let (mock, token) = opened_mock();
        let err = mock
            .pull(token, "origin", &OptionsBag::new(), None, None)
            .unwrap_err();
        assert_eq!(err.code(), EngineErrorCode::NotFound);

        mock.remote_commit(REPO, "origin", "main", b"one");
        let bag = PullOptions {
            refs: vec!["missing".into()],
            ..PullOptions::default()
        }
        .to_bag();
        let err = mock.pull(token, "origin", &bag, None, None).unwrap_err();
        assert_eq!(err.code(), EngineErrorCode::NotFound);
    }

    #[test]
    fn pull_observes_pre_triggered_cancellation() {
        let (mock, token) = opened_mock();
        mock.remote_commit(REPO, "origin", "main", b"one");

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = mock
            .pull(token, "origin", &OptionsBag::new(), None, Some(&cancel))
            .unwrap_err();
        assert_eq!(err.code(), EngineErrorCode::Cancelled);
        assert!(mock.last_pull(REPO).is_none());
    }
}
