//! pull::session
//!
//! The pull session state machine.
//!
//! # Lifecycle
//!
//! ```text
//! Constructed ──start()──▶ Running ──▶ Completed
//!                             │
//!                             ├──▶ Failed
//!                             └──▶ Cancelled
//! ```
//!
//! A session is transient: it exists for exactly one pull attempt and
//! cannot be restarted. Nothing is retried internally: a retry is a
//! new session, and that policy belongs to the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::RemoteName;
use crate::error::{adapt_pull, Error};
use crate::pull::{CancellationToken, ProgressSink, PullOptions};
use crate::repo::Repository;

/// Unique identifier for a pull session, used for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session id.
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a [`PullSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built, not yet started.
    Constructed,
    /// The blocking transfer is in flight.
    Running,
    /// The transfer finished successfully.
    Completed,
    /// The transfer reported an error.
    Failed,
    /// The transfer observed a triggered cancellation token.
    Cancelled,
}

impl SessionState {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Constructed => "constructed",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A single pull attempt against a named remote.
///
/// The session references a repository handle only for the duration of
/// [`PullSession::start`]; the progress sink is shared (and may be read
/// concurrently while the session runs), the cancellation token is
/// shared with whoever may want to abort the transfer. Both are
/// optional.
///
/// # Example
///
/// ```ignore
/// use cairn::core::types::RemoteName;
/// use cairn::pull::{PullOptions, PullSession, SessionState};
///
/// let mut session = PullSession::new(
///     RemoteName::new("origin")?,
///     PullOptions::default(),
/// );
/// session.start(&repo)?;
/// assert_eq!(session.state(), SessionState::Completed);
/// ```
#[derive(Debug)]
pub struct PullSession {
    id: SessionId,
    remote: RemoteName,
    options: PullOptions,
    progress: Option<Arc<ProgressSink>>,
    cancel: Option<CancellationToken>,
    state: SessionState,
}

impl PullSession {
    /// Create a session for one pull from `remote`.
    pub fn new(remote: RemoteName, options: PullOptions) -> Self {
        Self {
            id: SessionId::generate(),
            remote,
            options,
            progress: None,
            cancel: None,
            state: SessionState::Constructed,
        }
    }

    /// Attach a shared progress sink.
    ///
    /// The sink must not be attached to another session that may run
    /// concurrently; interleaved updates are unspecified.
    pub fn with_progress(mut self, sink: Arc<ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The session's id, for log correlation.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The remote this session pulls from.
    pub fn remote(&self) -> &RemoteName {
        &self.remote
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the pull to a terminal state. Blocks until the transfer
    /// completes, fails, or observes cancellation; callers wanting
    /// concurrency park this call on a worker of their own.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the session was already started
    /// - [`Error::NotInitialized`] if `repo` is not open (the session
    ///   stays `Constructed`; nothing happened)
    /// - [`Error::Cancelled`] if the token was triggered before or
    ///   during the transfer
    /// - [`Error::PullFailed`] for any other engine-reported failure
    pub fn start(&mut self, repo: &Repository) -> Result<(), Error> {
        if self.state != SessionState::Constructed {
            return Err(Error::InvalidArgument {
                reason: format!("pull session {} already started ({})", self.id, self.state),
            });
        }

        let token = repo.require_open("pull")?;

        // Serializing the options into the request bag is the
        // Constructed -> Running transition.
        let bag = self.options.to_bag();
        self.state = SessionState::Running;
        log::info!(
            "pull session {}: remote '{}', options {}",
            self.id,
            self.remote,
            serde_json::to_string(&bag).unwrap_or_else(|_| "<unserializable>".into()),
        );

        // A token triggered before the transfer starts is still a
        // cancellation, observed as promptly as possible.
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            self.state = SessionState::Cancelled;
            log::info!("pull session {}: cancelled before transfer", self.id);
            return Err(Error::Cancelled { operation: "pull" });
        }

        if let Some(sink) = &self.progress {
            sink.mark_started();
        }

        let result = repo.engine().pull(
            token,
            self.remote.as_str(),
            &bag,
            self.progress.as_deref(),
            self.cancel.as_ref(),
        );

        match result {
            Ok(()) => {
                self.state = SessionState::Completed;
                log::info!("pull session {}: completed", self.id);
                Ok(())
            }
            Err(e) => {
                let err = adapt_pull(self.remote.as_str(), Some(e));
                self.state = if matches!(err, Error::Cancelled { .. }) {
                    SessionState::Cancelled
                } else {
                    SessionState::Failed
                };
                log::warn!("pull session {}: {} ({})", self.id, self.state, err);
                Err(err)
            }
        }
    }
}
