//! pull
//!
//! Pull sessions: options, progress reporting, cancellation, and the
//! session state machine.
//!
//! # Architecture
//!
//! A pull is a single-attempt, blocking transfer from a named remote.
//! The caller assembles an immutable [`PullOptions`], optionally a
//! shared [`ProgressSink`] and a [`CancellationToken`], and drives one
//! [`PullSession`] to a terminal state. Retry policy, deadlines, and
//! threading all belong to the caller.
//!
//! # Modules
//!
//! - `options`: [`PullOptions`] and the open [`OptionsBag`] request map
//! - `progress`: [`ProgressSink`] / [`ProgressSnapshot`]
//! - `cancel`: [`CancellationToken`]
//! - `session`: [`PullSession`] state machine
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use cairn::core::types::RemoteName;
//! use cairn::pull::{CancellationToken, ProgressSink, PullOptions, PullSession};
//!
//! let sink = Arc::new(ProgressSink::new());
//! let token = CancellationToken::new();
//!
//! let mut session = PullSession::new(RemoteName::new("origin")?, PullOptions::default())
//!     .with_progress(sink.clone())
//!     .with_cancellation(token.clone());
//!
//! session.start(&repo)?;
//! println!("fetched: {:?}", sink.snapshot());
//! ```

mod cancel;
mod options;
mod progress;
mod session;

pub use cancel::CancellationToken;
pub use options::{OptionValue, OptionsBag, PullOptions};
pub use progress::{ProgressSink, ProgressSnapshot};
pub use session::{PullSession, SessionId, SessionState};
