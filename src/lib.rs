//! Cairn - a client for content-addressed repository engines
//!
//! Cairn is a memory-safe client abstraction over an external
//! content-addressed repository engine: the engine owns the commit
//! graph, the checksum-addressed object store, and the pull transfer
//! protocol; this crate owns the handle lifecycle, revision
//! resolution, idempotent configuration editing, and the pull session
//! surface a caller drives.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Strong domain types (checksums, remote names)
//! - [`error`] - Error taxonomy and the engine error adapter
//! - [`engine`] - Single doorway to the engine contract (plus a mock)
//! - [`repo`] - Repository handles and configuration editing
//! - [`pull`] - Pull sessions, options, progress, and cancellation
//!
//! # Correctness Invariants
//!
//! Cairn maintains the following invariants:
//!
//! 1. No operation reaches the engine through an unopened handle
//! 2. Engine failures are wrapped exactly once, with call-site context,
//!    and never silently swallowed
//! 3. Cancellation is always distinguishable from failure
//! 4. Nothing is retried internally; a pull is one attempt
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cairn::core::types::RemoteName;
//! use cairn::engine::mock::MockEngine;
//! use cairn::pull::{PullOptions, PullSession, SessionState};
//! use cairn::repo::Repository;
//!
//! let mock = MockEngine::new();
//! mock.register_repo("/data/repo");
//! mock.remote_commit("/data/repo", "origin", "main", b"payload");
//!
//! let repo = Repository::open(Arc::new(mock), "/data/repo").unwrap();
//! repo.enable_tombstone_commits().unwrap();
//!
//! let mut session = PullSession::new(
//!     RemoteName::new("origin").unwrap(),
//!     PullOptions::default(),
//! );
//! session.start(&repo).unwrap();
//! assert_eq!(session.state(), SessionState::Completed);
//!
//! let pulled = repo.resolve_rev("origin:main", false).unwrap();
//! assert!(pulled.is_some());
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod pull;
pub mod repo;
