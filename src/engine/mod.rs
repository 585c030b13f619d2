//! engine
//!
//! Single doorway to the content-addressed repository engine.
//!
//! # Architecture
//!
//! The [`Engine`] trait is the **only** surface through which the rest of
//! the crate touches the underlying store. The engine owns the commit
//! graph, the checksum-addressed object store, and the pull transfer
//! protocol; this crate is purely a client of those capabilities. No
//! other module may assume anything about how an engine is implemented.
//!
//! # Modules
//!
//! - `traits`: Core [`Engine`] trait, foreign error signal, config scalars
//! - [`mock`]: Deterministic in-memory engine for testing
//!
//! # Invariants
//!
//! - Engine calls are synchronous and may block; callers needing
//!   concurrency park them on their own workers
//! - A [`RepoToken`] is only ever obtained from [`Engine::open`] and is
//!   meaningless across engine instances

pub mod mock;
mod traits;

pub use traits::{ConfigValue, Engine, EngineError, EngineErrorCode, RepoToken};
