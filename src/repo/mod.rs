//! repo
//!
//! Repository handles and configuration editing.
//!
//! # Architecture
//!
//! A [`Repository`] is the caller-facing view of one opened repository:
//! it validates its own lifecycle (open vs. uninitialized) on every
//! entry point, then delegates to the engine. The [`ConfigEditor`]
//! implements the read/compare/write-back cycle for the repository's
//! persisted configuration.
//!
//! # Invariants
//!
//! - No operation reaches the engine through an unopened handle
//! - Config writes happen only when the stored value actually differs
//! - One handle is not internally synchronized; concurrent use of a
//!   single handle requires external locking (single-writer discipline
//!   recommended)

mod config;
mod handle;

pub use config::ConfigEditor;
pub use handle::Repository;
