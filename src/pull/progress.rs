//! pull::progress
//!
//! Shared progress reporting for long-running transfers.
//!
//! # Concurrency
//!
//! A [`ProgressSink`] is the one object in this crate that is written
//! by a running pull while being read from other threads (a UI, a
//! telemetry exporter). All state lives behind a lock; readers take a
//! consistent [`ProgressSnapshot`] rather than holding the lock across
//! their own work.
//!
//! # Sharing
//!
//! One sink serves one session at a time. The type is deliberately not
//! `Clone` (share it through an `Arc`), and attaching the same sink to
//! two concurrently running sessions interleaves their updates into
//! nonsense. That discipline is the caller's responsibility.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Shared, externally-owned progress reporting object.
///
/// The writer half (the engine, during a pull) updates counters and
/// status text; the reader half takes snapshots.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use cairn::pull::ProgressSink;
///
/// let sink = Arc::new(ProgressSink::new());
/// sink.mark_started();
/// sink.set_status("fetching");
/// sink.add_bytes_transferred(4096);
/// sink.set_objects(1, 10);
///
/// let snap = sink.snapshot();
/// assert_eq!(snap.status, "fetching");
/// assert_eq!(snap.bytes_transferred, 4096);
/// assert_eq!(snap.objects_fetched, 1);
/// ```
#[derive(Debug, Default)]
pub struct ProgressSink {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default, Clone)]
struct Inner {
    status: String,
    bytes_transferred: u64,
    objects_fetched: u32,
    objects_total: u32,
    started_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ProgressSink {
    /// Create a sink with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the transfer start time and clear any previous state.
    pub fn mark_started(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner {
            started_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            ..Inner::default()
        };
    }

    /// Replace the status line.
    pub fn set_status(&self, status: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.status = status.into();
        inner.updated_at = Some(Utc::now());
    }

    /// Add to the transferred byte counter.
    pub fn add_bytes_transferred(&self, bytes: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.bytes_transferred += bytes;
        inner.updated_at = Some(Utc::now());
    }

    /// Set the fetched/total object counters.
    pub fn set_objects(&self, fetched: u32, total: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.objects_fetched = fetched;
        inner.objects_total = total;
        inner.updated_at = Some(Utc::now());
    }

    /// Take a consistent snapshot of the current state.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let inner = self.inner.lock().unwrap();
        ProgressSnapshot {
            status: inner.status.clone(),
            bytes_transferred: inner.bytes_transferred,
            objects_fetched: inner.objects_fetched,
            objects_total: inner.objects_total,
            started_at: inner.started_at,
            updated_at: inner.updated_at,
        }
    }
}

/// A point-in-time copy of a [`ProgressSink`]'s state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Engine-reported status line (e.g. "fetching").
    pub status: String,
    /// Bytes transferred so far.
    pub bytes_transferred: u64,
    /// Objects fetched so far.
    pub objects_fetched: u32,
    /// Total objects expected, when the engine knows it.
    pub objects_total: u32,
    /// When the transfer started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the sink was last written.
    pub updated_at: Option<DateTime<Utc>>,
}
