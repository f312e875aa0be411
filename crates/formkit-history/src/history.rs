#![forbid(unsafe_code)]

//! Cursor-based linear snapshot history.
//!
//! [`History`] stores every committed document state as an [`Arc`] and keeps
//! a cursor pointing at the one the editor currently shows. Undo and redo only
//! move the cursor; committing a new state truncates everything after the
//! cursor first, so there is never more than one line of history.
//!
//! ```text
//! set(s1) set(s2) set(s3)
//! ┌──────────────────────────────────────────┐
//! │ entries: [s0, s1, s2, s3]                │
//! │ cursor:                ^ 3               │
//! └──────────────────────────────────────────┘
//!
//! undo() x2
//! ┌──────────────────────────────────────────┐
//! │ entries: [s0, s1, s2, s3]                │
//! │ cursor:        ^ 1                       │
//! └──────────────────────────────────────────┘
//!
//! set(s4): s2 and s3 are dropped for good
//! ┌──────────────────────────────────────────┐
//! │ entries: [s0, s1, s4]                    │
//! │ cursor:            ^ 2                   │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Memory Model
//!
//! Snapshots are reference counted. Pushing an `Arc` the caller already holds
//! (via [`History::set_arc`]) shares the allocation, and documents built from
//! persistent collections share most of their structure between entries.
//! History is unbounded by default; a [`HistoryConfig::bounded`] capacity
//! evicts the oldest entries once exceeded.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Configuration for a [`History`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of entries to retain, including the current one.
    ///
    /// `None` keeps every entry for the life of the history. `Some(0)` is
    /// treated as `Some(1)`: the current snapshot is never evicted.
    pub capacity: Option<usize>,
}

impl HistoryConfig {
    /// Keep every committed snapshot.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { capacity: None }
    }

    /// Keep at most `capacity` snapshots, evicting the oldest first.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }

    fn effective_capacity(&self) -> Option<usize> {
        self.capacity.map(|n| n.max(1))
    }
}

/// A linear undo/redo history over opaque snapshots.
///
/// # Invariants
///
/// 1. `entries` is never empty; it is seeded at construction.
/// 2. `cursor < entries.len()` after every operation.
/// 3. After [`set`](Self::set), the cursor is at the last entry and nothing
///    can be redone.
/// 4. `entries.len() <= capacity` when a capacity is configured.
pub struct History<T> {
    entries: VecDeque<Arc<T>>,
    cursor: usize,
    config: HistoryConfig,
}

impl<T> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> History<T> {
    /// Create an unbounded history seeded with `seed`.
    #[must_use]
    pub fn new(seed: T) -> Self {
        Self::with_config(seed, HistoryConfig::default())
    }

    /// Create a history seeded with `seed` using the given configuration.
    #[must_use]
    pub fn with_config(seed: T, config: HistoryConfig) -> Self {
        Self::from_arc(Arc::new(seed), config)
    }

    /// Create a history seeded with an already shared snapshot.
    #[must_use]
    pub fn from_arc(seed: Arc<T>, config: HistoryConfig) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(seed);
        Self {
            entries,
            cursor: 0,
            config,
        }
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Commit a new snapshot.
    ///
    /// Entries after the cursor (the redo branch) are discarded, `snapshot`
    /// is appended and becomes current.
    pub fn set(&mut self, snapshot: T) {
        self.set_arc(Arc::new(snapshot));
    }

    /// Commit a pre-wrapped snapshot without re-allocating it.
    pub fn set_arc(&mut self, snapshot: Arc<T>) {
        let discarded = self.entries.len() - self.cursor - 1;
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        let evicted = self.enforce_capacity();
        self.cursor = self.entries.len() - 1;
        tracing::trace!(
            cursor = self.cursor,
            len = self.entries.len(),
            discarded,
            evicted,
            "history set"
        );
    }

    /// The snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> &Arc<T> {
        &self.entries[self.cursor]
    }

    /// Step back one entry and return the new current snapshot.
    ///
    /// Returns `None` and leaves the history untouched when already at the
    /// earliest entry.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        tracing::trace!(cursor = self.cursor, len = self.entries.len(), "history undo");
        Some(Arc::clone(self.current()))
    }

    /// Step forward one entry and return the new current snapshot.
    ///
    /// Returns `None` and leaves the history untouched when already at the
    /// latest entry.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        tracing::trace!(cursor = self.cursor, len = self.entries.len(), "history redo");
        Some(Arc::clone(self.current()))
    }

    /// Replace the whole history with a single snapshot.
    pub fn reset(&mut self, snapshot: T) {
        self.reset_arc(Arc::new(snapshot));
    }

    /// Replace the whole history with a single pre-wrapped snapshot.
    pub fn reset_arc(&mut self, snapshot: Arc<T>) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.cursor = 0;
        tracing::trace!(dropped, "history reset");
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Whether [`undo`](Self::undo) would move the cursor.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would move the cursor.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Index of the current snapshot.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of retained snapshots. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; a history holds its seed at minimum.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of [`undo`](Self::undo) steps available.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    /// Number of [`redo`](Self::redo) steps available.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.cursor - 1
    }

    /// Snapshot at `index`, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.entries.get(index)
    }

    /// Iterate over all retained snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> + '_ {
        self.entries.iter()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Drop the oldest entries beyond the configured capacity.
    ///
    /// Called right after an append, so the newest entry always survives.
    fn enforce_capacity(&mut self) -> usize {
        let Some(capacity) = self.config.effective_capacity() else {
            return 0;
        };
        let excess = self.entries.len().saturating_sub(capacity);
        self.entries.drain(..excess);
        excess
    }
}

// ============================================================================
// Tests
// ============================================================================
