#![forbid(unsafe_code)]

//! formkit History
//!
//! Linear undo/redo over snapshots of an opaque document type.
//!
//! # Key Components
//!
//! - [`History`] - Seeded snapshot sequence with a cursor
//! - [`HistoryConfig`] - Optional capacity bound (unbounded by default)
//!
//! # Role in formkit
//! The editing session owns one `History<FormSchema>` per open document and
//! routes every mutation through [`History::set`]. Undo and redo never fail:
//! at either end of the history they are no-ops, so callers may invoke them
//! unconditionally from shortcuts or toolbar buttons.
//!
//! ```
//! use formkit_history::History;
//!
//! let mut history = History::new("draft");
//! history.set("with title");
//! history.set("with fields");
//!
//! history.undo();
//! history.set("reordered");
//!
//! let states: Vec<_> = history.iter().map(|s| **s).collect();
//! assert_eq!(states, ["draft", "with title", "reordered"]);
//! assert!(!history.can_redo());
//! ```

pub mod history;

pub use history::{History, HistoryConfig};

/// Persistent collection types for snapshot-friendly documents.
///
/// Cloning these is O(1) and shares structure, which keeps a long history of
/// large documents cheap.
#[cfg(feature = "hamt")]
pub mod persistent {
    pub use im::{HashMap, HashSet, OrdMap, OrdSet, Vector};
}
