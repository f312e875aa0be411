#![forbid(unsafe_code)]

//! formkit Session
//!
//! Ties the history controller to a form document and to the host around
//! the editor: storage, the autosave debounce and the undo/redo shortcuts.
//!
//! # Key Components
//!
//! - [`EditingSession`] - One open editor; every change is one history entry
//! - [`AutosaveTimer`] - Poll-driven debounce with superseding [`PendingSave`]s
//! - [`KeyboardHub`] / [`ListenerGuard`] - Scoped key listener registration
//! - [`resolve_chord`] - Ctrl/Cmd+Z and Ctrl/Cmd+Shift+Z bindings
//! - [`SessionConfig`] - Autosave delay and history bound (env or TOML)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use formkit_session::{EditingSession, KeyboardHub, SessionConfig};
//! use formkit_store::{FieldType, MemoryStorage};
//! use web_time::{Duration, Instant};
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let keyboard = KeyboardHub::new();
//! let mut session = EditingSession::start(storage, &keyboard, &SessionConfig::default());
//!
//! let t0 = Instant::now();
//! session.set_title("Feedback", t0);
//! session.add_field(FieldType::Textarea, t0);
//! assert!(session.undo(t0));
//! assert_eq!(session.document().fields.len(), 0);
//!
//! assert!(session.tick(t0 + Duration::from_secs(1)));
//! assert!(!session.end());
//! ```

pub mod autosave;
pub mod config;
pub mod keyboard;
pub mod session;

pub use autosave::{AutosaveTimer, PendingSave};
pub use config::{ConfigError, DEFAULT_AUTOSAVE_MS, SessionConfig};
pub use keyboard::{
    HistoryAction, KeyChord, KeyboardHub, ListenerGuard, ListenerId, Modifiers, resolve_chord,
};
pub use session::EditingSession;
