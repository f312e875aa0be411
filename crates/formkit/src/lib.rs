#![forbid(unsafe_code)]

//! formkit public facade crate.
//!
//! Re-exports the document model, storage, history controller and editing
//! session under one name, plus a prelude for day-to-day use.
//!
//! ```
//! use formkit::prelude::*;
//! use std::sync::Arc;
//! use web_time::Instant;
//!
//! let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
//! let mut session = EditingSession::start(storage, &KeyboardHub::new(), &SessionConfig::default());
//! session.add_field(FieldType::Radio, Instant::now());
//! assert!(session.can_undo());
//! ```

// --- History re-exports ----------------------------------------------------

pub use formkit_history::{History, HistoryConfig};

// --- Store re-exports ------------------------------------------------------

pub use formkit_store::{
    Answers, Collection, DEFAULT_FORM_TITLE, Document, FieldErrors, FieldType, FieldValidation,
    FileStorage, FormField, FormRepository, FormResponse, FormSchema, FormStep, FormTemplate,
    MemoryStorage, ResponseRepository, StorageBackend, StorageError, SubmitterInfo,
    UnavailableStorage, builtin_template, builtin_templates, export, validate_submission,
};

// --- Session re-exports ----------------------------------------------------

#[cfg(feature = "session")]
pub use formkit_session::{
    AutosaveTimer, ConfigError, EditingSession, HistoryAction, KeyChord, KeyboardHub,
    ListenerGuard, Modifiers, PendingSave, SessionConfig, resolve_chord,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for formkit hosts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Configuration could not be loaded.
    #[cfg(feature = "session")]
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for formkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, FieldType, FormField, FormRepository, FormSchema, FormTemplate, History,
        MemoryStorage, ResponseRepository, Result, StorageBackend,
    };

    #[cfg(feature = "session")]
    pub use crate::{EditingSession, KeyChord, KeyboardHub, Modifiers, SessionConfig};

    pub use crate::{history, store};

    #[cfg(feature = "session")]
    pub use crate::session;
}

pub use formkit_history as history;
#[cfg(feature = "session")]
pub use formkit_session as session;
pub use formkit_store as store;
