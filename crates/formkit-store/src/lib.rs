#![forbid(unsafe_code)]

//! formkit Store
//!
//! The document model edited by the builder and the best-effort persistence
//! layer underneath it.
//!
//! # Key Components
//!
//! - [`FormSchema`] - The form definition under edit (fields, steps, metadata)
//! - [`FormResponse`] - One submitted set of answers
//! - [`FormTemplate`] - Starter forms, see [`builtin_templates`]
//! - [`StorageBackend`] - String key-value medium ([`MemoryStorage`], [`FileStorage`])
//! - [`Collection`] - Typed, never-failing view of one stored collection
//! - [`FormRepository`] / [`ResponseRepository`] - Domain persistence
//! - [`export`] - JSON, CSV and share-link output
//! - [`validation`] - Submission checks
//!
//! # Failure Policy
//! Backends return [`StorageError`]s, but nothing above [`Collection`] ever
//! sees one: reads degrade to empty, writes degrade to no-ops, and the
//! failure is logged with `tracing`.

pub mod collection;
pub mod export;
pub mod repository;
pub mod schema;
pub mod storage;
pub mod templates;
pub mod validation;

pub use collection::Collection;
pub use repository::{FORMS_KEY, FormRepository, RESPONSES_KEY, ResponseRepository, TEMPLATES_KEY};
pub use schema::{
    Answers, DEFAULT_FORM_TITLE, Document, FieldType, FieldValidation, FormField, FormResponse,
    FormSchema, FormStep, SubmitterInfo, UnknownFieldType, new_id,
};
pub use storage::{
    FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult, UnavailableStorage,
};
pub use templates::{FormTemplate, TemplateSchema, builtin_template, builtin_templates};
pub use validation::{FieldErrors, validate_submission};
