#![forbid(unsafe_code)]

//! Best-effort typed collections over a [`StorageBackend`].
//!
//! A collection is a JSON array of [`Document`]s stored under one key. Every
//! public operation absorbs failures: an unreachable backend or malformed
//! stored data reads as an empty collection, and a failed write is dropped.
//! Failures are logged at `warn` level and never reach the caller, so a
//! broken medium looks like a cold start rather than a crash.

use std::marker::PhantomData;

use crate::schema::Document;
use crate::storage::{StorageBackend, StorageResult};

/// Typed view of one named collection.
pub struct Collection<'a, D> {
    backend: &'a dyn StorageBackend,
    key: &'a str,
    _doc: PhantomData<fn() -> D>,
}

impl<D> std::fmt::Debug for Collection<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("backend", &self.backend.name())
            .field("key", &self.key)
            .finish()
    }
}

impl<'a, D: Document> Collection<'a, D> {
    #[must_use]
    pub fn new(backend: &'a dyn StorageBackend, key: &'a str) -> Self {
        Self {
            backend,
            key,
            _doc: PhantomData,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        self.key
    }

    /// All documents, in stored order.
    #[must_use]
    pub fn read_all(&self) -> Vec<D> {
        self.try_read_all().unwrap_or_else(|err| {
            tracing::warn!(
                backend = self.backend.name(),
                key = self.key,
                error = %err,
                "collection read failed; treating as empty"
            );
            Vec::new()
        })
    }

    /// The document with the given id.
    #[must_use]
    pub fn read_by_id(&self, id: &str) -> Option<D> {
        self.read_all().into_iter().find(|d| d.id() == id)
    }

    /// Insert `doc`, replacing an existing document with the same id in place.
    pub fn write(&self, doc: &D)
    where
        D: Clone,
    {
        let mut docs = self.read_all();
        match docs.iter().position(|d| d.id() == doc.id()) {
            Some(index) => docs[index] = doc.clone(),
            None => docs.push(doc.clone()),
        }
        self.persist(&docs, "write");
    }

    /// Append `doc` without checking for an existing id.
    pub fn append(&self, doc: &D)
    where
        D: Clone,
    {
        let mut docs = self.read_all();
        docs.push(doc.clone());
        self.persist(&docs, "append");
    }

    /// Remove every document with the given id.
    pub fn delete(&self, id: &str) {
        let mut docs = self.read_all();
        let before = docs.len();
        docs.retain(|d| d.id() != id);
        if docs.len() == before {
            tracing::debug!(key = self.key, id, "delete of unknown id");
        }
        self.persist(&docs, "delete");
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_read_all(&self) -> StorageResult<Vec<D>> {
        let Some(raw) = self.backend.load(self.key)? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn try_persist(&self, docs: &[D]) -> StorageResult<()> {
        let json = serde_json::to_string(docs)?;
        self.backend.store(self.key, &json)
    }

    fn persist(&self, docs: &[D], op: &'static str) {
        match self.try_persist(docs) {
            Ok(()) => tracing::debug!(key = self.key, op, count = docs.len(), "collection saved"),
            Err(err) => tracing::warn!(
                backend = self.backend.name(),
                key = self.key,
                op,
                error = %err,
                "collection write dropped"
            ),
        }
    }
}
