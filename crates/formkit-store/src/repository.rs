#![forbid(unsafe_code)]

//! Form and response repositories.
//!
//! Thin domain wrappers over [`Collection`] using the storage keys of the
//! browser builder, so an exported local-storage dump loads unchanged.

use std::sync::Arc;

use chrono::Utc;

use crate::collection::Collection;
use crate::schema::{FormResponse, FormSchema};
use crate::storage::StorageBackend;
use crate::templates::FormTemplate;

/// Storage key for saved forms.
pub const FORMS_KEY: &str = "form_builder_forms";
/// Storage key for user-saved templates.
pub const TEMPLATES_KEY: &str = "form_builder_templates";
/// Storage key for submitted responses.
pub const RESPONSES_KEY: &str = "form_builder_responses";

/// Saved form definitions and user templates.
#[derive(Clone)]
pub struct FormRepository {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for FormRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRepository")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl FormRepository {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    fn forms_collection(&self) -> Collection<'_, FormSchema> {
        Collection::new(self.backend.as_ref(), FORMS_KEY)
    }

    fn templates_collection(&self) -> Collection<'_, FormTemplate> {
        Collection::new(self.backend.as_ref(), TEMPLATES_KEY)
    }

    /// Save or update `form`, stamping `updated_at` with the current time.
    ///
    /// Returns the record as stored.
    pub fn save_form(&self, form: &FormSchema) -> FormSchema {
        let mut stored = form.clone();
        stored.updated_at = Utc::now();
        self.forms_collection().write(&stored);
        tracing::debug!(form_id = %stored.id, title = %stored.title, "form saved");
        stored
    }

    #[must_use]
    pub fn forms(&self) -> Vec<FormSchema> {
        self.forms_collection().read_all()
    }

    #[must_use]
    pub fn form_by_id(&self, id: &str) -> Option<FormSchema> {
        self.forms_collection().read_by_id(id)
    }

    pub fn delete_form(&self, id: &str) {
        self.forms_collection().delete(id);
    }

    /// Save or update a user template.
    pub fn save_template(&self, template: &FormTemplate) {
        self.templates_collection().write(template);
    }

    #[must_use]
    pub fn templates(&self) -> Vec<FormTemplate> {
        self.templates_collection().read_all()
    }
}

/// Submitted responses, across all forms.
#[derive(Clone)]
pub struct ResponseRepository {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for ResponseRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseRepository")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl ResponseRepository {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    fn collection(&self) -> Collection<'_, FormResponse> {
        Collection::new(self.backend.as_ref(), RESPONSES_KEY)
    }

    /// Record a submission. Responses are append-only.
    pub fn save_response(&self, response: &FormResponse) {
        self.collection().append(response);
        tracing::debug!(
            response_id = %response.id,
            form_id = %response.form_id,
            "response saved"
        );
    }

    #[must_use]
    pub fn responses(&self) -> Vec<FormResponse> {
        self.collection().read_all()
    }

    #[must_use]
    pub fn responses_for_form(&self, form_id: &str) -> Vec<FormResponse> {
        self.responses()
            .into_iter()
            .filter(|r| r.form_id == form_id)
            .collect()
    }

    #[must_use]
    pub fn count_for_form(&self, form_id: &str) -> usize {
        self.responses()
            .iter()
            .filter(|r| r.form_id == form_id)
            .count()
    }

    pub fn delete_response(&self, id: &str) {
        self.collection().delete(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Answers;
    use crate::storage::{MemoryStorage, UnavailableStorage};
    use crate::templates::builtin_template;

    fn memory() -> Arc<dyn StorageBackend> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn save_form_stamps_updated_at_and_upserts() {
        let repo = FormRepository::new(memory());
        let mut form = FormSchema::blank();
        form.updated_at = form.created_at - chrono::Duration::hours(1);

        let stored = repo.save_form(&form);
        assert!(stored.updated_at > form.updated_at);

        form.title = "Renamed".into();
        repo.save_form(&form);

        let forms = repo.forms();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].title, "Renamed");
        assert_eq!(repo.form_by_id(&form.id).map(|f| f.title), Some("Renamed".into()));
    }

    #[test]
    fn delete_form_removes_only_target() {
        let repo = FormRepository::new(memory());
        let a = FormSchema::blank();
        let b = FormSchema::blank();
        repo.save_form(&a);
        repo.save_form(&b);

        repo.delete_form(&a.id);

        let ids: Vec<_> = repo.forms().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![b.id]);
    }

    #[test]
    fn templates_roundtrip() {
        let repo = FormRepository::new(memory());
        let template = builtin_template("event-registration").unwrap();
        repo.save_template(&template);
        repo.save_template(&template);
        assert_eq!(repo.templates(), vec![template]);
    }

    #[test]
    fn responses_filter_by_form() {
        let repo = ResponseRepository::new(memory());
        repo.save_response(&FormResponse::new("f1", Answers::new(), None));
        repo.save_response(&FormResponse::new("f2", Answers::new(), None));
        repo.save_response(&FormResponse::new("f1", Answers::new(), None));

        assert_eq!(repo.responses().len(), 3);
        assert_eq!(repo.responses_for_form("f1").len(), 2);
        assert_eq!(repo.count_for_form("f2"), 1);
        assert_eq!(repo.count_for_form("f3"), 0);
    }

    #[test]
    fn delete_response_by_id() {
        let repo = ResponseRepository::new(memory());
        let keep = FormResponse::new("f1", Answers::new(), None);
        let gone = FormResponse::new("f1", Answers::new(), None);
        repo.save_response(&keep);
        repo.save_response(&gone);

        repo.delete_response(&gone.id);

        assert_eq!(repo.responses(), vec![keep]);
    }

    #[test]
    fn repositories_share_a_backend() {
        let backend = memory();
        let forms = FormRepository::new(Arc::clone(&backend));
        let responses = ResponseRepository::new(backend);

        let form = FormSchema::blank();
        forms.save_form(&form);
        responses.save_response(&FormResponse::new(form.id.clone(), Answers::new(), None));

        assert_eq!(forms.forms().len(), 1);
        assert_eq!(responses.count_for_form(&form.id), 1);
    }

    #[test]
    fn unavailable_backend_behaves_like_cold_start() {
        let backend: Arc<dyn StorageBackend> = Arc::new(UnavailableStorage);
        let forms = FormRepository::new(Arc::clone(&backend));
        let responses = ResponseRepository::new(backend);

        let form = FormSchema::blank();
        forms.save_form(&form);
        responses.save_response(&FormResponse::new(form.id.clone(), Answers::new(), None));

        assert!(forms.forms().is_empty());
        assert!(forms.form_by_id(&form.id).is_none());
        assert_eq!(responses.count_for_form(&form.id), 0);
    }
}
