#![forbid(unsafe_code)]

//! The editing session.
//!
//! An [`EditingSession`] is one user editing one form. It owns the undo
//! history, the autosave timer, the persistence handle and the keyboard
//! registration, and routes every document change through a single commit
//! path:
//!
//! ```text
//! edit op ──► clone current ──► mutate ──► commit ──► history.set
//!                                                 └─► autosave.schedule
//! undo/redo ──► history.undo/redo ──► (moved?) ──► autosave.schedule
//! tick(now) ──► autosave.poll ──► (fired + has content?) ──► save_form
//! ```
//!
//! Time is passed in explicitly so the host decides what "now" is.

use std::sync::Arc;

use chrono::Utc;
use formkit_history::History;
use formkit_store::{
    FieldType, FormField, FormRepository, FormSchema, FormStep, FormTemplate, ResponseRepository,
    StorageBackend, export,
};
use web_time::Instant;

use crate::autosave::{AutosaveTimer, PendingSave};
use crate::config::SessionConfig;
use crate::keyboard::{HistoryAction, KeyChord, KeyboardHub, ListenerGuard, resolve_chord};

/// One open form editor.
#[derive(Debug)]
pub struct EditingSession {
    history: History<FormSchema>,
    autosave: AutosaveTimer,
    forms: FormRepository,
    keys: ListenerGuard,
    selected_field: Option<String>,
    current_step: usize,
}

impl EditingSession {
    /// Open a session on a blank form.
    pub fn start(
        storage: Arc<dyn StorageBackend>,
        keyboard: &KeyboardHub,
        config: &SessionConfig,
    ) -> Self {
        Self::start_with(storage, keyboard, config, FormSchema::blank())
    }

    /// Open a session on an existing document.
    ///
    /// The document becomes the only history entry; nothing is scheduled.
    pub fn start_with(
        storage: Arc<dyn StorageBackend>,
        keyboard: &KeyboardHub,
        config: &SessionConfig,
        mut document: FormSchema,
    ) -> Self {
        document.sync_steps();
        let keys = keyboard.register();
        tracing::debug!(
            form_id = %document.id,
            listener_id = keys.id(),
            backend = storage.name(),
            "editing session started"
        );
        Self {
            history: History::with_config(document, config.history_config()),
            autosave: AutosaveTimer::new(config.autosave_delay),
            forms: FormRepository::new(storage),
            keys,
            selected_field: None,
            current_step: 0,
        }
    }

    /// Close the session, flushing a pending autosave.
    ///
    /// Returns whether anything was written. Dropping the session instead
    /// discards the pending save.
    pub fn end(mut self) -> bool {
        let saved = self.autosave.cancel().is_some() && self.save_if_content();
        tracing::debug!(form_id = %self.document().id, saved, "editing session ended");
        saved
    }

    // ========================================================================
    // Commit path
    // ========================================================================

    fn commit(&mut self, mut document: FormSchema, now: Instant) {
        document.updated_at = Utc::now();
        document.sync_steps();
        self.history.set(document);
        self.autosave.schedule(now);
        tracing::debug!(
            cursor = self.history.cursor(),
            len = self.history.len(),
            "document committed"
        );
    }

    /// Apply `f` to a copy of the current document and commit it when `f`
    /// returns `Some`.
    fn edit<R>(&mut self, now: Instant, f: impl FnOnce(&mut FormSchema) -> Option<R>) -> Option<R> {
        let mut document = FormSchema::clone(self.history.current());
        let out = f(&mut document)?;
        self.commit(document, now);
        Some(out)
    }

    fn replace(&mut self, mut document: FormSchema, now: Instant) {
        document.sync_steps();
        tracing::debug!(form_id = %document.id, "document replaced");
        self.history.reset(document);
        self.selected_field = None;
        self.current_step = 0;
        self.autosave.schedule(now);
    }

    // ========================================================================
    // Editing operations
    // ========================================================================

    pub fn set_title(&mut self, title: impl Into<String>, now: Instant) {
        let title = title.into();
        self.edit(now, |doc| {
            doc.title = title;
            Some(())
        });
    }

    pub fn set_description(&mut self, description: impl Into<String>, now: Instant) {
        let description = description.into();
        self.edit(now, |doc| {
            doc.description = Some(description);
            Some(())
        });
    }

    /// Append a palette field to the current step and select it.
    pub fn add_field(&mut self, field_type: FieldType, now: Instant) -> String {
        let field = FormField::from_palette(field_type, self.current_step);
        let id = field.id.clone();
        self.edit(now, |doc| {
            doc.fields.push(field);
            Some(())
        });
        self.selected_field = Some(id.clone());
        id
    }

    /// Replace the field with the same id. Unknown ids are ignored.
    pub fn update_field(&mut self, field: FormField, now: Instant) -> bool {
        self.edit(now, |doc| {
            let index = doc.field_index(&field.id)?;
            doc.fields[index] = field;
            Some(())
        })
        .is_some()
    }

    pub fn delete_field(&mut self, id: &str, now: Instant) -> bool {
        let deleted = self
            .edit(now, |doc| {
                let index = doc.field_index(id)?;
                doc.fields.remove(index);
                Some(())
            })
            .is_some();
        if deleted && self.selected_field.as_deref() == Some(id) {
            self.selected_field = None;
        }
        deleted
    }

    /// Move the field `from_id` to the position currently held by `to_id`.
    pub fn move_field(&mut self, from_id: &str, to_id: &str, now: Instant) -> bool {
        self.edit(now, |doc| {
            let from = doc.field_index(from_id)?;
            let to = doc.field_index(to_id)?;
            if from == to {
                return None;
            }
            let field = doc.fields.remove(from);
            doc.fields.insert(to, field);
            Some(())
        })
        .is_some()
    }

    /// Toggle multi-step mode.
    ///
    /// Enabling a single-step form adds a second step. Disabling collapses
    /// everything onto the first step.
    pub fn set_multi_step(&mut self, enabled: bool, now: Instant) {
        self.edit(now, |doc| {
            doc.is_multi_step = enabled;
            if enabled {
                if doc.steps.len() == 1 {
                    doc.steps.push(FormStep::new("Step 2"));
                }
            } else {
                doc.steps.truncate(1);
                for field in &mut doc.fields {
                    field.step = 0;
                }
            }
            Some(())
        });
        if !enabled {
            self.current_step = 0;
        }
    }

    pub fn add_step(&mut self, now: Instant) {
        self.edit(now, |doc| {
            let title = format!("Step {}", doc.steps.len() + 1);
            doc.steps.push(FormStep::new(title));
            Some(())
        });
    }

    /// Remove a step, moving its fields onto the previous one.
    ///
    /// The last remaining step cannot be removed.
    pub fn remove_step(&mut self, index: usize, now: Instant) -> bool {
        let removed = self
            .edit(now, |doc| {
                if doc.steps.len() <= 1 || index >= doc.steps.len() {
                    return None;
                }
                let target = index.saturating_sub(1);
                doc.steps.remove(index);
                for field in &mut doc.fields {
                    if field.step == index {
                        field.step = target;
                    } else if field.step > index {
                        field.step -= 1;
                    }
                }
                Some(())
            })
            .is_some();
        if removed && self.current_step >= index {
            self.current_step = self.current_step.saturating_sub(1);
        }
        removed
    }

    pub fn update_step_title(&mut self, index: usize, title: impl Into<String>, now: Instant) -> bool {
        let title = title.into();
        self.edit(now, |doc| {
            doc.steps.get_mut(index)?.title = title;
            Some(())
        })
        .is_some()
    }

    /// Start over from a fresh copy of `template`. History is discarded.
    pub fn load_template(&mut self, template: &FormTemplate, now: Instant) {
        self.replace(template.instantiate(), now);
    }

    /// Switch to editing `document`. History is discarded.
    pub fn open_form(&mut self, document: FormSchema, now: Instant) {
        self.replace(document, now);
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self, now: Instant) -> bool {
        let moved = self.history.undo().is_some();
        if moved {
            self.after_move(now);
        }
        moved
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        let moved = self.history.redo().is_some();
        if moved {
            self.after_move(now);
        }
        moved
    }

    fn after_move(&mut self, now: Instant) {
        self.clamp_current_step();
        self.autosave.schedule(now);
        tracing::trace!(
            cursor = self.history.cursor(),
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "history moved"
        );
    }

    fn clamp_current_step(&mut self) {
        let last = self.document().steps.len().saturating_sub(1);
        self.current_step = self.current_step.min(last);
    }

    /// Apply an undo/redo shortcut.
    ///
    /// Returns the action only if the history actually moved.
    pub fn handle_key(&mut self, chord: KeyChord, now: Instant) -> Option<HistoryAction> {
        let action = resolve_chord(&chord)?;
        let moved = match action {
            HistoryAction::Undo => self.undo(now),
            HistoryAction::Redo => self.redo(now),
        };
        moved.then_some(action)
    }

    /// Apply every chord delivered through the keyboard hub since the last
    /// call. Returns the actions performed, oldest first.
    pub fn process_keys(&mut self, now: Instant) -> Vec<HistoryAction> {
        self.keys
            .drain()
            .into_iter()
            .filter_map(|chord| self.handle_key(chord, now))
            .collect()
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Drive the autosave timer. Returns whether the document was saved.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.autosave.poll(now) {
            Some(fired) => {
                tracing::trace!(generation = fired.generation, "autosave fired");
                self.save_if_content()
            }
            None => false,
        }
    }

    /// Save immediately, cancelling any pending autosave.
    pub fn save_now(&mut self) -> FormSchema {
        self.autosave.cancel();
        self.forms.save_form(self.document())
    }

    fn save_if_content(&self) -> bool {
        let document = self.document();
        if !document.has_content() {
            tracing::trace!(form_id = %document.id, "autosave skipped for untouched form");
            return false;
        }
        self.forms.save_form(document);
        true
    }

    #[must_use]
    pub fn pending_autosave(&self) -> Option<PendingSave> {
        self.autosave.pending()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn document(&self) -> &FormSchema {
        self.history.current()
    }

    #[must_use]
    pub fn history(&self) -> &History<FormSchema> {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn forms(&self) -> &FormRepository {
        &self.forms
    }

    /// The selected field as it exists in the current document.
    #[must_use]
    pub fn selected_field(&self) -> Option<&FormField> {
        self.document().field(self.selected_field.as_deref()?)
    }

    /// Select a field by id, or clear the selection with `None`.
    ///
    /// Returns false when the id is not in the current document.
    pub fn select_field(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selected_field = None;
                true
            }
            Some(id) if self.document().field(id).is_some() => {
                self.selected_field = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Navigate to a step, clamped to the existing range.
    pub fn set_current_step(&mut self, step: usize) {
        self.current_step = step;
        self.clamp_current_step();
    }

    #[must_use]
    pub fn listener_id(&self) -> u64 {
        self.keys.id()
    }

    // ========================================================================
    // Export
    // ========================================================================

    #[must_use]
    pub fn export_json(&self) -> String {
        export::form_json(self.document())
    }

    #[must_use]
    pub fn export_file_name(&self) -> String {
        export::form_file_name(&self.document().title)
    }

    #[must_use]
    pub fn share_url(&self, base: &str) -> String {
        export::share_url(base, &self.document().id)
    }

    #[must_use]
    pub fn response_count(&self, responses: &ResponseRepository) -> usize {
        responses.count_for_form(&self.document().id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::Modifiers;
    use formkit_store::{FormResponse, MemoryStorage, builtin_template};
    use web_time::Duration;

    fn session() -> (EditingSession, Arc<MemoryStorage>, KeyboardHub) {
        let storage = Arc::new(MemoryStorage::new());
        let hub = KeyboardHub::new();
        let session = EditingSession::start(storage.clone(), &hub, &SessionConfig::default());
        (session, storage, hub)
    }

    #[test]
    fn starts_blank_without_history() {
        let (s, _, hub) = session();
        assert_eq!(s.document().title, "New Form");
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert!(s.pending_autosave().is_none());
        assert_eq!(hub.listener_count(), 1);
    }

    #[test]
    fn each_edit_is_one_snapshot() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        s.set_title("Survey", now);
        s.set_description("Tell us", now);
        let id = s.add_field(FieldType::Select, now);

        assert_eq!(s.history().len(), 4);
        assert_eq!(s.selected_field().map(|f| f.id.as_str()), Some(id.as_str()));
        let field = s.selected_field().unwrap();
        assert_eq!(field.label, "Select Field");
        assert_eq!(field.options.as_ref().map(Vec::len), Some(2));
        assert_eq!(s.document().steps[0].fields, vec![id]);
    }

    #[test]
    fn undo_redo_walk_the_history() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        s.set_title("A", now);
        s.set_title("B", now);

        assert!(s.undo(now));
        assert_eq!(s.document().title, "A");
        assert!(s.undo(now));
        assert_eq!(s.document().title, "New Form");
        assert!(!s.undo(now));
        assert!(s.redo(now));
        assert_eq!(s.document().title, "A");

        s.set_title("C", now);
        assert!(!s.can_redo());
        assert!(!s.redo(now));
    }

    #[test]
    fn update_and_delete_field() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        let id = s.add_field(FieldType::Text, now);

        let mut field = s.document().field(&id).unwrap().clone();
        field.label = "Full name".into();
        field.required = true;
        assert!(s.update_field(field, now));
        assert_eq!(s.document().field(&id).unwrap().label, "Full name");

        let len = s.history().len();
        assert!(!s.update_field(FormField::from_palette(FieldType::Text, 0), now));
        assert!(!s.delete_field("missing", now));
        assert_eq!(s.history().len(), len);

        assert!(s.delete_field(&id, now));
        assert!(s.document().fields.is_empty());
        assert!(s.selected_field().is_none());
    }

    #[test]
    fn move_field_reorders() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        let a = s.add_field(FieldType::Text, now);
        let b = s.add_field(FieldType::Email, now);
        let c = s.add_field(FieldType::Phone, now);

        assert!(s.move_field(&a, &c, now));
        let order: Vec<_> = s.document().fields.iter().map(|f| f.id.clone()).collect();
        assert_eq!(order, vec![b.clone(), c.clone(), a.clone()]);

        let len = s.history().len();
        assert!(!s.move_field(&a, &a, now));
        assert!(!s.move_field(&a, "nope", now));
        assert_eq!(s.history().len(), len);
    }

    #[test]
    fn multi_step_toggle_is_one_commit() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        s.set_multi_step(true, now);
        assert_eq!(s.history().len(), 2);
        assert!(s.document().is_multi_step);
        assert_eq!(s.document().steps.len(), 2);
        assert_eq!(s.document().steps[1].title, "Step 2");

        s.set_current_step(1);
        let id = s.add_field(FieldType::Date, now);
        assert_eq!(s.document().field(&id).unwrap().step, 1);

        s.set_multi_step(false, now);
        assert_eq!(s.history().len(), 4);
        assert_eq!(s.document().steps.len(), 1);
        assert_eq!(s.document().field(&id).unwrap().step, 0);
        assert_eq!(s.current_step(), 0);
    }

    #[test]
    fn remove_step_moves_fields_back() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        s.set_multi_step(true, now);
        s.add_step(now);
        assert_eq!(s.document().steps[2].title, "Step 3");

        s.set_current_step(1);
        let mid = s.add_field(FieldType::Text, now);
        s.set_current_step(2);
        let last = s.add_field(FieldType::Number, now);

        assert!(s.remove_step(1, now));
        let doc = s.document();
        assert_eq!(doc.steps.len(), 2);
        assert_eq!(doc.field(&mid).unwrap().step, 0);
        assert_eq!(doc.field(&last).unwrap().step, 1);
        assert_eq!(doc.steps[0].fields, vec![mid]);
        assert_eq!(s.current_step(), 1);
    }

    #[test]
    fn last_step_cannot_be_removed() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        assert!(!s.remove_step(0, now));
        assert!(!s.remove_step(4, now));
        assert!(!s.can_undo());
    }

    #[test]
    fn update_step_title() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        assert!(s.update_step_title(0, "Basics", now));
        assert_eq!(s.document().steps[0].title, "Basics");
        assert!(!s.update_step_title(3, "Nope", now));
    }

    #[test]
    fn undo_clamps_current_step() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        s.set_multi_step(true, now);
        s.set_current_step(1);
        assert!(s.undo(now));
        assert_eq!(s.current_step(), 0);
    }

    #[test]
    fn set_current_step_clamps() {
        let (mut s, _, _) = session();
        s.set_current_step(9);
        assert_eq!(s.current_step(), 0);
    }

    #[test]
    fn load_template_resets_history() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        let id = s.add_field(FieldType::Text, now);
        assert!(s.select_field(Some(&id)));

        let template = builtin_template("contact-us").unwrap();
        s.load_template(&template, now);

        assert_eq!(s.history().len(), 1);
        assert!(!s.can_undo());
        assert!(s.selected_field().is_none());
        assert_eq!(s.document().title, template.schema.title);
        assert!(s.pending_autosave().is_some());
    }

    #[test]
    fn select_field_requires_existing_id() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        let id = s.add_field(FieldType::Text, now);
        assert!(!s.select_field(Some("ghost")));
        assert_eq!(s.selected_field().map(|f| f.id.clone()), Some(id));
        assert!(s.select_field(None));
        assert!(s.selected_field().is_none());
    }

    #[test]
    fn selection_follows_undo() {
        let (mut s, _, _) = session();
        let now = Instant::now();
        s.add_field(FieldType::Text, now);
        assert!(s.undo(now));
        assert!(s.selected_field().is_none());
        assert!(s.redo(now));
        assert!(s.selected_field().is_some());
    }

    #[test]
    fn autosave_waits_for_quiet_period() {
        let (mut s, storage, _) = session();
        let t0 = Instant::now();
        s.set_title("Draft", t0);
        s.set_title("Draft 2", t0 + Duration::from_millis(500));

        assert!(!s.tick(t0 + Duration::from_millis(1000)));
        assert!(storage.is_empty());
        assert!(s.tick(t0 + Duration::from_millis(1500)));

        let saved = s.forms().form_by_id(&s.document().id).unwrap();
        assert_eq!(saved.title, "Draft 2");
        assert!(!s.tick(t0 + Duration::from_millis(5000)));
    }

    #[test]
    fn autosave_skips_untouched_form() {
        let (mut s, storage, _) = session();
        let t0 = Instant::now();
        s.set_title("Draft", t0);
        assert!(s.undo(t0));
        assert!(!s.tick(t0 + Duration::from_secs(2)));
        assert!(storage.is_empty());
    }

    #[test]
    fn save_now_cancels_pending() {
        let (mut s, _, _) = session();
        let t0 = Instant::now();
        s.set_title("Now", t0);
        let stored = s.save_now();
        assert_eq!(stored.title, "Now");
        assert!(s.pending_autosave().is_none());
        assert!(!s.tick(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn end_flushes_and_deregisters() {
        let (mut s, storage, hub) = session();
        s.set_title("Unsaved", Instant::now());
        let forms = FormRepository::new(storage);
        let id = s.document().id.clone();

        assert!(s.end());
        assert_eq!(forms.form_by_id(&id).map(|f| f.title), Some("Unsaved".into()));
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn drop_discards_pending() {
        let (mut s, storage, hub) = session();
        s.set_title("Lost", Instant::now());
        drop(s);
        assert!(storage.is_empty());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn shortcuts_drive_history() {
        let (mut s, _, hub) = session();
        let now = Instant::now();
        s.set_title("A", now);

        let undo = KeyChord::new('z').with_modifiers(Modifiers::CTRL);
        let redo = KeyChord::new('Z')
            .with_modifiers(Modifiers::SUPER | Modifiers::SHIFT);
        assert_eq!(s.handle_key(undo, now), Some(HistoryAction::Undo));
        assert_eq!(s.handle_key(undo, now), None);
        assert_eq!(s.handle_key(KeyChord::new('z'), now), None);

        hub.press(redo);
        hub.press(redo);
        assert_eq!(s.process_keys(now), vec![HistoryAction::Redo]);
        assert_eq!(s.document().title, "A");
    }

    #[test]
    fn export_helpers_use_current_document() {
        let (mut s, storage, _) = session();
        let now = Instant::now();
        s.set_title("Job  Application", now);

        assert_eq!(s.export_file_name(), "Job_Application.json");
        let parsed: FormSchema = serde_json::from_str(&s.export_json()).unwrap();
        assert_eq!(parsed.title, "Job  Application");
        assert_eq!(
            s.share_url("https://forms.example/"),
            format!("https://forms.example/form/{}", s.document().id)
        );

        let responses = ResponseRepository::new(storage);
        assert_eq!(s.response_count(&responses), 0);
        responses.save_response(&FormResponse::new(
            s.document().id.clone(),
            Default::default(),
            None,
        ));
        responses.save_response(&FormResponse::new("other", Default::default(), None));
        assert_eq!(s.response_count(&responses), 1);
    }

    #[test]
    fn bounded_history_from_config() {
        let storage = Arc::new(MemoryStorage::new());
        let hub = KeyboardHub::new();
        let config = SessionConfig::default().with_history_capacity(3);
        let mut s = EditingSession::start(storage, &hub, &config);
        let now = Instant::now();
        for i in 0..10 {
            s.set_title(format!("T{i}"), now);
        }
        assert_eq!(s.history().len(), 3);
        assert!(s.undo(now));
        assert!(s.undo(now));
        assert!(!s.undo(now));
        assert_eq!(s.document().title, "T7");
    }
}
