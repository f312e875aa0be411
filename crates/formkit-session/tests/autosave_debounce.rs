//! Debounced autosave through the session.

use std::sync::Arc;

use formkit_session::{AutosaveTimer, EditingSession, KeyboardHub, SessionConfig};
use formkit_store::{FormRepository, MemoryStorage, StorageBackend};
use proptest::prelude::*;
use web_time::{Duration, Instant};

const DELAY: Duration = Duration::from_millis(1000);

fn open(storage: Arc<dyn StorageBackend>) -> EditingSession {
    let config = SessionConfig::default().with_autosave_delay(DELAY);
    EditingSession::start(storage, &KeyboardHub::new(), &config)
}

proptest! {
    /// A burst of schedules yields exactly one fire, for the last one.
    #[test]
    fn burst_fires_once(gaps in prop::collection::vec(0u64..900, 1..40)) {
        let mut timer = AutosaveTimer::new(DELAY);
        let t0 = Instant::now();
        let mut at = t0;
        let mut fired = 0;
        let mut last = None;
        for gap in gaps {
            at += Duration::from_millis(gap);
            fired += usize::from(timer.poll(at).is_some());
            last = Some(timer.schedule(at));
        }
        prop_assert_eq!(fired, 0);

        let last = last.unwrap();
        prop_assert_eq!(timer.poll(last.deadline), Some(last));
        prop_assert!(timer.poll(last.deadline + DELAY * 5).is_none());
    }

    /// The saved document is the one current when the timer fires.
    #[test]
    fn saves_latest_title(titles in prop::collection::vec("[a-z]{1,8}", 1..12)) {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let forms = FormRepository::new(Arc::clone(&storage));
        let mut session = open(storage);
        let t0 = Instant::now();
        let mut at = t0;
        for title in &titles {
            session.set_title(title.clone(), at);
            at += Duration::from_millis(100);
        }
        prop_assert!(!session.tick(at));
        prop_assert!(forms.forms().is_empty());

        prop_assert!(session.tick(at + DELAY));
        let saved = forms.forms();
        prop_assert_eq!(saved.len(), 1);
        prop_assert_eq!(&saved[0].title, titles.last().unwrap());
    }
}

#[test]
fn undo_reschedules_with_current_document() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let forms = FormRepository::new(Arc::clone(&storage));
    let mut session = open(storage);
    let t0 = Instant::now();

    session.set_title("First", t0);
    session.set_title("Second", t0);
    assert!(session.undo(t0 + Duration::from_millis(800)));

    assert!(!session.tick(t0 + DELAY));
    assert!(session.tick(t0 + Duration::from_millis(1800)));
    assert_eq!(forms.forms()[0].title, "First");
}

#[test]
fn boundary_undo_does_not_reschedule() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let mut session = open(storage);
    let t0 = Instant::now();

    session.set_title("Only", t0);
    let pending = session.pending_autosave().expect("scheduled");
    assert!(!session.redo(t0 + Duration::from_millis(500)));
    assert_eq!(session.pending_autosave(), Some(pending));
}

#[test]
fn repeated_saves_upsert_one_record() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let forms = FormRepository::new(Arc::clone(&storage));
    let mut session = open(storage);
    let mut at = Instant::now();

    for title in ["One", "Two", "Three"] {
        session.set_title(title, at);
        at += DELAY;
        assert!(session.tick(at));
    }
    let saved = forms.forms();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "Three");
    assert!(saved[0].updated_at >= saved[0].created_at);
}
