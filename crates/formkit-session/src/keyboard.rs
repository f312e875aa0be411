#![forbid(unsafe_code)]

//! Undo/redo keyboard shortcuts.
//!
//! # Bindings
//!
//! | Chord | Action |
//! |-------|--------|
//! | Ctrl+Z / Cmd+Z | [`HistoryAction::Undo`] |
//! | Ctrl+Shift+Z / Cmd+Shift+Z | [`HistoryAction::Redo`] |
//!
//! # Listener Lifecycle
//!
//! [`KeyboardHub`] stands in for the host window's global key listener list.
//! A session calls [`KeyboardHub::register`] when it starts and keeps the
//! returned [`ListenerGuard`]; dropping the guard deregisters it, so ended
//! sessions never keep receiving chords.
//!
//! ```
//! use formkit_session::keyboard::{KeyboardHub, KeyChord, Modifiers, HistoryAction, resolve_chord};
//!
//! let hub = KeyboardHub::new();
//! let guard = hub.register();
//! assert_eq!(hub.listener_count(), 1);
//!
//! let undo = KeyChord::new('z').with_modifiers(Modifiers::CTRL);
//! hub.press(undo);
//! assert_eq!(guard.drain(), vec![undo]);
//! assert_eq!(resolve_chord(&undo), Some(HistoryAction::Undo));
//!
//! drop(guard);
//! assert_eq!(hub.listener_count(), 0);
//! ```

use std::sync::mpsc;
use std::sync::{Arc, Mutex, Weak};

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a chord.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: char,
    pub modifiers: Modifiers,
}

impl KeyChord {
    #[must_use]
    pub const fn new(key: char) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// History movement requested by a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

/// Map a chord to a history action.
///
/// Ctrl or Super plus `z` undoes; adding Shift redoes. The key is matched
/// case-insensitively since hosts report Shift+z as `Z`. Chords involving
/// Alt are left to other handlers.
#[must_use]
pub fn resolve_chord(chord: &KeyChord) -> Option<HistoryAction> {
    let m = chord.modifiers;
    if !m.intersects(Modifiers::CTRL | Modifiers::SUPER) || m.contains(Modifiers::ALT) {
        return None;
    }
    if !chord.key.eq_ignore_ascii_case(&'z') {
        return None;
    }
    if m.contains(Modifiers::SHIFT) {
        Some(HistoryAction::Redo)
    } else {
        Some(HistoryAction::Undo)
    }
}

// ---------------------------------------------------------------------------
// Listener registry
// ---------------------------------------------------------------------------

/// Identifier of a registered listener.
pub type ListenerId = u64;

#[derive(Default)]
struct HubState {
    next_id: ListenerId,
    listeners: Vec<(ListenerId, mpsc::Sender<KeyChord>)>,
}

/// Host-wide list of key listeners.
///
/// Cloning yields another handle to the same list.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Arc<Mutex<HubState>>,
}

impl std::fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyboardHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. It stays registered until the guard is dropped.
    #[must_use = "dropping the guard immediately deregisters the listener"]
    pub fn register(&self) -> ListenerGuard {
        let (sender, receiver) = mpsc::channel();
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.next_id += 1;
        let id = state.next_id;
        state.listeners.push((id, sender));
        tracing::debug!(listener_id = id, "key listener registered");
        ListenerGuard {
            id,
            hub: Arc::downgrade(&self.inner),
            receiver,
        }
    }

    /// Deliver a chord to every registered listener.
    pub fn press(&self, chord: KeyChord) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state
            .listeners
            .retain(|(_, sender)| sender.send(chord).is_ok());
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .len()
    }

    #[must_use]
    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .iter()
            .any(|(lid, _)| *lid == id)
    }
}

/// Registration handle returned by [`KeyboardHub::register`].
pub struct ListenerGuard {
    id: ListenerId,
    hub: Weak<Mutex<HubState>>,
    receiver: mpsc::Receiver<KeyChord>,
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl ListenerGuard {
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Chords delivered since the last drain, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<KeyChord> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            let mut state = hub.lock().unwrap_or_else(|e| e.into_inner());
            state.listeners.retain(|(id, _)| *id != self.id);
            tracing::debug!(listener_id = self.id, "key listener deregistered");
        }
    }
}
