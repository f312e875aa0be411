#![forbid(unsafe_code)]

//! Debounced autosave timer.
//!
//! [`AutosaveTimer`] holds at most one [`PendingSave`]. Every
//! [`schedule`](AutosaveTimer::schedule) supersedes the previous one, so a
//! burst of edits produces a single save once input has been quiet for the
//! configured delay. The timer is poll-driven: the host's event loop calls
//! [`poll`](AutosaveTimer::poll) with the current instant.
//!
//! ```text
//!  edit   edit     edit                     poll
//!   │      │        │◄──────── delay ───────►│
//!   ▼      ▼        ▼                        ▼
//! [g1]─x [g2]─x   [g3]──────────────────► fire(g3)
//!  (each schedule cancels the previous generation)
//! ```

use web_time::{Duration, Instant};

/// Handle for one scheduled save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSave {
    /// Monotonic counter; a newer schedule always has a larger generation.
    pub generation: u64,
    /// Earliest instant at which the save may fire.
    pub deadline: Instant,
}

/// Restartable single-shot debounce timer.
#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    delay: Duration,
    pending: Option<PendingSave>,
    generation: u64,
}

impl AutosaveTimer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The save currently waiting to fire, if any.
    #[must_use]
    pub fn pending(&self) -> Option<PendingSave> {
        self.pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedule a save `delay` after `now`, cancelling any pending one.
    pub fn schedule(&mut self, now: Instant) -> PendingSave {
        self.generation += 1;
        let next = PendingSave {
            generation: self.generation,
            deadline: now + self.delay,
        };
        if let Some(prev) = self.pending.replace(next) {
            tracing::trace!(
                cancelled = prev.generation,
                generation = next.generation,
                "autosave rescheduled"
            );
        }
        next
    }

    /// Drop the pending save without firing it.
    pub fn cancel(&mut self) -> Option<PendingSave> {
        self.pending.take()
    }

    /// Fire the pending save if its deadline has passed.
    ///
    /// Each scheduled save fires at most once.
    pub fn poll(&mut self, now: Instant) -> Option<PendingSave> {
        match self.pending {
            Some(pending) if now >= pending.deadline => self.pending.take(),
            _ => None,
        }
    }

    /// Time left until the pending save fires.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|p| p.deadline.saturating_duration_since(now))
    }
}
