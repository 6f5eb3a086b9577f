//! Timer-coalescing queue for mutation records.

use std::time::{Duration, Instant};

/// Collects items until the input has been quiet for `window`, or until `max_delay` has passed
/// since the first pending item, whichever comes first. Nothing pushed is ever dropped except
/// by [`Debouncer::cancel`].
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    max_delay: Duration,
    pending: Vec<T>,

    /// When the first pending item arrived. Reset when the batch is taken.
    first_push: Option<Instant>,

    /// When the most recent item arrived.
    last_push: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration, max_delay: Duration) -> Self {
        Self {
            window,
            max_delay: max_delay.max(window),
            pending: Vec::new(),
            first_push: None,
            last_push: None,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue items. Pushing nothing does not restart the window.
    pub fn push(&mut self, items: impl IntoIterator<Item = T>, now: Instant) {
        let before = self.pending.len();
        self.pending.extend(items);
        if self.pending.len() == before {
            return;
        }
        self.last_push = Some(now);
        if self.first_push.is_none() {
            self.first_push = Some(now);
        }
    }

    /// When the pending batch becomes due, if anything is pending.
    pub fn deadline(&self) -> Option<Instant> {
        let quiet = self.last_push? + self.window;
        let capped = self.first_push? + self.max_delay;
        Some(quiet.min(capped))
    }

    /// Take the pending batch if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<Vec<T>> {
        if self.deadline()? > now {
            return None;
        }
        Some(self.take())
    }

    /// Take the pending batch regardless of the deadline.
    pub fn take(&mut self) -> Vec<T> {
        self.first_push = None;
        self.last_push = None;
        std::mem::take(&mut self.pending)
    }

    /// Drop the pending batch. Returns how many items were dropped.
    pub fn cancel(&mut self) -> usize {
        self.take().len()
    }
}
