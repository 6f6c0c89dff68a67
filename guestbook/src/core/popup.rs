//! One-at-a-time notification presentation for newly arrived wishes.
//!
//! The queue serializes arrivals: at most one wish is displayed at a time,
//! strictly in arrival order, each for the full configured duration. Bursts
//! back up in the queue rather than being dropped or time-compressed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::types::Wish;

#[derive(Debug, Clone)]
struct Displaying {
    wish: Wish,
    until: Instant,
}

/// FIFO popup queue: `Idle` ⇄ `Displaying`, driven by [`PopupQueue::advance`].
///
/// Deadlines are plain data; the owning session turns the value returned by
/// [`PopupQueue::next_deadline`] into a timer and calls `advance` again when
/// it fires, so teardown only needs [`PopupQueue::clear`].
#[derive(Debug, Clone)]
pub struct PopupQueue {
    display_for: Duration,
    queue: VecDeque<Wish>,
    current: Option<Displaying>,
}

impl PopupQueue {
    pub fn new(display_for: Duration) -> Self {
        Self {
            display_for,
            queue: VecDeque::new(),
            current: None,
        }
    }

    /// Enqueue a newly arrived wish. Call [`PopupQueue::advance`] afterwards;
    /// the queue never starts displaying on its own.
    pub fn push(&mut self, wish: Wish) {
        self.queue.push_back(wish);
    }

    /// Re-evaluate the state machine at `now`. Returns whether the visible
    /// popup changed (started, rotated to the next entry, or ended).
    ///
    /// The display window is measured from the moment an entry actually
    /// becomes visible, so a late wakeup never shortens a popup.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if let Some(current) = &self.current
            && current.until <= now
        {
            self.current = None;
            changed = true;
        }
        if self.current.is_none()
            && let Some(next) = self.queue.pop_front()
        {
            self.current = Some(Displaying {
                wish: next,
                until: now + self.display_for,
            });
            changed = true;
        }
        changed
    }

    /// The wish currently displayed, if any.
    pub fn current(&self) -> Option<&Wish> {
        self.current.as_ref().map(|d| &d.wish)
    }

    /// When the current display period ends. `None` while idle.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|d| d.until)
    }

    /// Entries waiting behind the current display.
    pub fn backlog(&self) -> usize {
        self.queue.len()
    }

    /// Drop the queue and the current display. Called on view teardown.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.current = None;
    }
}
