//! Bounded-lifetime highlighting of recently arrived records.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::types::RecordId;

/// Set of "recently arrived" ids, each with an independent expiry deadline.
///
/// Deadlines are passive data: nothing fires on its own, so tearing the view
/// down is a [`FreshSet::clear`] and no expiry can land in a destroyed
/// context. The owning session polls [`FreshSet::next_deadline`] for its
/// wakeup timer.
#[derive(Debug, Clone)]
pub struct FreshSet {
    window: Duration,
    deadlines: HashMap<RecordId, Instant>,
}

impl FreshSet {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadlines: HashMap::new(),
        }
    }

    /// Mark `id` fresh as of `now`. Re-marking an already-fresh id resets its
    /// deadline to the full window — most recent arrival wins, deadlines
    /// never stack.
    pub fn mark(&mut self, id: RecordId, now: Instant) {
        self.deadlines.insert(id, now + self.window);
    }

    pub fn is_fresh(&self, id: RecordId, now: Instant) -> bool {
        self.deadlines.get(&id).is_some_and(|deadline| *deadline > now)
    }

    /// Drop every entry whose deadline has elapsed.
    pub fn purge(&mut self, now: Instant) {
        self.deadlines.retain(|_, deadline| *deadline > now);
    }

    /// Earliest pending expiry, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Ids still fresh at `now`, sorted for deterministic output.
    pub fn fresh_ids(&self, now: Instant) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline > now)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Cancel all pending expiries. Called on view teardown.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
