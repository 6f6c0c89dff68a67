//! Deterministic view state for the live wish wall.
//!
//! One `LiveWall` belongs to exactly one wall view. It merges the bulk
//! snapshot and incremental wish events, serializes new arrivals through the
//! popup queue, tracks freshness highlights, and partitions the collection
//! into marquee lanes by arrival order.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::cache::{Merge, Snapshot};
use crate::core::fresh::FreshSet;
use crate::core::lanes::{ScrollDirection, loop_repeats, split_lanes};
use crate::core::popup::PopupQueue;
use crate::core::types::{RecordId, Wish};
use crate::io::config::GuestbookConfig;
use crate::io::store::Change;

/// One marquee lane of the wall, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct LaneView {
    pub index: usize,
    pub direction: ScrollDirection,
    /// How many times the renderer repeats `wishes` per marquee cycle.
    pub repeats: usize,
    pub wishes: Vec<Wish>,
}

/// Serializable snapshot of the wall for a presentation collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct WallView {
    /// `false` until a bulk load has succeeded (or after one has failed).
    pub available: bool,
    pub total: usize,
    /// Full collection in arrival order.
    pub wishes: Vec<Wish>,
    pub lanes: Vec<LaneView>,
    /// The one popup currently displaying, if any.
    pub popup: Option<Wish>,
    /// Ids still inside their highlight window.
    pub fresh: Vec<RecordId>,
}

#[derive(Debug)]
pub struct LiveWall {
    cache: Snapshot<Wish>,
    popups: PopupQueue,
    fresh: FreshSet,
    lane_count: usize,
    available: bool,
}

impl LiveWall {
    pub fn new(config: &GuestbookConfig) -> Self {
        Self {
            cache: Snapshot::new(),
            popups: PopupQueue::new(config.popup_duration()),
            fresh: FreshSet::new(config.highlight_window()),
            lane_count: config.lane_count,
            available: false,
        }
    }

    /// Replace the snapshot with a bulk load. Pending popups and highlights
    /// are kept: a resync must not replay old arrivals as new ones.
    pub fn load(&mut self, rows: Vec<Wish>) {
        self.cache.load(rows);
        self.available = true;
    }

    /// The bulk load failed: serve an explicitly-unavailable empty wall and
    /// keep merging stream events as they arrive.
    pub fn mark_unavailable(&mut self) {
        self.available = false;
        self.cache.clear();
    }

    pub fn available(&self) -> bool {
        self.available
    }

    /// Merge one stream event. Returns the id when a genuinely new wish was
    /// appended; duplicate inserts are ignored.
    pub fn apply(&mut self, change: Change<Wish>, now: Instant) -> Option<RecordId> {
        match change {
            Change::Inserted(wish) => {
                let id = wish.id;
                if self.cache.insert(wish.clone()) {
                    self.fresh.mark(id, now);
                    self.popups.push(wish);
                    Some(id)
                } else {
                    debug!(id = %id, "duplicate wish insert event ignored");
                    None
                }
            }
            Change::Updated(wish) => {
                // Wishes are immutable in practice; merge defensively anyway.
                let id = wish.id;
                if self.cache.update(wish) == Merge::Appended {
                    warn!(id = %id, "update for unknown wish appended, cache may have a gap");
                }
                None
            }
        }
    }

    /// Advance timers: rotate the popup queue and expire highlights.
    /// Returns whether the visible popup changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let popup_changed = self.popups.advance(now);
        self.fresh.purge(now);
        popup_changed
    }

    /// Earliest pending timer deadline across popup and highlights.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.popups.next_deadline(), self.fresh.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Full collection in arrival order.
    pub fn wishes(&self) -> &[Wish] {
        self.cache.rows()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn current_popup(&self) -> Option<&Wish> {
        self.popups.current()
    }

    pub fn is_fresh(&self, id: RecordId, now: Instant) -> bool {
        self.fresh.is_fresh(id, now)
    }

    /// Arrival-order partition into marquee lanes.
    pub fn lanes(&self) -> Vec<Vec<&Wish>> {
        split_lanes(self.cache.rows(), self.lane_count)
    }

    pub fn view(&self, now: Instant) -> WallView {
        let lanes = self
            .lanes()
            .into_iter()
            .enumerate()
            .map(|(index, wishes)| LaneView {
                index,
                direction: ScrollDirection::for_lane(index),
                repeats: loop_repeats(wishes.len()),
                wishes: wishes.into_iter().cloned().collect(),
            })
            .collect();
        WallView {
            available: self.available,
            total: self.cache.len(),
            wishes: self.cache.rows().to_vec(),
            lanes,
            popup: self.current_popup().cloned(),
            fresh: self.fresh.fresh_ids(now),
        }
    }

    /// Teardown: cancel the popup backlog and every pending highlight.
    pub fn reset(&mut self) {
        self.popups.clear();
        self.fresh.clear();
    }
}
