//! Deterministic view state for the guest roster.
//!
//! One `Roster` belongs to exactly one admin view. It merges the bulk
//! snapshot and incremental guest events, flags recent arrivals and check-in
//! changes as fresh, and recomputes statistics from the full snapshot on
//! every read.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::cache::{Merge, Snapshot};
use crate::core::fresh::FreshSet;
use crate::core::stats::{AttendanceStats, compute_stats};
use crate::core::types::{Guest, RecordId};
use crate::io::config::GuestbookConfig;
use crate::io::store::Change;

/// What an applied guest event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterDelta {
    Added(RecordId),
    Updated(RecordId),
}

/// Serializable snapshot of the roster for a presentation collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct RosterView {
    /// `false` until a bulk load has succeeded (or after one has failed).
    pub available: bool,
    /// Size of the full roster, ignoring any search filter.
    pub total: usize,
    /// Guests sorted by name, optionally filtered by the search query.
    pub guests: Vec<Guest>,
    /// Ids still inside their highlight window.
    pub fresh: Vec<RecordId>,
    pub stats: AttendanceStats,
}

#[derive(Debug)]
pub struct Roster {
    cache: Snapshot<Guest>,
    fresh: FreshSet,
    available: bool,
}

impl Roster {
    pub fn new(config: &GuestbookConfig) -> Self {
        Self {
            cache: Snapshot::new(),
            fresh: FreshSet::new(config.highlight_window()),
            available: false,
        }
    }

    /// Replace the snapshot with a bulk load.
    pub fn load(&mut self, rows: Vec<Guest>) {
        self.cache.load(rows);
        self.available = true;
    }

    /// The bulk load failed: serve an explicitly-unavailable empty roster and
    /// keep merging stream events as they arrive.
    pub fn mark_unavailable(&mut self) {
        self.available = false;
        self.cache.clear();
    }

    pub fn available(&self) -> bool {
        self.available
    }

    /// Merge one stream event. Returns `None` for duplicate inserts.
    pub fn apply(&mut self, change: Change<Guest>, now: Instant) -> Option<RosterDelta> {
        match change {
            Change::Inserted(guest) => {
                let id = guest.id;
                if self.cache.insert(guest) {
                    self.fresh.mark(id, now);
                    Some(RosterDelta::Added(id))
                } else {
                    debug!(id = %id, "duplicate guest insert event ignored");
                    None
                }
            }
            Change::Updated(guest) => {
                let id = guest.id;
                self.fresh.mark(id, now);
                match self.cache.update(guest) {
                    Merge::Replaced => Some(RosterDelta::Updated(id)),
                    Merge::Appended => {
                        warn!(id = %id, "update for unknown guest appended, cache may have a gap");
                        Some(RosterDelta::Added(id))
                    }
                }
            }
        }
    }

    /// Expire elapsed highlights.
    pub fn tick(&mut self, now: Instant) {
        self.fresh.purge(now);
    }

    /// Next pending highlight expiry.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.fresh.next_deadline()
    }

    /// Guests in arrival order.
    pub fn guests(&self) -> &[Guest] {
        self.cache.rows()
    }

    pub fn get(&self, id: RecordId) -> Option<&Guest> {
        self.cache.get(id)
    }

    /// Guests sorted by name, the admin listing order.
    pub fn by_name(&self) -> Vec<&Guest> {
        let mut guests: Vec<&Guest> = self.cache.iter().collect();
        guests.sort_by_key(|g| (g.name.to_lowercase(), g.id));
        guests
    }

    /// Case-insensitive substring search over guest names, name-sorted.
    pub fn search(&self, query: &str) -> Vec<&Guest> {
        let needle = query.to_lowercase();
        self.by_name()
            .into_iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Fast-path duplicate check for registration. The store remains the
    /// authority; this only catches collisions already visible locally.
    pub fn slug_taken(&self, slug: &str) -> bool {
        self.cache.iter().any(|g| g.slug == slug)
    }

    /// Full-snapshot statistics, recomputed on every call.
    pub fn stats(&self) -> AttendanceStats {
        compute_stats(self.cache.rows())
    }

    pub fn is_fresh(&self, id: RecordId, now: Instant) -> bool {
        self.fresh.is_fresh(id, now)
    }

    pub fn view(&self, query: Option<&str>, now: Instant) -> RosterView {
        let guests = match query {
            Some(q) if !q.trim().is_empty() => self.search(q.trim()),
            _ => self.by_name(),
        };
        RosterView {
            available: self.available,
            total: self.cache.len(),
            guests: guests.into_iter().cloned().collect(),
            fresh: self.fresh.fresh_ids(now),
            stats: self.stats(),
        }
    }

    /// Teardown: cancel every pending highlight expiry.
    pub fn reset(&mut self) {
        self.fresh.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GuestCategory;
    use crate::test_support::{guest, present_guest};

    fn roster() -> Roster {
        Roster::new(&GuestbookConfig::default())
    }

    #[test]
    fn starts_unavailable_until_loaded() {
        let mut r = roster();
        assert!(!r.available());
        r.load(vec![guest(1, "Budi Santoso", GuestCategory::Couple)]);
        assert!(r.available());
        assert_eq!(r.guests().len(), 1);
    }

    #[test]
    fn duplicate_insert_event_is_ignored() {
        let mut r = roster();
        let now = Instant::now();
        let g = guest(1, "Budi Santoso", GuestCategory::Couple);
        assert_eq!(
            r.apply(Change::Inserted(g.clone()), now),
            Some(RosterDelta::Added(g.id))
        );
        assert_eq!(r.apply(Change::Inserted(g), now), None);
        assert_eq!(r.guests().len(), 1);
    }

    #[test]
    fn update_marks_fresh_and_replaces_in_place() {
        let mut r = roster();
        let now = Instant::now();
        r.load(vec![
            guest(1, "Budi Santoso", GuestCategory::Couple),
            guest(2, "Siti Aminah", GuestCategory::Couple),
        ]);
        let updated = present_guest(1, "Budi Santoso", GuestCategory::Couple, 2);
        assert_eq!(
            r.apply(Change::Updated(updated), now),
            Some(RosterDelta::Updated(RecordId(1)))
        );
        assert_eq!(r.guests()[0].pax, 2);
        assert!(r.is_fresh(RecordId(1), now));
        assert!(!r.is_fresh(RecordId(2), now));
    }

    #[test]
    fn by_name_sorts_case_insensitively() {
        let mut r = roster();
        r.load(vec![
            guest(1, "siti Aminah", GuestCategory::Couple),
            guest(2, "Budi Santoso", GuestCategory::Couple),
        ]);
        let names: Vec<&str> = r.by_name().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Budi Santoso", "siti Aminah"]);
    }

    #[test]
    fn search_filters_by_substring() {
        let mut r = roster();
        r.load(vec![
            guest(1, "Budi Santoso", GuestCategory::Couple),
            guest(2, "Siti Aminah", GuestCategory::Parents),
        ]);
        let hits = r.search("santo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Budi Santoso");
        assert!(r.search("zzz").is_empty());
    }

    #[test]
    fn view_reports_unavailable_after_failed_load() {
        let mut r = roster();
        r.mark_unavailable();
        let view = r.view(None, Instant::now());
        assert!(!view.available);
        assert!(view.guests.is_empty());
        assert_eq!(view.stats.invited, 0);
    }

    #[test]
    fn slug_taken_reflects_cache() {
        let mut r = roster();
        r.load(vec![guest(1, "Budi Santoso", GuestCategory::Couple)]);
        assert!(r.slug_taken("budi+santoso"));
        assert!(!r.slug_taken("siti+aminah"));
    }
}
