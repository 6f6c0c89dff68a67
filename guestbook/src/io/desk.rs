//! Admin entry points: guest registration, check-in, and wish submission.
//!
//! The desk validates locally, writes to the store, and never mutates the
//! roster itself — the write loops back through the change stream, so every
//! connected viewer (this one included) converges on the same state.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::core::ledger;
use crate::core::slug::derive_slug;
use crate::core::types::{
    AttendanceStatus, Guest, GuestCategory, NewGuest, NewWish, RecordId, Wish,
};
use crate::error::{CheckInError, RegisterError, StoreError, WishError};
use crate::io::store::Store;
use crate::roster::Roster;

/// Per-entry result of a batch registration.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Inserted into the store.
    Added { guest: Guest },
    /// The derived slug is already on the roster.
    SkippedExisting,
    /// The same slug appeared earlier in this batch; first occurrence wins.
    SkippedInBatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub name: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Outcome list of a batch registration. Blank lines are dropped before
/// processing and do not appear in `entries`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub added: usize,
}

enum Plan {
    Skip(BatchOutcome),
    Insert(NewGuest),
}

/// Admin-facing mutation surface bound to one roster view.
pub struct FrontDesk<S> {
    store: Arc<S>,
    roster: Arc<Mutex<Roster>>,
}

impl<S: Store> FrontDesk<S> {
    pub fn new(store: Arc<S>, roster: Arc<Mutex<Roster>>) -> Self {
        Self { store, roster }
    }

    /// Register a single guest, not yet checked in.
    ///
    /// The duplicate check runs against the local roster before any write;
    /// the store should additionally enforce slug uniqueness for the race
    /// between two concurrent admins.
    pub async fn register(
        &self,
        name: &str,
        category: GuestCategory,
    ) -> Result<Guest, RegisterError> {
        let payload = self.validate_registration(name, category).await?;
        self.insert_one(payload).await
    }

    /// The reception-desk flow: register a walk-in and check them in at once.
    pub async fn register_checked_in(
        &self,
        name: &str,
        category: GuestCategory,
        pax: i64,
    ) -> Result<Guest, RegisterError> {
        let mut payload = self.validate_registration(name, category).await?;
        let patch =
            ledger::check_in(pax, Utc::now()).map_err(|_| RegisterError::InvalidPax(pax))?;
        payload.attendance_status = patch.attendance_status;
        payload.pax = patch.pax;
        self.insert_one(payload).await
    }

    /// Register many guests at once, skipping duplicates instead of failing
    /// the whole batch. Returns one outcome per non-blank entry.
    pub async fn register_batch(
        &self,
        names: Vec<String>,
        category: GuestCategory,
    ) -> Result<BatchReport, StoreError> {
        let mut plans: Vec<(String, Plan)> = Vec::new();
        let mut batch_slugs: HashSet<String> = HashSet::new();

        {
            let roster = self.roster.lock().await;
            for raw in names {
                let name = raw.trim();
                if name.is_empty() {
                    continue;
                }
                let slug = derive_slug(name);
                let plan = if roster.slug_taken(&slug) {
                    Plan::Skip(BatchOutcome::SkippedExisting)
                } else if !batch_slugs.insert(slug.clone()) {
                    Plan::Skip(BatchOutcome::SkippedInBatch)
                } else {
                    Plan::Insert(NewGuest {
                        name: name.to_string(),
                        slug,
                        category,
                        attendance_status: AttendanceStatus::None,
                        pax: 0,
                    })
                };
                plans.push((name.to_string(), plan));
            }
        }

        let payloads: Vec<NewGuest> = plans
            .iter()
            .filter_map(|(_, plan)| match plan {
                Plan::Insert(payload) => Some(payload.clone()),
                Plan::Skip(_) => None,
            })
            .collect();

        let inserted = if payloads.is_empty() {
            Vec::new()
        } else {
            let rows = self.store.insert_guests(payloads).await?;
            info!(count = rows.len(), "registered guest batch");
            rows
        };

        let mut inserted = inserted.into_iter();
        let mut added = 0;
        let mut entries = Vec::with_capacity(plans.len());
        for (name, plan) in plans {
            let outcome = match plan {
                Plan::Skip(outcome) => outcome,
                Plan::Insert(_) => {
                    let guest = inserted.next().ok_or_else(|| {
                        StoreError::Unavailable(
                            "batch insert returned fewer rows than sent".to_string(),
                        )
                    })?;
                    added += 1;
                    BatchOutcome::Added { guest }
                }
            };
            entries.push(BatchEntry { name, outcome });
        }

        Ok(BatchReport { entries, added })
    }

    /// Check a guest in (or edit an existing check-in) with the given party
    /// size. `pax` must be a positive integer.
    pub async fn check_in(&self, id: RecordId, pax: i64) -> Result<Guest, CheckInError> {
        let patch = ledger::check_in(pax, Utc::now())?;
        match self.store.update_guest(id, patch).await {
            Ok(guest) => {
                info!(id = %id, pax = guest.pax, "guest checked in");
                Ok(guest)
            }
            Err(StoreError::NotFound(id)) => Err(CheckInError::UnknownGuest(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Cancel a check-in, resetting the guest to invited with pax 0.
    ///
    /// This looks destructive to the operator; callers must have collected an
    /// explicit confirmation before invoking it.
    pub async fn cancel_check_in(&self, id: RecordId) -> Result<Guest, CheckInError> {
        let patch = ledger::cancel(Utc::now());
        match self.store.update_guest(id, patch).await {
            Ok(guest) => {
                info!(id = %id, "check-in cancelled");
                Ok(guest)
            }
            Err(StoreError::NotFound(id)) => Err(CheckInError::UnknownGuest(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Submit a wish from the guest-facing form.
    pub async fn submit_wish(&self, name: &str, message: &str) -> Result<Wish, WishError> {
        let name = name.trim();
        let message = message.trim();
        if name.is_empty() || message.is_empty() {
            return Err(WishError::EmptyField);
        }
        let wish = self
            .store
            .insert_wish(NewWish {
                name: name.to_string(),
                message: message.to_string(),
            })
            .await?;
        info!(id = %wish.id, "wish submitted");
        Ok(wish)
    }

    async fn validate_registration(
        &self,
        name: &str,
        category: GuestCategory,
    ) -> Result<NewGuest, RegisterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }
        let slug = derive_slug(name);
        if self.roster.lock().await.slug_taken(&slug) {
            return Err(RegisterError::DuplicateIdentity { slug });
        }
        Ok(NewGuest {
            name: name.to_string(),
            slug,
            category,
            attendance_status: AttendanceStatus::None,
            pax: 0,
        })
    }

    async fn insert_one(&self, payload: NewGuest) -> Result<Guest, RegisterError> {
        let mut rows = self.store.insert_guests(vec![payload]).await?;
        let guest = rows.pop().ok_or_else(|| {
            StoreError::Unavailable("insert returned no rows".to_string())
        })?;
        info!(id = %guest.id, slug = %guest.slug, "guest registered");
        Ok(guest)
    }
}
