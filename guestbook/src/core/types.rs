//! Shared record types for the guestbook core.
//!
//! These types define stable contracts between core components. They carry no
//! behavior beyond cheap accessors and must remain deterministic: every
//! timestamp is assigned by the backing store, never by core logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque record identifier assigned by the backing store.
///
/// Ids are unique per store and monotonically increasing in the in-memory
/// implementation, which makes `(created_at, id)` a total order over records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything the snapshot cache can hold: identified and creation-stamped.
pub trait Record: Clone {
    fn id(&self) -> RecordId;
    fn created_at(&self) -> DateTime<Utc>;
}

/// A guest-submitted well-wish. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    pub id: RecordId,
    pub name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Wish {
    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Insert payload for a wish; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWish {
    pub name: String,
    pub message: String,
}

/// Which invitation list a guest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestCategory {
    /// Invited by the couple themselves.
    Couple,
    /// Invited by the parents.
    Parents,
}

/// Check-in state of a guest. Absent and `None` are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    None,
    Present,
}

impl AttendanceStatus {
    pub fn is_present(self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

/// An invitee tracked for attendance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: RecordId,
    pub name: String,
    /// Derived from `name` at registration time; see [`crate::core::slug`].
    pub slug: String,
    pub category: GuestCategory,
    #[serde(default)]
    pub attendance_status: AttendanceStatus,
    #[serde(default)]
    pub pax: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Guest {
    pub fn is_present(&self) -> bool {
        self.attendance_status.is_present()
    }
}

impl Record for Guest {
    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Insert payload for a guest; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGuest {
    pub name: String,
    pub slug: String,
    pub category: GuestCategory,
    #[serde(default)]
    pub attendance_status: AttendanceStatus,
    #[serde(default)]
    pub pax: u32,
}

/// Update payload for a guest's check-in state.
///
/// Only the attendance fields are mutable; name, slug, and category are fixed
/// at registration. Absolute-set semantics keep retried writes idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestPatch {
    pub attendance_status: AttendanceStatus,
    pub pax: u32,
    pub updated_at: DateTime<Utc>,
}

impl GuestPatch {
    /// Apply this patch to a guest record, leaving identity fields untouched.
    pub fn apply_to(self, guest: &mut Guest) {
        guest.attendance_status = self.attendance_status;
        guest.pax = self.pax;
        guest.updated_at = Some(self.updated_at);
    }
}
