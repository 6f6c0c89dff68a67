//! Test-only helpers for constructing guestbook records.

use chrono::{DateTime, TimeZone, Utc};

use crate::core::slug::derive_slug;
use crate::core::types::{AttendanceStatus, Guest, GuestCategory, RecordId, Wish};

/// Deterministic timestamp `secs` seconds after the epoch.
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

/// Create a deterministic wish; `created_at` is derived from `id` so arrival
/// order follows id order.
pub fn wish(id: u64, name: &str) -> Wish {
    Wish {
        id: RecordId(id),
        name: name.to_string(),
        message: format!("{name} wishes you well"),
        created_at: ts(id as i64),
    }
}

/// Create a deterministic guest, invited but not checked in.
pub fn guest(id: u64, name: &str, category: GuestCategory) -> Guest {
    Guest {
        id: RecordId(id),
        name: name.to_string(),
        slug: derive_slug(name),
        category,
        attendance_status: AttendanceStatus::None,
        pax: 0,
        created_at: ts(id as i64),
        updated_at: None,
    }
}

/// Create a deterministic guest already checked in with `pax`.
pub fn present_guest(id: u64, name: &str, category: GuestCategory, pax: u32) -> Guest {
    let mut guest = guest(id, name, category);
    guest.attendance_status = AttendanceStatus::Present;
    guest.pax = pax;
    guest.updated_at = Some(ts(id as i64));
    guest
}
