//! Attendance state transitions.
//!
//! The ledger is pure: transitions validate their inputs and produce a
//! [`GuestPatch`] for the store to apply. Patches set absolute values, so a
//! retried write that already succeeded changes nothing — the idempotence the
//! at-least-once stream requires.
//!
//! Reachable states: `Invited` (status none, pax 0) ⇄ `CheckedIn` (status
//! present, pax ≥ 1); a check-in edit is `CheckedIn → CheckedIn` with a
//! different pax.

use chrono::{DateTime, Utc};

use crate::core::types::{AttendanceStatus, Guest, GuestPatch};
use crate::error::CheckInError;

/// Build the check-in (or check-in edit) patch for a guest.
///
/// `pax` must be a positive integer that fits a `u32`; anything else is
/// rejected with [`CheckInError::InvalidPax`] before any write happens.
pub fn check_in(pax: i64, at: DateTime<Utc>) -> Result<GuestPatch, CheckInError> {
    if pax < 1 {
        return Err(CheckInError::InvalidPax(pax));
    }
    let validated = u32::try_from(pax).map_err(|_| CheckInError::InvalidPax(pax))?;
    Ok(GuestPatch {
        attendance_status: AttendanceStatus::Present,
        pax: validated,
        updated_at: at,
    })
}

/// Build the cancellation patch: back to `Invited`, pax reset to 0.
///
/// Cancellation looks irreversible to the operator, so callers are expected
/// to have collected an explicit confirmation before invoking this.
pub fn cancel(at: DateTime<Utc>) -> GuestPatch {
    GuestPatch {
        attendance_status: AttendanceStatus::None,
        pax: 0,
        updated_at: at,
    }
}

/// The ledger invariant: present ⇔ pax ≥ 1.
pub fn consistent(guest: &Guest) -> bool {
    guest.is_present() == (guest.pax >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GuestCategory;
    use crate::test_support::{guest, ts};

    #[test]
    fn check_in_sets_present_and_pax() {
        let patch = check_in(3, ts(10)).expect("valid pax");
        assert_eq!(patch.attendance_status, AttendanceStatus::Present);
        assert_eq!(patch.pax, 3);
        assert_eq!(patch.updated_at, ts(10));
    }

    #[test]
    fn zero_and_negative_pax_are_rejected() {
        assert!(matches!(check_in(0, ts(0)), Err(CheckInError::InvalidPax(0))));
        assert!(matches!(check_in(-2, ts(0)), Err(CheckInError::InvalidPax(-2))));
    }

    #[test]
    fn absurdly_large_pax_is_rejected() {
        let too_big = i64::from(u32::MAX) + 1;
        assert!(matches!(
            check_in(too_big, ts(0)),
            Err(CheckInError::InvalidPax(p)) if p == too_big
        ));
    }

    #[test]
    fn check_in_is_idempotent_on_retry() {
        let first = check_in(2, ts(5)).expect("valid");
        let retry = check_in(2, ts(5)).expect("valid");
        assert_eq!(first, retry);

        let mut g = guest(1, "Budi Santoso", GuestCategory::Couple);
        first.apply_to(&mut g);
        let once = g.clone();
        retry.apply_to(&mut g);
        assert_eq!(g, once);
    }

    #[test]
    fn round_trip_restores_consistent_state() {
        let mut g = guest(1, "Budi Santoso", GuestCategory::Couple);
        assert!(consistent(&g));

        check_in(2, ts(1)).expect("valid").apply_to(&mut g);
        assert!(g.is_present());
        assert_eq!(g.pax, 2);
        assert!(consistent(&g));

        cancel(ts(2)).apply_to(&mut g);
        assert!(!g.is_present());
        assert_eq!(g.pax, 0);
        assert!(consistent(&g));

        check_in(4, ts(3)).expect("valid").apply_to(&mut g);
        assert!(g.is_present());
        assert_eq!(g.pax, 4);
        assert!(consistent(&g));
    }

    #[test]
    fn edit_changes_pax_only() {
        let mut g = guest(1, "Budi Santoso", GuestCategory::Couple);
        check_in(2, ts(1)).expect("valid").apply_to(&mut g);
        check_in(5, ts(2)).expect("valid").apply_to(&mut g);
        assert!(g.is_present());
        assert_eq!(g.pax, 5);
        assert_eq!(g.updated_at, Some(ts(2)));
        assert!(consistent(&g));
    }
}
