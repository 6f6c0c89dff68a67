//! Aggregate attendance statistics.
//!
//! Stats are always recomputed from the full guest snapshot — there are no
//! incremental counters that can drift when events are retried or replayed.

use serde::Serialize;

use crate::core::types::{Guest, GuestCategory};

/// Breakdown for one invitation category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryStats {
    pub invited: usize,
    pub present: usize,
    pub pax: u64,
    /// Percent present, `0.0` when nobody in the category is invited.
    pub rate: f64,
}

/// Roster-wide attendance figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub invited: usize,
    pub present: usize,
    pub total_pax: u64,
    /// Percent present, `0.0` for an empty roster — never NaN.
    pub attendance_rate: f64,
    /// Average party size per present invitation, `0.0` when nobody is in.
    pub avg_pax: f64,
    pub couple: CategoryStats,
    pub parents: CategoryStats,
}

/// Compute full-snapshot statistics.
pub fn compute_stats(guests: &[Guest]) -> AttendanceStats {
    let invited = guests.len();
    let present = guests.iter().filter(|g| g.is_present()).count();
    let total_pax: u64 = guests.iter().map(|g| u64::from(g.pax)).sum();

    AttendanceStats {
        invited,
        present,
        total_pax,
        attendance_rate: rate(present, invited),
        avg_pax: if present == 0 {
            0.0
        } else {
            total_pax as f64 / present as f64
        },
        couple: category_stats(guests, GuestCategory::Couple),
        parents: category_stats(guests, GuestCategory::Parents),
    }
}

fn category_stats(guests: &[Guest], category: GuestCategory) -> CategoryStats {
    let mut invited = 0;
    let mut present = 0;
    let mut pax = 0u64;
    for guest in guests.iter().filter(|g| g.category == category) {
        invited += 1;
        if guest.is_present() {
            present += 1;
        }
        pax += u64::from(guest.pax);
    }
    CategoryStats {
        invited,
        present,
        pax,
        rate: rate(present, invited),
    }
}

fn rate(present: usize, invited: usize) -> f64 {
    if invited == 0 {
        0.0
    } else {
        present as f64 / invited as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{guest, present_guest};

    #[test]
    fn empty_roster_reports_zero_not_nan() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.invited, 0);
        assert_eq!(stats.present, 0);
        assert_eq!(stats.total_pax, 0);
        assert_eq!(stats.attendance_rate, 0.0);
        assert_eq!(stats.avg_pax, 0.0);
        assert_eq!(stats.couple.rate, 0.0);
        assert_eq!(stats.parents.rate, 0.0);
    }

    #[test]
    fn counts_and_rate() {
        let guests = vec![
            present_guest(1, "Budi Santoso", GuestCategory::Couple, 2),
            guest(2, "Siti Aminah", GuestCategory::Couple),
            present_guest(3, "Joko Widodo", GuestCategory::Parents, 3),
            guest(4, "Dewi Lestari", GuestCategory::Parents),
        ];
        let stats = compute_stats(&guests);
        assert_eq!(stats.invited, 4);
        assert_eq!(stats.present, 2);
        assert_eq!(stats.total_pax, 5);
        assert_eq!(stats.attendance_rate, 50.0);
        assert_eq!(stats.avg_pax, 2.5);
    }

    #[test]
    fn category_breakdown_partitions_all_three_numbers() {
        let guests = vec![
            present_guest(1, "Budi Santoso", GuestCategory::Couple, 2),
            present_guest(2, "Siti Aminah", GuestCategory::Couple, 1),
            guest(3, "Joko Widodo", GuestCategory::Parents),
        ];
        let stats = compute_stats(&guests);
        assert_eq!(stats.couple.invited, 2);
        assert_eq!(stats.couple.present, 2);
        assert_eq!(stats.couple.pax, 3);
        assert_eq!(stats.couple.rate, 100.0);
        assert_eq!(stats.parents.invited, 1);
        assert_eq!(stats.parents.present, 0);
        assert_eq!(stats.parents.pax, 0);
        assert_eq!(stats.parents.rate, 0.0);
    }

    #[test]
    fn avg_pax_zero_when_nobody_present() {
        let guests = vec![guest(1, "Budi Santoso", GuestCategory::Couple)];
        assert_eq!(compute_stats(&guests).avg_pax, 0.0);
    }
}
