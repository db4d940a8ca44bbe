use crate::booking::Reservation;
use crate::when::parse_when;
use std::collections::HashMap;

/// Merge the two reservation provenances into one deduplicated view.
///
/// Entries are keyed by id and later insertions overwrite earlier ones; the
/// local list goes in second, so a local record whose placeholder id happens
/// to collide with a server id shadows the server record. That is an
/// accepted limitation of mixing id schemes, not a correctness guarantee.
///
/// The result is sorted descending by combined date+time; entries whose
/// date or time cannot be parsed sort last.
pub fn merge_reservations(server: Vec<Reservation>, local: Vec<Reservation>) -> Vec<Reservation> {
    let mut by_id: HashMap<String, Reservation> = HashMap::new();
    for reservation in server.into_iter().chain(local) {
        by_id.insert(reservation.id.clone(), reservation);
    }

    let mut merged: Vec<Reservation> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        let a_when = parse_when(&a.date, &a.time);
        let b_when = parse_when(&b.date, &b.time);
        // Option orders None first, so comparing b to a gives newest-first
        // with unparseable entries at the end.
        b_when.cmp(&a_when).then_with(|| a.id.cmp(&b.id))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{Provenance, ReservationStatus};

    fn reservation(id: &str, date: &str, time: &str, provenance: Provenance) -> Reservation {
        Reservation {
            id: id.to_string(),
            restaurant: format!("Restaurant for {}", id),
            restaurant_id: None,
            date: date.to_string(),
            time: time.to_string(),
            people: 2,
            status: ReservationStatus::Confirmed,
            provenance,
        }
    }

    #[test]
    fn test_disjoint_lists_concatenate() {
        let server = vec![
            reservation("s1", "2025-05-04", "19:00", Provenance::Server),
            reservation("s2", "2025-05-05", "18:00", Provenance::Server),
        ];
        let local = vec![reservation("l1", "2025-05-06", "20:00", Provenance::Local)];

        let merged = merge_reservations(server, local);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_full_overlap_keeps_later_entries() {
        let server = vec![
            reservation("r1", "2025-05-04", "19:00", Provenance::Server),
            reservation("r2", "2025-05-05", "18:00", Provenance::Server),
        ];
        let local = vec![
            reservation("r1", "2025-05-04", "19:00", Provenance::Local),
            reservation("r2", "2025-05-05", "18:00", Provenance::Local),
        ];

        let merged = merge_reservations(server, local);
        assert_eq!(merged.len(), 2);
        // The later-inserted (local) entries win the collision
        assert!(merged.iter().all(|r| r.provenance == Provenance::Local));
    }

    #[test]
    fn test_sorted_descending_by_date_time() {
        let server = vec![
            reservation("old", "2025-05-01", "18:00", Provenance::Server),
            reservation("new", "2025-05-10", "18:00", Provenance::Server),
            reservation("mid-late", "2025-05-05", "20:00", Provenance::Server),
            reservation("mid-early", "2025-05-05", "17:00", Provenance::Server),
        ];

        let merged = merge_reservations(server, vec![]);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid-late", "mid-early", "old"]);
    }

    #[test]
    fn test_unparseable_dates_sort_last() {
        let server = vec![
            reservation("junk", "someday", "whenever", Provenance::Server),
            reservation("real", "2025-05-10", "18:00", Provenance::Server),
        ];

        let merged = merge_reservations(server, vec![]);
        assert_eq!(merged[0].id, "real");
        assert_eq!(merged[1].id, "junk");
    }
}
