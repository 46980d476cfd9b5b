//! Scheduling conflict detection
//!
//! Two events conflict when their half-open `[start, end)` ranges intersect,
//! comparing (date, time) pairs. Events that merely touch do not conflict.

use crate::models::{Event, EventStatus, Schedule};
use crate::utils::errors::{ConflictEntry, ConflictRole};

/// Commitments of `target`'s would-be attendee that overlap it
///
/// `commitments` pairs each event with `true` when the user organizes it.
/// Cancelled events never conflict. Results are ordered by start.
pub fn find_conflicts<I>(target: &Schedule, commitments: I) -> Vec<ConflictEntry>
where
    I: IntoIterator<Item = (Event, bool)>,
{
    let mut hits: Vec<(Schedule, ConflictEntry)> = commitments
        .into_iter()
        .filter(|(event, _)| event.status != EventStatus::Cancelled)
        .filter_map(|(event, organizing)| {
            let schedule = event.schedule();
            if !schedule.overlaps(target) {
                return None;
            }
            let entry = ConflictEntry {
                event_id: event.id,
                title: event.title,
                time: schedule.format_range(),
                role: if organizing { ConflictRole::Organizer } else { ConflictRole::Participant },
            };
            Some((schedule, entry))
        })
        .collect();

    hits.sort_by(|a, b| a.0.start.cmp(&b.0.start).then(a.1.event_id.cmp(&b.1.event_id)));
    hits.dedup_by(|a, b| a.1.event_id == b.1.event_id);
    hits.into_iter().map(|(_, entry)| entry).collect()
}
