//! First-fit room assignment.
//!
//! Works row by row against an inventory keyed by the exam's exact
//! (start, end) pair, with no reasoning across distinct time keys.
//! Makes no minimality promise; it is the fallback for the exact
//! optimizer and a baseline to compare it against.

use crate::data::{AssignmentStatus, RoomAssignment, RoomId, ScheduledExam};
use crate::rooms::SlotInventory;
use chrono::NaiveDateTime;
use log::info;
use std::collections::HashMap;

pub fn assign(exams: &[ScheduledExam], inventory: &SlotInventory) -> Vec<RoomAssignment> {
    // occupant counts per (start, end, room), local to this run
    let mut occupancy: HashMap<(NaiveDateTime, NaiveDateTime, RoomId), u32> = HashMap::new();
    let mut results = Vec::with_capacity(exams.len());

    for exam in exams {
        let (room, status) = place(exam, inventory, &mut occupancy);
        results.push(RoomAssignment {
            student_id: exam.student_id.clone(),
            crn: exam.crn.clone(),
            room,
            status,
        });
    }

    let assigned = results.iter().filter(|r| r.status.is_assigned()).count();
    info!("Greedy assignment placed {} of {} exams", assigned, exams.len());
    results
}

fn place(
    exam: &ScheduledExam,
    inventory: &SlotInventory,
    occupancy: &mut HashMap<(NaiveDateTime, NaiveDateTime, RoomId), u32>,
) -> (Option<RoomId>, AssignmentStatus) {
    if !exam.is_scheduled() {
        return (None, AssignmentStatus::NotScheduled);
    }
    let (Some(start), Some(end)) = (exam.start, exam.end) else {
        return (None, AssignmentStatus::InvalidTimeSlot);
    };
    let Some(rooms) = inventory.get(&(start, end)).filter(|rooms| !rooms.is_empty()) else {
        return (None, AssignmentStatus::NoRoomsAvailable);
    };

    for room in rooms {
        if !room.covers(start, end) {
            continue;
        }
        let count = occupancy
            .entry((start, end, room.location.clone()))
            .or_insert(0);
        if *count < room.capacity {
            *count += 1;
            return (Some(room.location.clone()), AssignmentStatus::Assigned);
        }
    }
    (None, AssignmentStatus::NoCapacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RoomRecord, ScheduleStatus};
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn exam(student: &str, d: u32, h: u32) -> ScheduledExam {
        ScheduledExam {
            student_id: student.to_string(),
            crn: "1001".to_string(),
            start: Some(dt(d, h)),
            end: Some(dt(d, h + 1)),
            label: Some("Instructor".to_string()),
            status: ScheduleStatus::Scheduled,
        }
    }

    fn room(location: &str, capacity: u32) -> RoomRecord {
        RoomRecord {
            location: location.to_string(),
            capacity,
            available_from: None,
            available_until: None,
        }
    }

    fn inventory_for(exams: &[ScheduledExam], rooms: Vec<RoomRecord>) -> SlotInventory {
        exams
            .iter()
            .filter(|e| e.is_scheduled())
            .map(|e| ((e.start.unwrap(), e.end.unwrap()), rooms.clone()))
            .collect()
    }

    #[test]
    fn fills_rooms_first_fit_in_inventory_order() {
        let exams = vec![exam("s1", 1, 10), exam("s2", 1, 10), exam("s3", 1, 10)];
        let inventory = inventory_for(&exams, vec![room("A", 2), room("B", 5)]);
        let results = assign(&exams, &inventory);
        assert_eq!(results[0].room.as_deref(), Some("A"));
        assert_eq!(results[1].room.as_deref(), Some("A"));
        assert_eq!(results[2].room.as_deref(), Some("B"));
        assert!(results.iter().all(|r| r.status == AssignmentStatus::Assigned));
    }

    #[test]
    fn capacity_exhaustion_is_reported_per_row() {
        let exams = vec![exam("s1", 1, 10), exam("s2", 1, 10)];
        let inventory = inventory_for(&exams, vec![room("A", 1)]);
        let results = assign(&exams, &inventory);
        assert_eq!(results[0].status, AssignmentStatus::Assigned);
        assert_eq!(results[1].status, AssignmentStatus::NoCapacity);
        assert_eq!(results[1].room, None);
    }

    #[test]
    fn unscheduled_rows_need_no_room() {
        let failed = ScheduledExam {
            student_id: "s9".to_string(),
            crn: "1001".to_string(),
            start: None,
            end: None,
            label: None,
            status: ScheduleStatus::NoAvailableSlot,
        };
        let results = assign(&[failed], &HashMap::new());
        assert_eq!(results[0].status, AssignmentStatus::NotScheduled);
    }

    #[test]
    fn missing_time_key_means_no_rooms_available() {
        let exams = vec![exam("s1", 1, 10)];
        let results = assign(&exams, &HashMap::new());
        assert_eq!(results[0].status, AssignmentStatus::NoRoomsAvailable);
    }

    #[test]
    fn rooms_outside_their_window_are_skipped() {
        let exams = vec![exam("s1", 1, 10)];
        let late = RoomRecord {
            location: "L".to_string(),
            capacity: 5,
            available_from: Some(dt(1, 11)),
            available_until: Some(dt(1, 18)),
        };
        let inventory = inventory_for(&exams, vec![late, room("OK", 1)]);
        let results = assign(&exams, &inventory);
        assert_eq!(results[0].room.as_deref(), Some("OK"));
    }

    #[test]
    fn assignment_is_idempotent() {
        let exams = vec![
            exam("s1", 1, 10),
            exam("s2", 1, 10),
            exam("s3", 2, 9),
            exam("s4", 1, 10),
        ];
        let inventory = inventory_for(&exams, vec![room("A", 2), room("B", 2)]);
        let first = assign(&exams, &inventory);
        let second = assign(&exams, &inventory);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.room, b.room);
            assert_eq!(a.status, b.status);
        }
    }

    #[test]
    fn distinct_time_keys_do_not_share_occupancy() {
        let exams = vec![exam("s1", 1, 10), exam("s2", 2, 10)];
        let inventory = inventory_for(&exams, vec![room("A", 1)]);
        let results = assign(&exams, &inventory);
        // same room may serve both keys; the heuristic does not reason
        // across time slots
        assert_eq!(results[0].room.as_deref(), Some("A"));
        assert_eq!(results[1].room.as_deref(), Some("A"));
    }
}
