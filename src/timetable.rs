//! Student timetable loading and course tagging.
//!
//! The raw input is one record per student carrying weekday blocks of
//! (start, end) slots in free-form text. Loading normalizes each block
//! into [`TimetableSlot`]s; unrecognized weekday labels or unparsable
//! times skip the entry rather than failing the batch. A second pass
//! tags at most one slot per relevant course so that an exam may later
//! overlap its own class meeting.

use crate::data::{ExamRequest, Timetable, TimetableSlot};
use crate::parse;
use log::trace;
use serde::Deserialize;
use std::collections::HashMap;

/// Start times within this many minutes of the declared class start are
/// considered the same meeting.
const TAG_TOLERANCE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct RawTimetable {
    #[serde(default)]
    pub students: Vec<RawStudent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStudent {
    pub student_id: String,
    #[serde(rename = "Timings", default)]
    pub timings: Vec<RawDayBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDayBlock {
    #[serde(rename = "Day", default)]
    pub day: String,
    #[serde(rename = "Slots", default)]
    pub slots: Vec<RawSlot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSlot {
    pub start_time: String,
    pub end_time: String,
}

/// Normalizes raw per-student schedules into timetable slots, untagged.
pub fn load(raw: &RawTimetable) -> Timetable {
    let mut timetable: Timetable = HashMap::new();
    for student in &raw.students {
        let slots = timetable.entry(student.student_id.clone()).or_default();
        for block in &student.timings {
            let Some(weekday) = parse::parse_weekday(&block.day) else {
                trace!(
                    "Skipping unrecognized weekday label {:?} for student {}",
                    block.day, student.student_id
                );
                continue;
            };
            for slot in &block.slots {
                let (Some(start), Some(end)) = (
                    parse::parse_time(&slot.start_time),
                    parse::parse_time(&slot.end_time),
                ) else {
                    trace!(
                        "Skipping unparsable slot {:?}-{:?} for student {}",
                        slot.start_time, slot.end_time, student.student_id
                    );
                    continue;
                };
                slots.push(TimetableSlot {
                    weekday,
                    start,
                    end,
                    tag: None,
                });
            }
        }
    }
    timetable
}

/// Tags, per exam request, the timetable slot matching the class's
/// declared weekday and start time (within tolerance) with the request's
/// CRN. An unmatched request leaves no tag; that only forgoes the
/// self-conflict exemption later.
pub fn tag(timetable: &mut Timetable, requests: &[ExamRequest]) {
    for request in requests {
        let Some(slots) = timetable.get_mut(&request.student_id) else {
            continue;
        };
        let Some(class_start) = parse::parse_time(&request.class_start) else {
            continue;
        };
        for day in request.class_days.split(',') {
            let Some(weekday) = parse::parse_weekday(day) else {
                continue;
            };
            if let Some(slot) = slots.iter_mut().find(|slot| {
                slot.weekday == weekday
                    && parse::times_close(slot.start, class_start, TAG_TOLERANCE_MINUTES)
            }) {
                slot.tag = Some(request.crn.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn raw_student(id: &str, day: &str, start: &str, end: &str) -> RawStudent {
        RawStudent {
            student_id: id.to_string(),
            timings: vec![RawDayBlock {
                day: day.to_string(),
                slots: vec![RawSlot {
                    start_time: start.to_string(),
                    end_time: end.to_string(),
                }],
            }],
        }
    }

    fn request(student: &str, crn: &str, days: &str, class_start: &str) -> ExamRequest {
        ExamRequest {
            student_id: student.to_string(),
            crn: crn.to_string(),
            class_days: days.to_string(),
            class_start: class_start.to_string(),
            instructor_exam_date: "2025-12-01".to_string(),
            instructor_exam_time: "10:00".to_string(),
            duration: "60".to_string(),
            no_am: false,
            no_pm: false,
            conflict_options: vec![],
        }
    }

    #[test]
    fn load_normalizes_weekday_labels() {
        let raw = RawTimetable {
            students: vec![
                raw_student("s1", "Monday", "10:00 AM", "11:00 AM"),
                raw_student("s2", "R", "14:00", "15:30"),
            ],
        };
        let timetable = load(&raw);
        assert_eq!(timetable["s1"], vec![TimetableSlot {
            weekday: 0,
            start: t(10, 0),
            end: t(11, 0),
            tag: None,
        }]);
        assert_eq!(timetable["s2"][0].weekday, 3);
    }

    #[test]
    fn load_skips_bad_labels_and_times_without_failing() {
        let raw = RawTimetable {
            students: vec![
                raw_student("s1", "Someday", "10:00", "11:00"),
                raw_student("s2", "Tue", "??", "11:00"),
            ],
        };
        let timetable = load(&raw);
        assert!(timetable["s1"].is_empty());
        assert!(timetable["s2"].is_empty());
    }

    #[test]
    fn tag_matches_within_tolerance() {
        let raw = RawTimetable {
            students: vec![raw_student("s1", "Monday", "11:00 AM", "12:00 PM")],
        };
        let mut timetable = load(&raw);
        // "11:04" is within the 5 minute tolerance of "11:00 AM"
        tag(&mut timetable, &[request("s1", "1234", "M", "11:04")]);
        assert_eq!(timetable["s1"][0].tag.as_deref(), Some("1234"));
    }

    #[test]
    fn tag_leaves_unmatched_requests_untagged() {
        let raw = RawTimetable {
            students: vec![raw_student("s1", "Monday", "11:00 AM", "12:00 PM")],
        };
        let mut timetable = load(&raw);
        // wrong weekday and a start well outside the tolerance
        tag(&mut timetable, &[
            request("s1", "1234", "T", "11:00"),
            request("s1", "5678", "M", "9:00"),
        ]);
        assert_eq!(timetable["s1"][0].tag, None);
    }

    #[test]
    fn tag_picks_the_first_matching_slot() {
        let mut timetable = load(&RawTimetable {
            students: vec![RawStudent {
                student_id: "s1".to_string(),
                timings: vec![RawDayBlock {
                    day: "M".to_string(),
                    slots: vec![
                        RawSlot {
                            start_time: "11:00".to_string(),
                            end_time: "12:00".to_string(),
                        },
                        RawSlot {
                            start_time: "11:03".to_string(),
                            end_time: "12:30".to_string(),
                        },
                    ],
                }],
            }],
        });
        tag(&mut timetable, &[request("s1", "1234", "M", "11:00")]);
        assert_eq!(timetable["s1"][0].tag.as_deref(), Some("1234"));
        assert_eq!(timetable["s1"][1].tag, None);
    }
}
