//! Per-student exam time-slot scheduling.
//!
//! Each request is resolved independently, in input order: the
//! instructor-proposed time is tried first, then the fixed-offset
//! alternatives the instructor opted into, in the order they were
//! declared. The first candidate clearing the accommodation bounds, the
//! student's recurring timetable (minus their own class meeting), and the
//! student's already-committed exams wins. Committed intervals accumulate
//! per student within one run, so earlier rows constrain later ones.

use crate::data::{
    ExamRequest, ScheduleStatus, ScheduledExam, StudentId, Timetable, TimetableSlot,
};
use crate::parse;
use crate::timetable;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use log::info;
use std::collections::HashMap;

fn earliest_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

fn latest_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap()
}

/// Ordered candidate list for one request. The instructor's original
/// time always comes first; week-after options expand to one candidate
/// per day offset 1..=7, each labelled with its offset.
pub(crate) fn build_candidates(
    request: &ExamRequest,
    instructor_dt: NaiveDateTime,
) -> Vec<(String, NaiveDateTime)> {
    let mut candidates = vec![("Instructor".to_string(), instructor_dt)];
    for option in &request.conflict_options {
        let time = option.fixed_time();
        if option.is_week_after() {
            for offset in 1..=7 {
                let start = (instructor_dt.date() + Duration::days(offset)).and_time(time);
                let label = format!("{}+{}@{}", option.label(), offset, time.format("%H:%M"));
                candidates.push((label, start));
            }
        } else {
            let start = (instructor_dt.date() + Duration::days(option.day_offset())).and_time(time);
            candidates.push((option.label().to_string(), start));
        }
    }
    candidates
}

fn within_accommodation(
    request: &ExamRequest,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    if request.no_am && start.time() < earliest_start() {
        return false;
    }
    if request.no_pm && end.time() > latest_end() {
        return false;
    }
    true
}

/// Whether [start, end) collides with any recurring slot on the same
/// weekday, other than the request's own tagged class meeting.
fn timetable_conflict(
    slots: &[TimetableSlot],
    start: NaiveDateTime,
    end: NaiveDateTime,
    own_crn: &str,
) -> bool {
    let weekday = start.weekday().num_days_from_monday();
    slots
        .iter()
        .filter(|slot| slot.weekday == weekday)
        .filter(|slot| slot.tag.as_deref() != Some(own_crn))
        .any(|slot| {
            let slot_start = start.date().and_time(slot.start);
            let slot_end = start.date().and_time(slot.end);
            parse::overlaps(start, end, slot_start, slot_end)
        })
}

fn exam_conflict(
    committed: &[(NaiveDateTime, NaiveDateTime)],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    committed
        .iter()
        .any(|&(other_start, other_end)| parse::overlaps(start, end, other_start, other_end))
}

fn schedule_one(
    request: &ExamRequest,
    slots: &[TimetableSlot],
    committed: &[(NaiveDateTime, NaiveDateTime)],
) -> Result<(NaiveDateTime, NaiveDateTime, String), ScheduleStatus> {
    let instructor_dt = parse::parse_instructor_datetime(
        &request.instructor_exam_date,
        &request.instructor_exam_time,
    )
    .ok_or(ScheduleStatus::InvalidInstructorTime)?;
    let duration = Duration::minutes(parse::parse_duration_minutes(&request.duration));

    for (label, start) in build_candidates(request, instructor_dt) {
        let end = start + duration;
        if !within_accommodation(request, start, end) {
            continue;
        }
        if timetable_conflict(slots, start, end, &request.crn) {
            continue;
        }
        if exam_conflict(committed, start, end) {
            continue;
        }
        return Ok((start, end, label));
    }
    Err(ScheduleStatus::NoAvailableSlot)
}

/// Schedules every request against the timetable, in input order. Tags
/// the timetable first so self-exemptions apply, then resolves requests
/// one by one, committing each student's intervals as it goes. Row-level
/// failures become statuses; the batch always completes.
pub fn schedule_all(requests: &[ExamRequest], timetable: &mut Timetable) -> Vec<ScheduledExam> {
    timetable::tag(timetable, requests);

    info!("Scheduling {} exam requests...", requests.len());
    let mut committed: HashMap<StudentId, Vec<(NaiveDateTime, NaiveDateTime)>> = HashMap::new();
    let mut results = Vec::with_capacity(requests.len());

    for request in requests {
        let slots = timetable
            .get(&request.student_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let existing = committed.entry(request.student_id.clone()).or_default();

        match schedule_one(request, slots, existing) {
            Ok((start, end, label)) => {
                existing.push((start, end));
                results.push(ScheduledExam {
                    student_id: request.student_id.clone(),
                    crn: request.crn.clone(),
                    start: Some(start),
                    end: Some(end),
                    label: Some(label),
                    status: ScheduleStatus::Scheduled,
                });
            }
            Err(status) => results.push(ScheduledExam {
                student_id: request.student_id.clone(),
                crn: request.crn.clone(),
                start: None,
                end: None,
                label: None,
                status,
            }),
        }
    }

    let scheduled = results.iter().filter(|r| r.is_scheduled()).count();
    info!(
        "Scheduled {} of {} exam requests",
        scheduled,
        requests.len()
    );
    results
}
