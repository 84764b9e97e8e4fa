//! Bucketing of scheduled exams into (start, end) groups.

use crate::data::{ExamGroup, ScheduledExam};
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Partitions the SCHEDULED subset by exact (start, end) equality.
/// Groups come back sorted by start time ascending; this order is what
/// the exact optimizer indexes by, so it must be reproducible.
pub fn group_exams(exams: &[ScheduledExam]) -> Vec<ExamGroup> {
    let mut buckets: BTreeMap<(NaiveDateTime, NaiveDateTime), Vec<&ScheduledExam>> =
        BTreeMap::new();
    for exam in exams {
        if !exam.is_scheduled() {
            continue;
        }
        let (Some(start), Some(end)) = (exam.start, exam.end) else {
            continue;
        };
        buckets.entry((start, end)).or_default().push(exam);
    }

    buckets
        .into_iter()
        .map(|((start, end), members)| ExamGroup {
            start,
            end,
            student_ids: members.iter().map(|e| e.student_id.clone()).collect(),
            crns: members.iter().map(|e| e.crn.clone()).unique().collect(),
            student_count: members.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ScheduleStatus;
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn exam(student: &str, crn: &str, d: u32, h: u32) -> ScheduledExam {
        ScheduledExam {
            student_id: student.to_string(),
            crn: crn.to_string(),
            start: Some(dt(d, h)),
            end: Some(dt(d, h + 1)),
            label: Some("Instructor".to_string()),
            status: ScheduleStatus::Scheduled,
        }
    }

    fn failed(student: &str) -> ScheduledExam {
        ScheduledExam {
            student_id: student.to_string(),
            crn: "1001".to_string(),
            start: None,
            end: None,
            label: None,
            status: ScheduleStatus::NoAvailableSlot,
        }
    }

    #[test]
    fn groups_partition_the_scheduled_set() {
        let exams = vec![
            exam("s1", "1001", 2, 10),
            exam("s2", "1001", 1, 10),
            exam("s3", "1002", 1, 10),
            failed("s4"),
        ];
        let groups = group_exams(&exams);

        assert_eq!(groups.len(), 2);
        let total: usize = groups.iter().map(|g| g.student_count).sum();
        assert_eq!(total, 3);
        // sorted ascending by start
        assert_eq!(groups[0].start, dt(1, 10));
        assert_eq!(groups[1].start, dt(2, 10));
        assert_eq!(groups[0].student_ids, vec!["s2", "s3"]);
    }

    #[test]
    fn crns_are_unique_within_a_group() {
        let exams = vec![exam("s1", "1001", 1, 10), exam("s2", "1001", 1, 10)];
        let groups = group_exams(&exams);
        assert_eq!(groups[0].crns, vec!["1001"]);
        assert_eq!(groups[0].student_count, 2);
    }

    #[test]
    fn identical_start_with_different_end_splits_groups() {
        let mut long = exam("s2", "1002", 1, 10);
        long.end = Some(dt(1, 13));
        let groups = group_exams(&[exam("s1", "1001", 1, 10), long]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn empty_input_produces_no_groups() {
        assert!(group_exams(&[]).is_empty());
        assert!(group_exams(&[failed("s1")]).is_empty());
    }
}
