use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// Type aliases for clarity
pub type StudentId = String;
pub type Crn = String;
pub type RoomId = String;

/// One recurring weekly commitment of a student. Weekday is 0 = Monday
/// through 6 = Sunday. The tag links a slot to the course whose exam is
/// allowed to overlap it (self-exemption); it is set once during the
/// tagging pass and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimetableSlot {
    pub weekday: u32,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub tag: Option<Crn>,
}

pub type Timetable = HashMap<StudentId, Vec<TimetableSlot>>;

/// A named alternative-time policy the instructor opted into for one
/// exam request. Serialized under the original sign-up sheet labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ConflictOption {
    #[serde(rename = "8:00 am the day of the exam")]
    DayOfMorning,
    #[serde(rename = "5:00 pm the day of the exam")]
    DayOfEvening,
    #[serde(rename = "8:00 am the day BEFORE the exam")]
    DayBeforeMorning,
    #[serde(rename = "5:00 pm the day BEFORE the exam")]
    DayBeforeEvening,
    #[serde(rename = "8:00 am the day AFTER the exam")]
    DayAfterMorning,
    #[serde(rename = "5:00 pm the day AFTER the exam")]
    DayAfterEvening,
    #[serde(rename = "8:00 am up to a week AFTER the exam")]
    WeekAfterMorning,
    #[serde(rename = "5:00 pm up to a week AFTER the exam")]
    WeekAfterEvening,
}

impl ConflictOption {
    pub fn label(&self) -> &'static str {
        match self {
            ConflictOption::DayOfMorning => "8:00 am the day of the exam",
            ConflictOption::DayOfEvening => "5:00 pm the day of the exam",
            ConflictOption::DayBeforeMorning => "8:00 am the day BEFORE the exam",
            ConflictOption::DayBeforeEvening => "5:00 pm the day BEFORE the exam",
            ConflictOption::DayAfterMorning => "8:00 am the day AFTER the exam",
            ConflictOption::DayAfterEvening => "5:00 pm the day AFTER the exam",
            ConflictOption::WeekAfterMorning => "8:00 am up to a week AFTER the exam",
            ConflictOption::WeekAfterEvening => "5:00 pm up to a week AFTER the exam",
        }
    }

    /// Day offset relative to the instructor-proposed date. Week-after
    /// options expand to offsets 1..=7 and never call this.
    pub fn day_offset(&self) -> i64 {
        match self {
            ConflictOption::DayOfMorning | ConflictOption::DayOfEvening => 0,
            ConflictOption::DayBeforeMorning | ConflictOption::DayBeforeEvening => -1,
            ConflictOption::DayAfterMorning | ConflictOption::DayAfterEvening => 1,
            ConflictOption::WeekAfterMorning | ConflictOption::WeekAfterEvening => 1,
        }
    }

    pub fn fixed_time(&self) -> NaiveTime {
        match self {
            ConflictOption::DayOfMorning
            | ConflictOption::DayBeforeMorning
            | ConflictOption::DayAfterMorning
            | ConflictOption::WeekAfterMorning => NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            _ => NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }

    pub fn is_week_after(&self) -> bool {
        matches!(
            self,
            ConflictOption::WeekAfterMorning | ConflictOption::WeekAfterEvening
        )
    }
}

/// One immutable exam request row: a (student, course) pair with the
/// instructor-declared time, accommodation flags, and the conflict
/// options enabled on the sign-up sheet, in declaration order.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRequest {
    pub student_id: StudentId,
    pub crn: Crn,
    /// Comma-separated weekday letters the class meets on, e.g. "M, W".
    #[serde(default)]
    pub class_days: String,
    /// Class start time as written on the sheet, e.g. "11:00 AM".
    #[serde(default)]
    pub class_start: String,
    pub instructor_exam_date: String,
    pub instructor_exam_time: String,
    #[serde(default)]
    pub duration: String,
    /// No exam may start before 09:00.
    #[serde(default)]
    pub no_am: bool,
    /// No exam may end after 18:00.
    #[serde(default)]
    pub no_pm: bool,
    #[serde(default)]
    pub conflict_options: Vec<ConflictOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum ScheduleStatus {
    #[serde(rename = "SCHEDULED")]
    Scheduled,
    #[serde(rename = "Invalid instructor date/time")]
    InvalidInstructorTime,
    #[serde(rename = "No available slot")]
    NoAvailableSlot,
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleStatus::Scheduled => "SCHEDULED",
            ScheduleStatus::InvalidInstructorTime => "Invalid instructor date/time",
            ScheduleStatus::NoAvailableSlot => "No available slot",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of scheduling one exam request. Produced exactly once per
/// request; start/end/label are present iff the status is Scheduled.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExam {
    pub student_id: StudentId,
    pub crn: Crn,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Label of the winning candidate rule.
    pub label: Option<String>,
    pub status: ScheduleStatus,
}

impl ScheduledExam {
    pub fn is_scheduled(&self) -> bool {
        self.status == ScheduleStatus::Scheduled
    }
}

/// A bucket of scheduled exams sharing an identical (start, end) pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamGroup {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub student_ids: Vec<StudentId>,
    pub crns: Vec<Crn>,
    pub student_count: usize,
}

/// A physical room with capacity and an optional availability window.
/// Read-only reference data for one assignment run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    #[serde(alias = "id", alias = "roomId", alias = "name")]
    pub location: RoomId,
    #[serde(default = "default_capacity", deserialize_with = "de_capacity")]
    pub capacity: u32,
    #[serde(default, alias = "startTime")]
    pub available_from: Option<NaiveDateTime>,
    #[serde(default, alias = "endTime")]
    pub available_until: Option<NaiveDateTime>,
}

impl RoomRecord {
    /// Whether the room's availability window fully contains [start, end).
    /// A missing bound is treated as unbounded on that side.
    pub fn covers(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        if let Some(from) = self.available_from {
            if start < from {
                return false;
            }
        }
        if let Some(until) = self.available_until {
            if end > until {
                return false;
            }
        }
        true
    }
}

fn default_capacity() -> u32 {
    1
}

// Capacity arrives as a number or a string depending on the inventory
// source; anything unparsable falls back to 1.
fn de_capacity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }
    let capacity = match Raw::deserialize(deserializer) {
        Ok(Raw::Int(n)) if n >= 1 => n as u32,
        Ok(Raw::Float(f)) if f >= 1.0 => f as u32,
        Ok(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| *f >= 1.0)
            .map(|f| f as u32)
            .unwrap_or(1),
        _ => 1,
    };
    Ok(capacity)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum AssignmentStatus {
    #[serde(rename = "Assigned")]
    Assigned,
    #[serde(rename = "Assigned (ILP)")]
    AssignedIlp,
    #[serde(rename = "No room needed - exam not scheduled")]
    NotScheduled,
    #[serde(rename = "Invalid time slot")]
    InvalidTimeSlot,
    #[serde(rename = "No rooms available")]
    NoRoomsAvailable,
    #[serde(rename = "No rooms assigned by ILP")]
    NoIlpAssignment,
    #[serde(rename = "No available rooms with capacity")]
    NoCapacity,
    #[serde(rename = "All assigned rooms at capacity")]
    AtCapacity,
}

impl AssignmentStatus {
    pub fn is_assigned(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Assigned | AssignmentStatus::AssignedIlp
        )
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentStatus::Assigned => "Assigned",
            AssignmentStatus::AssignedIlp => "Assigned (ILP)",
            AssignmentStatus::NotScheduled => "No room needed - exam not scheduled",
            AssignmentStatus::InvalidTimeSlot => "Invalid time slot",
            AssignmentStatus::NoRoomsAvailable => "No rooms available",
            AssignmentStatus::NoIlpAssignment => "No rooms assigned by ILP",
            AssignmentStatus::NoCapacity => "No available rooms with capacity",
            AssignmentStatus::AtCapacity => "All assigned rooms at capacity",
        };
        write!(f, "{}", s)
    }
}

/// Per original exam row: the room it ended up in, if any, and why.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAssignment {
    pub student_id: StudentId,
    pub crn: Crn,
    pub room: Option<RoomId>,
    pub status: AssignmentStatus,
}

/// Objective function for the exact optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Minimize the number of rooms used.
    #[default]
    MinimizeRooms,
    /// Minimize summed inverse capacity of assignments; biases toward
    /// smaller rooms.
    MinimizeWeighted,
    /// Minimize summed capacity of assignments; biases toward fewer,
    /// larger rooms.
    MinimizeCapacity,
}

/// Scope of the exact optimizer's capacity constraint. The upstream
/// formulation sums student counts across every group assigned to a room
/// regardless of time windows, which can make non-overlapping
/// co-assignments spuriously infeasible; callers choose which reading
/// they want.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityScope {
    /// Capacity accumulates across all co-assigned groups for the run.
    #[default]
    AcrossRun,
    /// Capacity is only constrained across groups whose windows overlap.
    PerWindow,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IlpConfig {
    pub objective: Objective,
    pub capacity_scope: CapacityScope,
    /// Symmetric tolerance applied to both intervals before the pairwise
    /// overlap test, in minutes.
    pub overlap_tolerance_minutes: i64,
    /// Wall-clock limit for the solve, in seconds.
    pub time_limit_seconds: Option<f64>,
}

impl Default for IlpConfig {
    fn default() -> Self {
        IlpConfig {
            objective: Objective::default(),
            capacity_scope: CapacityScope::default(),
            overlap_tolerance_minutes: 0,
            time_limit_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    TimeLimit,
    NoExams,
    NoRooms,
    Error,
}

/// Result of one exact-optimizer run: group index to room, plus status
/// and solve metadata. Solver faults never escape as errors; they show
/// up as `SolveStatus::Error` with an empty assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IlpOutcome {
    pub assignments: HashMap<usize, RoomId>,
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub solve_time: Duration,
}

impl IlpOutcome {
    pub fn empty(status: SolveStatus) -> Self {
        IlpOutcome {
            assignments: HashMap::new(),
            status,
            objective_value: None,
            solve_time: Duration::ZERO,
        }
    }
}
