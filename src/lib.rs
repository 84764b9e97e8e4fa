//! Accommodated-exam scheduling and room assignment.
//!
//! A two-stage batch pipeline: [`scheduler`] finds each exam request a
//! conflict-free time slot against the student's recurring timetable
//! and their other exams, then [`pipeline`] assigns rooms to the
//! resulting (start, end) groups either exactly (binary integer
//! program, [`ilp`]) or greedily ([`greedy`]).

pub mod data;
pub mod greedy;
pub mod grouping;
#[cfg(feature = "ilp")]
pub mod ilp;
pub mod parse;
pub mod pipeline;
pub mod rooms;
pub mod scheduler;
pub mod server;
pub mod timetable;
