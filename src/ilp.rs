//! Exact group-to-room assignment via binary integer programming.
//!
//! Model: x[i][r] = 1 iff group i sits in room r, used[r] = 1 iff any
//! group sits in room r. Every group takes exactly one room; capacity,
//! availability-window, and pairwise-overlap constraints prune the rest;
//! the objective picks between minimizing rooms used, summed inverse
//! capacity, or summed capacity.

use crate::data::{
    AssignmentStatus, CapacityScope, ExamGroup, IlpConfig, IlpOutcome, Objective, RoomAssignment,
    RoomId, RoomRecord, ScheduledExam, SolveStatus,
};
use crate::parse;
use chrono::{Duration, NaiveDateTime};
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus, SolverModel, Variable,
    constraint, default_solver, variable,
};
use log::{info, trace, warn};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Builds and solves the assignment program. Never panics and never
/// propagates a solver fault; every outcome is a status.
pub fn solve(groups: &[ExamGroup], rooms: &[RoomRecord], config: &IlpConfig) -> IlpOutcome {
    if groups.is_empty() {
        return IlpOutcome::empty(SolveStatus::NoExams);
    }
    if rooms.is_empty() {
        return IlpOutcome::empty(SolveStatus::NoRooms);
    }

    // first record per location wins
    let mut room_list: Vec<&RoomRecord> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for room in rooms {
        if seen.insert(room.location.as_str()) {
            room_list.push(room);
        }
    }

    info!(
        "Setting up ILP model with {} exam groups and {} rooms...",
        groups.len(),
        room_list.len()
    );
    let started = Instant::now();

    let mut problem = ProblemVariables::new();
    let x: Vec<Vec<Variable>> = (0..groups.len())
        .map(|_| problem.add_vector(variable().binary(), room_list.len()))
        .collect();
    let used: Vec<Variable> = problem.add_vector(variable().binary(), room_list.len());

    let objective: Expression = match config.objective {
        Objective::MinimizeRooms => used.iter().copied().sum(),
        Objective::MinimizeWeighted => x
            .iter()
            .map(|row| -> Expression {
                row.iter()
                    .zip(&room_list)
                    .map(|(var, room)| (1.0 / room.capacity.max(1) as f64) * *var)
                    .sum()
            })
            .sum(),
        Objective::MinimizeCapacity => x
            .iter()
            .map(|row| -> Expression {
                row.iter()
                    .zip(&room_list)
                    .map(|(var, room)| room.capacity as f64 * *var)
                    .sum()
            })
            .sum(),
    };

    let mut model = problem
        .minimise(objective)
        .using(default_solver)
        .set_option("threads", 1) // limit to 1 thread for reproducibility
        .set_option("random_seed", 1234)
        .set_option("log_to_console", "false");
    if let Some(limit) = config.time_limit_seconds {
        model = model.set_option("time_limit", limit);
    }

    // exactly one room per group
    for row in &x {
        let assigned: Expression = row.iter().copied().sum();
        model.add_constraint(constraint!(assigned == 1));
    }

    // capacity, under the configured accumulation scope
    match config.capacity_scope {
        CapacityScope::AcrossRun => {
            for (r, room) in room_list.iter().enumerate() {
                let load: Expression = groups
                    .iter()
                    .enumerate()
                    .map(|(i, group)| group.student_count as f64 * x[i][r])
                    .sum();
                model.add_constraint(constraint!(load <= room.capacity as f64));
            }
        }
        CapacityScope::PerWindow => {
            for (r, room) in room_list.iter().enumerate() {
                for (i, group) in groups.iter().enumerate() {
                    let load: Expression = groups
                        .iter()
                        .enumerate()
                        .filter(|&(j, other)| {
                            j == i
                                || windows_overlap(group, other, config.overlap_tolerance_minutes)
                        })
                        .map(|(j, other)| other.student_count as f64 * x[j][r])
                        .sum();
                    model.add_constraint(constraint!(load <= room.capacity as f64));
                }
            }
        }
    }

    // availability: a group outside a room's window never takes it
    let mut excluded = 0usize;
    for (i, group) in groups.iter().enumerate() {
        for (r, room) in room_list.iter().enumerate() {
            if !room.covers(group.start, group.end) {
                model.add_constraint(constraint!(x[i][r] == 0));
                excluded += 1;
            }
        }
    }
    trace!("Excluded {} (group, room) pairs on availability windows", excluded);

    // overlapping groups never share a room
    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            if windows_overlap(&groups[i], &groups[j], config.overlap_tolerance_minutes) {
                for r in 0..room_list.len() {
                    model.add_constraint(constraint!(x[i][r] + x[j][r] <= 1));
                }
            }
        }
    }

    // linking: an assignment marks its room used
    for row in &x {
        for (r, &var) in row.iter().enumerate() {
            model.add_constraint(constraint!(var <= used[r]));
        }
    }

    info!("Starting ILP solver...");
    match model.solve() {
        Ok(solution) => {
            let solve_time = started.elapsed();
            let mut assignments: HashMap<usize, RoomId> = HashMap::new();
            for (i, row) in x.iter().enumerate() {
                for (r, var) in row.iter().enumerate() {
                    if solution.value(*var) > 0.5 {
                        assignments.insert(i, room_list[r].location.clone());
                        break;
                    }
                }
            }
            // a limit hit with an incumbent still yields a usable
            // assignment; only the status differs
            let status = match solution.status() {
                SolutionStatus::TimeLimit => {
                    info!("Time limit reached with an incumbent after {:.2?}", solve_time);
                    SolveStatus::TimeLimit
                }
                SolutionStatus::Optimal | SolutionStatus::GapLimit => {
                    info!("Solution found in {:.2?}", solve_time);
                    SolveStatus::Optimal
                }
            };
            let objective_value = Some(objective_value(&room_list, &assignments, config));
            IlpOutcome {
                assignments,
                status,
                objective_value,
                solve_time,
            }
        }
        Err(ResolutionError::Infeasible) => {
            info!("ILP is infeasible");
            IlpOutcome {
                solve_time: started.elapsed(),
                ..IlpOutcome::empty(SolveStatus::Infeasible)
            }
        }
        // the backend reports a limit hit without any incumbent as a
        // bare "NoSolutionFound"
        Err(ResolutionError::Other("NoSolutionFound")) if config.time_limit_seconds.is_some() => {
            info!("Time limit reached before any feasible solution");
            IlpOutcome {
                solve_time: started.elapsed(),
                ..IlpOutcome::empty(SolveStatus::TimeLimit)
            }
        }
        Err(err) => {
            warn!("ILP solver fault: {}", err);
            IlpOutcome {
                solve_time: started.elapsed(),
                ..IlpOutcome::empty(SolveStatus::Error)
            }
        }
    }
}

fn windows_overlap(a: &ExamGroup, b: &ExamGroup, tolerance_minutes: i64) -> bool {
    let pad = Duration::minutes(tolerance_minutes);
    parse::overlaps(a.start - pad, a.end + pad, b.start - pad, b.end + pad)
}

// Recomputed from the chosen assignment rather than read back from the
// solver, so the reported value matches the configured objective even
// across backends.
fn objective_value(
    room_list: &[&RoomRecord],
    assignments: &HashMap<usize, RoomId>,
    config: &IlpConfig,
) -> f64 {
    let capacities: HashMap<&str, u32> = room_list
        .iter()
        .map(|room| (room.location.as_str(), room.capacity))
        .collect();
    match config.objective {
        Objective::MinimizeRooms => assignments
            .values()
            .collect::<HashSet<_>>()
            .len() as f64,
        Objective::MinimizeWeighted => assignments
            .values()
            .map(|room| 1.0 / capacities.get(room.as_str()).copied().unwrap_or(1).max(1) as f64)
            .sum(),
        Objective::MinimizeCapacity => assignments
            .values()
            .map(|room| capacities.get(room.as_str()).copied().unwrap_or(1) as f64)
            .sum(),
    }
}

/// Walks the original exam rows applying the solved group-to-room map.
/// Occupancy per (start, end, room) is tracked in case a room serves
/// several co-assigned groups; a row that would push a room past its
/// capacity is flagged instead of overbooked.
pub fn apply_assignments(
    exams: &[ScheduledExam],
    groups: &[ExamGroup],
    outcome: &IlpOutcome,
    rooms: &[RoomRecord],
) -> Vec<RoomAssignment> {
    let mut slot_rooms: HashMap<(NaiveDateTime, NaiveDateTime), &RoomId> = HashMap::new();
    for (index, room) in &outcome.assignments {
        if let Some(group) = groups.get(*index) {
            slot_rooms.insert((group.start, group.end), room);
        }
    }
    let capacities: HashMap<&str, u32> = rooms
        .iter()
        .map(|room| (room.location.as_str(), room.capacity))
        .collect();

    let mut occupancy: HashMap<(NaiveDateTime, NaiveDateTime, &str), u32> = HashMap::new();
    let mut results = Vec::with_capacity(exams.len());

    for exam in exams {
        let (room, status) = if !exam.is_scheduled() {
            (None, AssignmentStatus::NotScheduled)
        } else {
            match (exam.start, exam.end) {
                (Some(start), Some(end)) => match slot_rooms.get(&(start, end)) {
                    Some(location) => {
                        let capacity = capacities
                            .get(location.as_str())
                            .copied()
                            .unwrap_or(1);
                        let count = occupancy.entry((start, end, location.as_str())).or_insert(0);
                        if *count < capacity {
                            *count += 1;
                            (Some((*location).clone()), AssignmentStatus::AssignedIlp)
                        } else {
                            // should not happen when the program solved
                            // correctly
                            (None, AssignmentStatus::AtCapacity)
                        }
                    }
                    None => (None, AssignmentStatus::NoIlpAssignment),
                },
                _ => (None, AssignmentStatus::InvalidTimeSlot),
            }
        };
        results.push(RoomAssignment {
            student_id: exam.student_id.clone(),
            crn: exam.crn.clone(),
            room,
            status,
        });
    }
    results
}
