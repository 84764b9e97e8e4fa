//! Room-assignment orchestration.
//!
//! Groups the scheduled exams, searches the inventory per group, and
//! hands the result to either the exact optimizer or the greedy
//! heuristic. A requested-but-unavailable optimizer (crate built
//! without the `ilp` feature) and a solver fault both degrade to the
//! greedy path with a warning; callers never see a hard failure.

use crate::data::{IlpConfig, RoomAssignment, RoomRecord, ScheduledExam};
use crate::greedy;
use crate::grouping;
use crate::rooms::{self, InMemoryRooms, RoomSource};
use log::info;

pub struct RoomAssigner {
    rooms: Vec<RoomRecord>,
    use_ilp: bool,
    config: IlpConfig,
}

impl RoomAssigner {
    pub fn new(rooms: Vec<RoomRecord>) -> Self {
        RoomAssigner {
            rooms,
            use_ilp: true,
            config: IlpConfig::default(),
        }
    }

    pub fn with_ilp(mut self, use_ilp: bool) -> Self {
        self.use_ilp = use_ilp;
        self
    }

    pub fn with_config(mut self, config: IlpConfig) -> Self {
        self.config = config;
        self
    }

    /// Assigns a room (or a reason) to every input row. Occupancy state
    /// is local to this call; repeated runs are independent.
    pub fn assign_rooms(&self, exams: &[ScheduledExam]) -> Vec<RoomAssignment> {
        let groups = grouping::group_exams(exams);
        info!("Found {} unique exam time slots", groups.len());

        if self.use_ilp {
            match self.try_exact(exams, &groups) {
                Some(results) => return results,
                None => log::warn!("Falling back to greedy room assignment"),
            }
        }

        let source = InMemoryRooms::new(self.rooms.clone());
        let inventory = rooms::build_inventory(&groups, &source);
        greedy::assign(exams, &inventory)
    }

    #[cfg(feature = "ilp")]
    fn try_exact(
        &self,
        exams: &[ScheduledExam],
        groups: &[crate::data::ExamGroup],
    ) -> Option<Vec<RoomAssignment>> {
        use crate::data::{AssignmentStatus, SolveStatus};
        use crate::ilp;

        // union of the per-group searches, first record per location
        let source = InMemoryRooms::new(self.rooms.clone());
        let mut pool: Vec<RoomRecord> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for group in groups {
            for room in source.rooms_for(group.start, group.end, group.student_count as u32) {
                if seen.insert(room.location.clone()) {
                    pool.push(room);
                }
            }
        }
        if pool.is_empty() && !groups.is_empty() {
            return Some(
                exams
                    .iter()
                    .map(|exam| RoomAssignment {
                        student_id: exam.student_id.clone(),
                        crn: exam.crn.clone(),
                        room: None,
                        status: if exam.is_scheduled() {
                            AssignmentStatus::NoRoomsAvailable
                        } else {
                            AssignmentStatus::NotScheduled
                        },
                    })
                    .collect(),
            );
        }

        info!(
            "Solving ILP for {} exam groups and {} rooms...",
            groups.len(),
            pool.len()
        );
        let outcome = ilp::solve(groups, &pool, &self.config);
        info!(
            "ILP status: {:?}, solve time {:.2?}",
            outcome.status, outcome.solve_time
        );
        if outcome.status == SolveStatus::Error {
            return None;
        }
        Some(ilp::apply_assignments(exams, groups, &outcome, &pool))
    }

    #[cfg(not(feature = "ilp"))]
    fn try_exact(
        &self,
        _exams: &[ScheduledExam],
        _groups: &[crate::data::ExamGroup],
    ) -> Option<Vec<RoomAssignment>> {
        log::warn!("Exact optimizer requested but not compiled in (ilp feature disabled)");
        None
    }
}
