//! Room inventory access.
//!
//! The inventory service behind the real deployment answers one
//! question: which rooms can hold `min_capacity` students for a given
//! time window. [`RoomSource`] is that boundary; [`InMemoryRooms`]
//! answers it from a materialized room list.

use crate::data::{ExamGroup, RoomRecord};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// "Fetch room inventory for a time window and minimum capacity."
pub trait RoomSource {
    fn rooms_for(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        min_capacity: u32,
    ) -> Vec<RoomRecord>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRooms {
    rooms: Vec<RoomRecord>,
}

impl InMemoryRooms {
    pub fn new(rooms: Vec<RoomRecord>) -> Self {
        InMemoryRooms { rooms }
    }
}

impl RoomSource for InMemoryRooms {
    fn rooms_for(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        min_capacity: u32,
    ) -> Vec<RoomRecord> {
        self.rooms
            .iter()
            .filter(|room| room.capacity >= min_capacity && room.covers(start, end))
            .cloned()
            .collect()
    }
}

/// Candidate rooms per exact (start, end) key, in inventory order.
pub type SlotInventory = HashMap<(NaiveDateTime, NaiveDateTime), Vec<RoomRecord>>;

/// One inventory lookup per group, keyed by the group's exact window.
pub fn build_inventory(groups: &[ExamGroup], source: &dyn RoomSource) -> SlotInventory {
    groups
        .iter()
        .map(|group| {
            (
                (group.start, group.end),
                source.rooms_for(group.start, group.end, group.student_count as u32),
            )
        })
        .collect()
}
