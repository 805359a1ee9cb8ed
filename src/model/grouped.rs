//! The nested work groups view: contribution → group → due date → houses.

use crate::model::{Completion, Status};
use serde::{Deserialize, Serialize};

/// All the groups responsible for one contribution, in the order they were first seen.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupedContribution {
    pub description: String,
    pub groups: Vec<GroupEntry>,
}

/// One group of houses and the due dates assigned to it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupEntry {
    pub group_id: i64,
    pub dates: Vec<DateEntry>,
}

/// One occurrence of a contribution for a group.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DateEntry {
    pub due_date: String,
    pub days_remaining: i64,
    pub completed: Completion,
    /// Unique by id, in first-seen order.
    pub houses: Vec<HouseRef>,
}

impl DateEntry {
    pub fn status(&self) -> Status {
        Status::classify(self.completed, self.days_remaining)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HouseRef {
    pub id: i64,
    pub label: String,
}
