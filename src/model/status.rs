use crate::model::Completion;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The display status of a charge, derived from its completion flag and its signed day count.
///
/// A non-negative `days_remaining` on an incomplete charge means the due date has been reached,
/// so the charge is overdue. A negative value is the number of days still left.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Done,
    Overdue { days: u64 },
    Pending { days: u64 },
}

impl Status {
    pub fn classify(completed: Completion, days_remaining: i64) -> Self {
        if completed.is_done() {
            Status::Done
        } else if days_remaining >= 0 {
            Status::Overdue {
                days: days_remaining.unsigned_abs(),
            }
        } else {
            Status::Pending {
                days: days_remaining.unsigned_abs(),
            }
        }
    }

    /// The number of days shown next to the status, if any.
    pub fn magnitude(&self) -> Option<u64> {
        match self {
            Status::Done => None,
            Status::Overdue { days } | Status::Pending { days } => Some(*days),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (label, days) = match self {
            Status::Done => return write!(f, "Done"),
            Status::Overdue { days } => ("Overdue", *days),
            Status::Pending { days } => ("Pending", *days),
        };
        let plural = if days == 1 { "" } else { "s" };
        write!(f, "{label} ({days} day{plural})")
    }
}
