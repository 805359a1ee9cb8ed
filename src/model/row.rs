use crate::error::Res;
use crate::model::Role;
use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Whether the work or payment for a charge has been completed.
///
/// The datastore encodes this as a single-character flag: `S` for done and `N` for pending.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    Done,
    #[default]
    Pending,
}

serde_plain::derive_display_from_serialize!(Completion);
serde_plain::derive_fromstr_from_deserialize!(Completion);

const DONE_FLAG: &str = "S";
const PENDING_FLAG: &str = "N";

impl Completion {
    /// Parses the stored flag. Only `S` means done; anything else is treated as pending.
    pub fn from_flag(flag: &str) -> Self {
        if flag == DONE_FLAG {
            Completion::Done
        } else {
            Completion::Pending
        }
    }

    /// Strictly parses a flag from user input, e.g. a CSV cell.
    pub(crate) fn parse_flag(flag: &str) -> Res<Self> {
        match flag {
            DONE_FLAG => Ok(Completion::Done),
            PENDING_FLAG => Ok(Completion::Pending),
            bad => bail!("Invalid completion flag '{bad}', expected '{DONE_FLAG}' or '{PENDING_FLAG}'"),
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Completion::Done => DONE_FLAG,
            Completion::Pending => PENDING_FLAG,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Completion::Done)
    }
}

/// One joined record of house, contribution and charge, as returned by the datastore query that
/// feeds the work groups view. Any of the nullable columns may be missing.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContributionRow {
    pub description: Option<String>,
    pub group_id: Option<i64>,
    /// ISO `YYYY-MM-DD` text, passed through verbatim.
    pub due_date: String,
    /// Signed whole days from the due date to the reference date. Non-negative means the due date
    /// has been reached.
    pub days_remaining: Option<i64>,
    pub completed: Completion,
    pub house_id: Option<i64>,
    pub house_label: Option<String>,
}

/// The user asking for a view. Users are identified by their house id.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Requester {
    pub id: i64,
    pub role: Role,
}

impl Requester {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
