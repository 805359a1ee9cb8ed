//! Builds the nested work groups view from the flat rows returned by the datastore.
//!
//! The rows arrive sorted by `(description, due_date, group_id)` and are folded in that order into
//! `description → group → due date → houses`. Nothing is re-sorted here: every level keeps the
//! order in which its first row was seen.
//!
//! Non-admin requesters only see the groups they belong to. Membership is decided against the
//! complete row set before folding starts, so a row for a neighbour's house stays visible as long
//! as the requester's own house appears somewhere in the same `(description, group)`.

use crate::model::{
    Completion, ContributionRow, DateEntry, GroupEntry, GroupedContribution, HouseRef, Requester,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Groups `rows` into contributions, groups, due dates and houses as seen by `requester`.
///
/// Rows with no description or no group id are skipped, as are rows from groups the requester is
/// not a member of (unless the requester is an admin). This never fails; bad rows just do not
/// show up in the output.
pub fn group_contributions(
    rows: &[ContributionRow],
    requester: &Requester,
) -> Vec<GroupedContribution> {
    let visibility = Visibility::new(rows, requester);
    let mut tree = Tree::default();
    let mut hidden = 0usize;
    let mut incomplete = 0usize;

    for row in rows {
        if !visibility.admits(row) {
            hidden += 1;
            continue;
        }
        let (Some(description), Some(group_id)) = (row.description.as_deref(), row.group_id) else {
            incomplete += 1;
            continue;
        };
        tree.add(description, group_id, row);
    }

    let contributions = tree.finish();
    debug!(
        "Grouped {} rows into {} contributions for requester {} ({} hidden, {} incomplete)",
        rows.len(),
        contributions.len(),
        requester.id,
        hidden,
        incomplete
    );
    contributions
}

/// Decides which rows a requester may see.
enum Visibility<'a> {
    All,
    /// The `(description, group_id)` pairs that contain the requester's house.
    Member(HashSet<(&'a str, i64)>),
}

impl<'a> Visibility<'a> {
    fn new(rows: &'a [ContributionRow], requester: &Requester) -> Self {
        if requester.is_admin() {
            return Visibility::All;
        }
        let groups = rows
            .iter()
            .filter(|row| row.house_id == Some(requester.id))
            .filter_map(|row| Some((row.description.as_deref()?, row.group_id?)))
            .collect::<HashSet<_>>();
        trace!(
            "Requester {} is a member of {} groups",
            requester.id,
            groups.len()
        );
        Visibility::Member(groups)
    }

    fn admits(&self, row: &ContributionRow) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Member(groups) => match (row.description.as_deref(), row.group_id) {
                (Some(description), Some(group_id)) => groups.contains(&(description, group_id)),
                _ => false,
            },
        }
    }
}

/// The accumulator for the fold. Each level pairs the ordered output with a lookup index into it.
#[derive(Default)]
struct Tree {
    contributions: Vec<ContributionNode>,
    index: HashMap<String, usize>,
}

struct ContributionNode {
    description: String,
    groups: Vec<GroupNode>,
    index: HashMap<i64, usize>,
}

struct GroupNode {
    group_id: i64,
    dates: Vec<DateNode>,
    index: HashMap<String, usize>,
}

struct DateNode {
    due_date: String,
    days_remaining: i64,
    completed: Completion,
    houses: Vec<HouseRef>,
    seen: HashSet<i64>,
}

impl Tree {
    fn add(&mut self, description: &str, group_id: i64, row: &ContributionRow) {
        let ix = match self.index.get(description) {
            Some(&ix) => ix,
            None => {
                self.contributions.push(ContributionNode {
                    description: description.to_string(),
                    groups: Vec::new(),
                    index: HashMap::new(),
                });
                let ix = self.contributions.len() - 1;
                self.index.insert(description.to_string(), ix);
                ix
            }
        };
        self.contributions[ix].add(group_id, row);
    }

    fn finish(self) -> Vec<GroupedContribution> {
        self.contributions
            .into_iter()
            .map(ContributionNode::finish)
            .collect()
    }
}

impl ContributionNode {
    fn add(&mut self, group_id: i64, row: &ContributionRow) {
        let ix = *self.index.entry(group_id).or_insert_with(|| {
            self.groups.push(GroupNode {
                group_id,
                dates: Vec::new(),
                index: HashMap::new(),
            });
            self.groups.len() - 1
        });
        self.groups[ix].add(row);
    }

    fn finish(self) -> GroupedContribution {
        GroupedContribution {
            description: self.description,
            groups: self.groups.into_iter().map(GroupNode::finish).collect(),
        }
    }
}

impl GroupNode {
    fn add(&mut self, row: &ContributionRow) {
        let ix = match self.index.get(&row.due_date) {
            Some(&ix) => ix,
            None => {
                // The first row for a date decides its day count and completion.
                self.dates.push(DateNode {
                    due_date: row.due_date.clone(),
                    days_remaining: row.days_remaining.unwrap_or(0),
                    completed: row.completed,
                    houses: Vec::new(),
                    seen: HashSet::new(),
                });
                let ix = self.dates.len() - 1;
                self.index.insert(row.due_date.clone(), ix);
                ix
            }
        };
        self.dates[ix].add(row);
    }

    fn finish(self) -> GroupEntry {
        GroupEntry {
            group_id: self.group_id,
            dates: self.dates.into_iter().map(DateNode::finish).collect(),
        }
    }
}

impl DateNode {
    fn add(&mut self, row: &ContributionRow) {
        let (Some(id), Some(label)) = (row.house_id, row.house_label.as_ref()) else {
            return;
        };
        if self.seen.insert(id) {
            self.houses.push(HouseRef {
                id,
                label: label.clone(),
            });
        }
    }

    fn finish(self) -> DateEntry {
        DateEntry {
            due_date: self.due_date,
            days_remaining: self.days_remaining,
            completed: self.completed,
            houses: self.houses,
        }
    }
}
