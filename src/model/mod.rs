//! Types that represent the core data model, such as `ContributionRow` and `GroupedContribution`.
mod contribution;
mod grouped;
mod house;
mod row;
mod status;

pub use contribution::{CalendarEntry, Charge, ChargeType, Contribution, Payment};
pub use grouped::{DateEntry, GroupEntry, GroupedContribution, HouseRef};
pub use house::{House, Role};
pub use row::{Completion, ContributionRow, Requester};
pub use status::Status;
