//! The seam between the work groups view and wherever its rows come from.

use crate::error::Res;
use crate::model::{ContributionRow, Requester};
use chrono::NaiveDate;

/// Supplies the requester and the joined contribution rows for the work groups view.
#[async_trait::async_trait]
pub(crate) trait ContributionSource {
    /// Looks up the user with the given id. Errors if no such user exists.
    async fn requester(&self, id: i64) -> Res<Requester>;

    /// Returns every charge joined with its contribution and house, sorted by description, then
    /// due date, then group id. Day counts are relative to `as_of`.
    async fn work_group_rows(&self, as_of: NaiveDate) -> Res<Vec<ContributionRow>>;
}
