//! The work groups view.

use crate::aggregate::group_contributions;
use crate::args::ViewArgs;
use crate::commands::{plural, today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{GroupedContribution, Requester};
use crate::source::ContributionSource;
use crate::{Config, Result};
use chrono::NaiveDate;
use std::fmt::Write;
use tracing::debug;

/// Shows the work groups visible to the user in `args`.
///
/// The rows are fetched in full before anything is grouped. If the fetch fails the command fails;
/// it never shows a partial view.
///
/// # Returns
///
/// An `Out` whose message is the rendered tree and whose structure is the grouped data.
///
/// # Errors
///
/// - Returns an error if the user does not exist.
/// - Returns an error if the database query fails.
pub async fn groups(config: Config, args: ViewArgs) -> Result<Out<Vec<GroupedContribution>>> {
    let as_of = args.as_of().unwrap_or_else(today);
    work_groups(config.db(), args.user(), as_of).await
}

async fn work_groups<S>(
    source: &S,
    user: i64,
    as_of: NaiveDate,
) -> Result<Out<Vec<GroupedContribution>>>
where
    S: ContributionSource + Sync,
{
    let requester = source
        .requester(user)
        .await
        .pub_result(ErrorType::Request)?;
    let rows = source
        .work_group_rows(as_of)
        .await
        .pub_result(ErrorType::Database)?;
    debug!("Fetched {} work group rows as of {as_of}", rows.len());
    let groups = group_contributions(&rows, &requester);
    Ok(Out::new(render(&requester, as_of, &groups), groups))
}

fn render(requester: &Requester, as_of: NaiveDate, contributions: &[GroupedContribution]) -> String {
    let mut s = format!(
        "Work groups for user {} ({}) as of {as_of}: {}",
        requester.id,
        requester.role,
        plural(contributions.len(), "contribution", "contributions")
    );
    for contribution in contributions {
        let _ = write!(s, "\n\n{}", contribution.description);
        for group in &contribution.groups {
            let _ = write!(s, "\n  Group {}", group.group_id);
            for date in &group.dates {
                let _ = write!(s, "\n    {}  {}", date.due_date, date.status());
                for house in &date.houses {
                    let _ = write!(s, "\n      House {}: {}", house.id, house.label);
                }
            }
        }
    }
    s
}
