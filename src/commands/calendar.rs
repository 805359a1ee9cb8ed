use crate::args::CalendarArgs;
use crate::commands::{plural, today, Out};
use crate::db::CalendarFilter;
use crate::error::{ErrorType, IntoResult};
use crate::model::CalendarEntry;
use crate::{Config, Result};
use anyhow::anyhow;
use std::fmt::Write;

/// Shows the charges of the user's house, ordered by due date, with their status.
///
/// `--contribution` keeps one contribution and `--pending` keeps the charges that are not done.
///
/// # Errors
///
/// - Returns a `Request` error if the house does not exist.
/// - Returns a `Database` error if the query fails.
pub async fn calendar(config: Config, args: CalendarArgs) -> Result<Out<Vec<CalendarEntry>>> {
    let user = args.view().user();
    let as_of = args.view().as_of().unwrap_or_else(today);
    let filter = CalendarFilter {
        contribution_id: args.contribution(),
        unpaid_only: args.pending(),
    };
    let db = config.db();
    let house = db
        .house(user)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| anyhow!("There is no house with id {user}"))
        .pub_result(ErrorType::Request)?;
    let entries = db
        .calendar(house.id, as_of, filter)
        .await
        .pub_result(ErrorType::Database)?;

    let mut message = format!(
        "Calendar of house {} ({}) as of {as_of}: {}",
        house.id,
        house.responsible,
        plural(entries.len(), "charge", "charges")
    );
    for entry in &entries {
        let _ = write!(
            message,
            "\n  {}  {}  {}",
            entry.due_date,
            entry.description.as_deref().unwrap_or("-"),
            entry.status
        );
        if let Some(days) = entry.period_days {
            let every = plural(days.unsigned_abs() as usize, "day", "days");
            let _ = write!(message, "  every {every}");
        }
        if let Some(paid) = entry.paid {
            let _ = write!(message, "  paid {paid}");
        }
    }
    Ok(Out::new(message, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ViewArgs;
    use crate::model::Status;
    use crate::test::{date, TestEnv};

    #[tokio::test]
    async fn test_calendar() {
        let env = TestEnv::seeded().await;
        let out = calendar(env.config(), CalendarArgs::new(ViewArgs::new(9, Some(date("2024-01-20")))))
            .await
            .unwrap();

        let entries = out.structure().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, Status::Done);
        assert_eq!(entries[1].status, Status::Pending { days: 21 });

        let expected = "\
Calendar of house 9 (López) as of 2024-01-20: 2 charges
  2024-01-10  Mantenimiento Jardines  Done  every 30 days
  2024-02-10  Mantenimiento Jardines  Pending (21 days)  every 30 days";
        assert_eq!(out.message(), expected);
    }

    #[tokio::test]
    async fn test_calendar_unknown_house() {
        let env = TestEnv::seeded().await;
        let err = calendar(env.config(), CalendarArgs::new(ViewArgs::new(42, None)))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_calendar_empty() {
        let env = TestEnv::seeded().await;
        let out = calendar(env.config(), CalendarArgs::new(ViewArgs::new(1, None))).await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert!(out.message().ends_with("0 charges"));
    }

    #[tokio::test]
    async fn test_calendar_pending_for_one_contribution() {
        let env = TestEnv::seeded().await;
        let view = ViewArgs::new(5, Some(date("2024-01-20")));

        let args = CalendarArgs::new(view.clone()).pending_only();
        let out = calendar(env.config(), args).await.unwrap();
        let dates: Vec<_> = out
            .structure()
            .unwrap()
            .iter()
            .map(|e| e.due_date.as_str())
            .collect();
        assert_eq!(dates, vec!["2024-01-10", "2024-01-31", "2024-02-10"]);

        let args = CalendarArgs::new(view).with_contribution(2).pending_only();
        let out = calendar(env.config(), args).await.unwrap();
        let entries = out.structure().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, Status::Pending { days: 11 });
        assert!(out.message().ends_with("Cuota mensual  Pending (11 days)  every 30 days"));
    }

    #[tokio::test]
    async fn test_calendar_pending_hides_done() {
        let env = TestEnv::seeded().await;
        let args = CalendarArgs::new(ViewArgs::new(9, Some(date("2024-01-20")))).pending_only();
        let out = calendar(env.config(), args).await.unwrap();
        let entries = out.structure().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].due_date, "2024-02-10");
    }
}
