//! This module is responsible for reading, writing and managing the SQLite database.

mod migrations;

use crate::error::Res;
use crate::model::{
    CalendarEntry, Charge, Completion, Contribution, ContributionRow, House, Payment, Requester,
    Role, Status,
};
use crate::source::ContributionSource;
use anyhow::{bail, ensure, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

/// Narrows a house calendar.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub(crate) struct CalendarFilter {
    /// Only charges of this contribution.
    pub contribution_id: Option<i64>,
    /// Only charges that are not done yet.
    pub unpaid_only: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the schema by running all migrations
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        ensure!(
            !path.exists(),
            "A database already exists at '{}'",
            path.display()
        );
        let pool = connect(path, true).await?;

        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Failed to insert initial schema version")?;

        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created database at {}", path.display());
        Ok(Self { pool })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Brings the schema up to date if it is older than this program
    /// - Errors if the schema is newer than this program understands
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        ensure!(path.is_file(), "The database is missing '{}'", path.display());
        let pool = connect(path, false).await?;

        let (version,): (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .context("Failed to read the schema version")?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema is at version {version} but this program only understands \
                up to version {}. Is a newer version of dues available?",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// Inserts the houses, replacing the fields of any that already exist. Returns the count.
    pub(crate) async fn save_houses(&self, houses: &[House]) -> Res<usize> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        for house in houses {
            sqlx::query(
                "INSERT INTO houses (id, responsible, role, location, email) \
                 VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT (id) DO UPDATE SET responsible = excluded.responsible, \
                 role = excluded.role, location = excluded.location, email = excluded.email",
            )
            .bind(house.id)
            .bind(&house.responsible)
            .bind(house.role.to_string())
            .bind(&house.location)
            .bind(&house.email)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to save house {}", house.id))?;
        }
        tx.commit().await.context("Failed to commit houses")?;
        Ok(houses.len())
    }

    /// Inserts the contributions, replacing the fields of any that already exist.
    pub(crate) async fn save_contributions(&self, contributions: &[Contribution]) -> Res<usize> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        for c in contributions {
            sqlx::query(
                "INSERT INTO contributions \
                 (id, name, description, border_color, charge_day, period_days, charge_type) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (id) DO UPDATE SET name = excluded.name, \
                 description = excluded.description, border_color = excluded.border_color, \
                 charge_day = excluded.charge_day, period_days = excluded.period_days, \
                 charge_type = excluded.charge_type",
            )
            .bind(c.id)
            .bind(&c.name)
            .bind(&c.description)
            .bind(&c.border_color)
            .bind(c.charge_day)
            .bind(c.period_days)
            .bind(c.charge_type.map(|t| t.to_string()))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to save contribution {}", c.id))?;
        }
        tx.commit().await.context("Failed to commit contributions")?;
        Ok(contributions.len())
    }

    /// Inserts the charges. A charge is identified by house, contribution and due date.
    pub(crate) async fn save_charges(&self, charges: &[Charge]) -> Res<usize> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        for c in charges {
            sqlx::query(
                "INSERT INTO house_contributions \
                 (house_id, contribution_id, due_date, group_id, paid, done, paid_date, receipt_url) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (house_id, contribution_id, due_date) DO UPDATE SET \
                 group_id = excluded.group_id, paid = excluded.paid, done = excluded.done, \
                 paid_date = excluded.paid_date, receipt_url = excluded.receipt_url",
            )
            .bind(c.house_id)
            .bind(c.contribution_id)
            .bind(c.due_date.to_string())
            .bind(c.group_id)
            .bind(c.paid.map(|d| d.to_string()))
            .bind(c.completed.flag())
            .bind(c.paid_date.map(|d| d.to_string()))
            .bind(&c.receipt_url)
            .execute(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "Failed to save charge for house {} contribution {} due {}",
                    c.house_id, c.contribution_id, c.due_date
                )
            })?;
        }
        tx.commit().await.context("Failed to commit charges")?;
        Ok(charges.len())
    }

    pub(crate) async fn house(&self, id: i64) -> Res<Option<House>> {
        let row = sqlx::query("SELECT id, responsible, role, location, email FROM houses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to query house {id}"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let role: String = row.try_get("role")?;
        Ok(Some(House {
            id: row.try_get("id")?,
            responsible: row.try_get("responsible")?,
            role: Role::from_str(&role).with_context(|| format!("Invalid role '{role}'"))?,
            location: row.try_get("location")?,
            email: row.try_get("email")?,
        }))
    }

    /// The charges of one house with their status as of `as_of`, ordered by due date and
    /// narrowed by `filter`.
    pub(crate) async fn calendar(
        &self,
        house_id: i64,
        as_of: NaiveDate,
        filter: CalendarFilter,
    ) -> Res<Vec<CalendarEntry>> {
        let rows = sqlx::query(
            "SELECT hc.contribution_id, c.description, c.period_days, hc.due_date, \
             CAST(julianday(?) - julianday(hc.due_date) AS INTEGER) AS days_remaining, \
             hc.done, hc.paid, hc.paid_date, hc.receipt_url \
             FROM house_contributions hc \
             JOIN contributions c ON c.id = hc.contribution_id \
             WHERE hc.house_id = ? \
             AND (? IS NULL OR hc.contribution_id = ?) \
             AND (? = 0 OR hc.done = ?) \
             ORDER BY hc.due_date ASC, c.description ASC",
        )
        .bind(as_of.to_string())
        .bind(house_id)
        .bind(filter.contribution_id)
        .bind(filter.contribution_id)
        .bind(filter.unpaid_only)
        .bind(Completion::Pending.flag())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query the calendar of house {house_id}"))?;

        rows.iter().map(calendar_entry).collect()
    }

    /// Marks a charge as done and records the payment details.
    pub(crate) async fn report_payment(&self, payment: &Payment) -> Res<()> {
        let result = sqlx::query(
            "UPDATE house_contributions \
             SET done = ?, paid = ?, paid_date = ?, receipt_url = COALESCE(?, receipt_url) \
             WHERE house_id = ? AND contribution_id = ? AND due_date = ?",
        )
        .bind(Completion::Done.flag())
        .bind(payment.amount.to_string())
        .bind(payment.paid_date.to_string())
        .bind(&payment.receipt)
        .bind(payment.house_id)
        .bind(payment.contribution_id)
        .bind(payment.due_date.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to record the payment")?;

        if result.rows_affected() == 0 {
            bail!(
                "House {} has no charge for contribution {} due {}",
                payment.house_id,
                payment.contribution_id,
                payment.due_date
            );
        }
        Ok(())
    }

    /// Removes one charge and returns it as it was stored.
    pub(crate) async fn delete_charge(
        &self,
        house_id: i64,
        contribution_id: i64,
        due_date: NaiveDate,
    ) -> Res<Charge> {
        let row = sqlx::query(
            "DELETE FROM house_contributions \
             WHERE house_id = ? AND contribution_id = ? AND due_date = ? \
             RETURNING house_id, contribution_id, due_date, group_id, paid, done, paid_date, \
             receipt_url",
        )
        .bind(house_id)
        .bind(contribution_id)
        .bind(due_date.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete the charge")?;

        match row {
            Some(row) => charge(&row),
            None => bail!(
                "House {house_id} has no charge for contribution {contribution_id} due {due_date}"
            ),
        }
    }
}

#[async_trait::async_trait]
impl ContributionSource for Db {
    async fn requester(&self, id: i64) -> Res<Requester> {
        let house = self
            .house(id)
            .await?
            .with_context(|| format!("There is no user with id {id}"))?;
        Ok(Requester::new(house.id, house.role))
    }

    async fn work_group_rows(&self, as_of: NaiveDate) -> Res<Vec<ContributionRow>> {
        let rows = sqlx::query(
            "SELECT c.description, hc.group_id, hc.due_date, \
             CAST(julianday(?) - julianday(hc.due_date) AS INTEGER) AS days_remaining, \
             hc.done, h.id AS house_id, h.responsible AS house_label \
             FROM house_contributions hc \
             JOIN contributions c ON c.id = hc.contribution_id \
             LEFT JOIN houses h ON h.id = hc.house_id \
             ORDER BY c.description ASC, hc.due_date ASC, hc.group_id ASC, hc.house_id ASC",
        )
        .bind(as_of.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to query the work group rows")?;

        trace!("work_group_rows returned {} rows", rows.len());
        rows.iter().map(contribution_row).collect()
    }
}

async fn connect(path: &Path, create: bool) -> Res<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        // Backups copy the database file alone, so there must be no write-ahead log.
        .journal_mode(SqliteJournalMode::Delete)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}

fn contribution_row(row: &SqliteRow) -> Res<ContributionRow> {
    let done: String = row.try_get("done")?;
    Ok(ContributionRow {
        description: row.try_get("description")?,
        group_id: row.try_get("group_id")?,
        due_date: row.try_get("due_date")?,
        days_remaining: row.try_get("days_remaining")?,
        completed: Completion::from_flag(&done),
        house_id: row.try_get("house_id")?,
        house_label: row.try_get("house_label")?,
    })
}

fn charge(row: &SqliteRow) -> Res<Charge> {
    let due_date: String = row.try_get("due_date")?;
    let done: String = row.try_get("done")?;
    let paid_date: Option<String> = row.try_get("paid_date")?;
    Ok(Charge {
        house_id: row.try_get("house_id")?,
        contribution_id: row.try_get("contribution_id")?,
        due_date: parse_date(&due_date)?,
        group_id: row.try_get("group_id")?,
        paid: parse_amount(row.try_get("paid")?)?,
        completed: Completion::from_flag(&done),
        paid_date: paid_date.as_deref().map(parse_date).transpose()?,
        receipt_url: row.try_get("receipt_url")?,
    })
}

fn parse_date(s: &str) -> Res<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid stored date '{s}'"))
}

fn parse_amount(paid: Option<String>) -> Res<Option<Decimal>> {
    paid.map(|s| Decimal::from_str(&s).with_context(|| format!("Invalid paid amount '{s}'")))
        .transpose()
}

fn calendar_entry(row: &SqliteRow) -> Res<CalendarEntry> {
    let done: String = row.try_get("done")?;
    let days_remaining = row.try_get::<Option<i64>, _>("days_remaining")?.unwrap_or(0);
    let paid = parse_amount(row.try_get("paid")?)?;
    Ok(CalendarEntry {
        contribution_id: row.try_get("contribution_id")?,
        description: row.try_get("description")?,
        period_days: row.try_get("period_days")?,
        due_date: row.try_get("due_date")?,
        days_remaining,
        status: Status::classify(Completion::from_flag(&done), days_remaining),
        paid,
        paid_date: row.try_get("paid_date")?,
        receipt_url: row.try_get("receipt_url")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{date, TestEnv};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dues.sqlite");
        let _db = Db::init(&path).await.unwrap();
        assert!(Db::init(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(Db::load(dir.path().join("nope.sqlite")).await.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_newer_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dues.sqlite");
        let db = Db::init(&path).await.unwrap();
        sqlx::query("UPDATE schema_version SET version = 99")
            .execute(&db.pool)
            .await
            .unwrap();
        db.pool.close().await;
        let err = Db::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[tokio::test]
    async fn test_work_group_rows_sorted_with_day_counts() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();

        let rows = db.work_group_rows(date("2024-01-20")).await.unwrap();

        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.description.clone(), r.due_date.clone(), r.group_id, r.house_id))
            .collect();
        let cuota = Some("Cuota mensual".to_string());
        let jardines = Some("Mantenimiento Jardines".to_string());
        assert_eq!(
            keys,
            vec![
                (cuota.clone(), "2024-01-31".to_string(), None, Some(5)),
                (jardines.clone(), "2024-01-10".to_string(), Some(1), Some(5)),
                (jardines.clone(), "2024-01-10".to_string(), Some(1), Some(7)),
                (jardines.clone(), "2024-01-10".to_string(), Some(2), Some(9)),
                (jardines.clone(), "2024-02-10".to_string(), Some(1), Some(5)),
                (jardines.clone(), "2024-02-10".to_string(), Some(1), Some(7)),
                (jardines.clone(), "2024-02-10".to_string(), Some(2), Some(9)),
            ]
        );
        assert_eq!(rows[1].days_remaining, Some(10));
        assert_eq!(rows[4].days_remaining, Some(-21));
        assert_eq!(rows[3].completed, Completion::Done);
        assert_eq!(rows[1].house_label.as_deref(), Some("Pérez"));
    }

    #[tokio::test]
    async fn test_requester() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        assert_eq!(db.requester(1).await.unwrap(), Requester::new(1, Role::Admin));
        assert_eq!(db.requester(7).await.unwrap(), Requester::new(7, Role::Resident));
        assert!(db.requester(42).await.is_err());
    }

    #[tokio::test]
    async fn test_save_houses_updates_existing() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        let mut house = db.house(5).await.unwrap().unwrap();
        house.responsible = "Pérez Ramírez".into();
        house.role = Role::Admin;
        db.save_houses(&[house]).await.unwrap();

        let house = db.house(5).await.unwrap().unwrap();
        assert_eq!(house.responsible, "Pérez Ramírez");
        assert_eq!(house.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_charge_requires_known_house() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        let charge = Charge {
            house_id: 404,
            contribution_id: 1,
            due_date: date("2024-05-01"),
            group_id: Some(1),
            paid: None,
            completed: Completion::Pending,
            paid_date: None,
            receipt_url: None,
        };
        assert!(db.save_charges(&[charge]).await.is_err());
    }

    #[tokio::test]
    async fn test_calendar_and_payment() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        let as_of = date("2024-01-20");

        let calendar = db.calendar(5, as_of, CalendarFilter::default()).await.unwrap();
        let dates: Vec<_> = calendar.iter().map(|e| e.due_date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-10", "2024-01-31", "2024-02-10"]);
        assert_eq!(calendar[0].status, Status::Overdue { days: 10 });
        assert_eq!(calendar[1].status, Status::Pending { days: 11 });
        assert_eq!(calendar[1].paid, None);

        let payment = Payment {
            house_id: 5,
            contribution_id: 2,
            due_date: date("2024-01-31"),
            amount: Decimal::from_str("150.00").unwrap(),
            paid_date: date("2024-01-19"),
            receipt: Some("receipts/5-2-2024-01-31.jpg".into()),
        };
        db.report_payment(&payment).await.unwrap();

        let calendar = db.calendar(5, as_of, CalendarFilter::default()).await.unwrap();
        assert_eq!(calendar[1].status, Status::Done);
        assert_eq!(calendar[1].paid, Some(Decimal::from_str("150.00").unwrap()));
        assert_eq!(calendar[1].paid_date.as_deref(), Some("2024-01-19"));
        assert_eq!(
            calendar[1].receipt_url.as_deref(),
            Some("receipts/5-2-2024-01-31.jpg")
        );
    }

    #[tokio::test]
    async fn test_payment_for_unknown_charge() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        let payment = Payment {
            house_id: 5,
            contribution_id: 2,
            due_date: date("2030-01-01"),
            amount: Decimal::ONE,
            paid_date: date("2024-01-19"),
            receipt: None,
        };
        let err = db.report_payment(&payment).await.unwrap_err();
        assert!(err.to_string().contains("has no charge"));
    }

    #[tokio::test]
    async fn test_calendar_filters() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        let as_of = date("2024-01-20");

        let filter = CalendarFilter {
            contribution_id: Some(2),
            ..CalendarFilter::default()
        };
        let calendar = db.calendar(5, as_of, filter).await.unwrap();
        assert_eq!(calendar.len(), 1);
        assert_eq!(calendar[0].description.as_deref(), Some("Cuota mensual"));
        assert_eq!(calendar[0].period_days, Some(30));

        let filter = CalendarFilter {
            unpaid_only: true,
            ..CalendarFilter::default()
        };
        let calendar = db.calendar(9, as_of, filter).await.unwrap();
        let dates: Vec<_> = calendar.iter().map(|e| e.due_date.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-10"]);

        let filter = CalendarFilter {
            contribution_id: Some(2),
            unpaid_only: true,
        };
        assert!(db.calendar(9, as_of, filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_charge() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();

        let deleted = db.delete_charge(9, 1, date("2024-01-10")).await.unwrap();
        assert_eq!(deleted.group_id, Some(2));
        assert_eq!(deleted.completed, Completion::Done);
        assert_eq!(deleted.paid_date, Some(date("2024-01-09")));

        let calendar = db
            .calendar(9, date("2024-01-20"), CalendarFilter::default())
            .await
            .unwrap();
        assert_eq!(calendar.len(), 1);

        let err = db.delete_charge(9, 1, date("2024-01-10")).await.unwrap_err();
        assert!(err.to_string().contains("has no charge"));
    }
}
