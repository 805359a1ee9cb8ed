//! These structs provide the CLI interface for the dues CLI.

use crate::import::Entity;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// dues: A command-line tool for keeping track of a residential community's dues.
///
/// Houses, contributions (recurring fees or work duties) and the charges that assign them to
/// houses are kept in a local SQLite database in the dues home directory. Data gets in by importing
/// CSV files. From there you can see the work groups each house belongs to, a house's own
/// calendar of charges, and report payments.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty database.
    ///
    /// This is the first command you should run. By default the data directory is $HOME/dues; pass
    /// --dues-home or set DUES_HOME to put it somewhere else.
    Init(InitArgs),
    /// Import houses, contributions or charges from a CSV file.
    ///
    /// The database is backed up before it is changed. Records that already exist are updated.
    Import(ImportArgs),
    /// Show the work groups as seen by a user.
    ///
    /// Admins see every group. Everyone else only sees the groups that include their own house.
    Groups(ViewArgs),
    /// Show one house's charges and whether each is done, pending or overdue.
    Calendar(CalendarArgs),
    /// Report the payment of a charge.
    Pay(PayArgs),
    /// Remove a charge that was assigned by mistake.
    ///
    /// The database is backed up before the charge is deleted.
    Unassign(ChargeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where dues data and configuration is held. Defaults to ~/dues
    #[arg(long, env = "DUES_HOME", default_value_t = default_dues_home())]
    dues_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, dues_home: PathBuf) -> Self {
        Self {
            log_level,
            dues_home: dues_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn dues_home(&self) -> &DisplayPath {
        &self.dues_home
    }
}

/// Args for the `dues init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The name of the residential community.
    #[arg(long)]
    community: String,
}

impl InitArgs {
    pub fn new(community: impl Into<String>) -> Self {
        Self {
            community: community.into(),
        }
    }

    pub fn community(&self) -> &str {
        &self.community
    }
}

/// Args for the `dues import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// What the file contains.
    #[arg(value_enum)]
    entity: Entity,

    /// The CSV file to import. It must have a header row.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(entity: Entity, file: impl Into<PathBuf>) -> Self {
        Self {
            entity,
            file: file.into(),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Args for the `dues groups` command, also shared by `dues calendar`.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// The id of the user (which is also the id of their house).
    #[arg(long)]
    user: i64,

    /// The date from which days are counted, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

impl ViewArgs {
    pub fn new(user: i64, as_of: Option<NaiveDate>) -> Self {
        Self { user, as_of }
    }

    pub fn user(&self) -> i64 {
        self.user
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }
}

/// Args for the `dues calendar` command.
#[derive(Debug, Parser, Clone)]
pub struct CalendarArgs {
    #[clap(flatten)]
    view: ViewArgs,

    /// Only show the charges of this contribution.
    #[arg(long)]
    contribution: Option<i64>,

    /// Only show charges that have not been paid or done yet.
    #[arg(long)]
    pending: bool,
}

impl CalendarArgs {
    pub fn new(view: ViewArgs) -> Self {
        Self {
            view,
            contribution: None,
            pending: false,
        }
    }

    pub fn with_contribution(mut self, contribution: i64) -> Self {
        self.contribution = Some(contribution);
        self
    }

    pub fn pending_only(mut self) -> Self {
        self.pending = true;
        self
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }

    pub fn contribution(&self) -> Option<i64> {
        self.contribution
    }

    pub fn pending(&self) -> bool {
        self.pending
    }
}

/// Args for the `dues unassign` command. A charge is identified by its house, its contribution
/// and its due date.
#[derive(Debug, Parser, Clone)]
pub struct ChargeArgs {
    #[arg(long)]
    house: i64,

    #[arg(long)]
    contribution: i64,

    /// The due date of the charge, as YYYY-MM-DD.
    #[arg(long)]
    due_date: NaiveDate,
}

impl ChargeArgs {
    pub fn new(house: i64, contribution: i64, due_date: NaiveDate) -> Self {
        Self {
            house,
            contribution,
            due_date,
        }
    }

    pub fn house(&self) -> i64 {
        self.house
    }

    pub fn contribution(&self) -> i64 {
        self.contribution
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}

/// Args for the `dues pay` command.
#[derive(Debug, Parser, Clone)]
pub struct PayArgs {
    /// The house that paid.
    #[arg(long)]
    house: i64,

    /// The contribution being paid.
    #[arg(long)]
    contribution: i64,

    /// The due date of the charge being paid, as YYYY-MM-DD.
    #[arg(long)]
    due_date: NaiveDate,

    /// The amount paid, e.g. 150.00
    #[arg(long)]
    amount: Decimal,

    /// The date of the payment, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    paid_date: Option<NaiveDate>,

    /// A reference to the receipt, e.g. the path of the uploaded image.
    #[arg(long)]
    receipt: Option<String>,
}

impl PayArgs {
    pub fn new(house: i64, contribution: i64, due_date: NaiveDate, amount: Decimal) -> Self {
        Self {
            house,
            contribution,
            due_date,
            amount,
            paid_date: None,
            receipt: None,
        }
    }

    pub fn with_paid_date(mut self, paid_date: NaiveDate) -> Self {
        self.paid_date = Some(paid_date);
        self
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }

    pub fn house(&self) -> i64 {
        self.house
    }

    pub fn contribution(&self) -> i64 {
        self.contribution
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid_date(&self) -> Option<NaiveDate> {
        self.paid_date
    }

    pub fn receipt(&self) -> Option<&str> {
        self.receipt.as_deref()
    }
}

fn default_dues_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("dues"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --dues-home or DUES_HOME instead of relying on the default \
                dues home directory.",
            );
            PathBuf::from("dues")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
