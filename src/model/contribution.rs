use crate::model::{Completion, Status};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a contribution is charged to each house individually or to a group of houses that
/// share the work.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeType {
    #[default]
    #[serde(alias = "casa")]
    House,
    #[serde(alias = "grupo")]
    Group,
}

serde_plain::derive_display_from_serialize!(ChargeType);
serde_plain::derive_fromstr_from_deserialize!(ChargeType);

/// A named recurring due or work duty owed by houses.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Contribution {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    /// A CSS-style color used when the contribution is displayed as a card.
    pub border_color: Option<String>,
    /// Day of the month on which the charge is generated.
    pub charge_day: Option<i64>,
    pub period_days: Option<i64>,
    pub charge_type: Option<ChargeType>,
}

/// One occurrence of a contribution charged to a house.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Charge {
    pub house_id: i64,
    pub contribution_id: i64,
    pub due_date: NaiveDate,
    pub group_id: Option<i64>,
    pub paid: Option<Decimal>,
    pub completed: Completion,
    pub paid_date: Option<NaiveDate>,
    pub receipt_url: Option<String>,
}

/// A payment reported by a house against one of its charges.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Payment {
    pub house_id: i64,
    pub contribution_id: i64,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub paid_date: NaiveDate,
    /// A reference to the uploaded receipt, e.g. a storage path.
    pub receipt: Option<String>,
}

/// One line of a house's own calendar of charges.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarEntry {
    pub contribution_id: i64,
    pub description: Option<String>,
    /// How often the contribution recurs, if it does.
    pub period_days: Option<i64>,
    pub due_date: String,
    pub days_remaining: i64,
    pub status: Status,
    pub paid: Option<Decimal>,
    pub paid_date: Option<String>,
    pub receipt_url: Option<String>,
}
