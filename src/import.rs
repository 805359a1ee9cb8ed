//! Reads houses, contributions and charges from CSV files.
//!
//! Every file must have a header row. Columns are matched by name, so their order does not matter,
//! and empty cells are read as missing values. The whole file is validated before anything is
//! returned, and the first bad record fails the import with its line number.

use crate::error::Res;
use crate::model::{Charge, ChargeType, Completion, Contribution, House, Role};
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// The kinds of records that can be imported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    /// `id,responsible,role,location,email`
    Houses,
    /// `id,name,description,border_color,charge_day,period_days,charge_type`
    Contributions,
    /// `house_id,contribution_id,due_date,group_id,paid,done,paid_date,receipt_url`
    Charges,
}

serde_plain::derive_display_from_serialize!(Entity);
serde_plain::derive_fromstr_from_deserialize!(Entity);

// "id","responsible","role","location","email"
#[derive(Debug, Deserialize)]
struct HouseRecord {
    id: i64,
    responsible: String,
    role: Option<String>,
    location: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContributionRecord {
    id: i64,
    name: Option<String>,
    description: Option<String>,
    border_color: Option<String>,
    charge_day: Option<i64>,
    period_days: Option<i64>,
    charge_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargeRecord {
    house_id: i64,
    contribution_id: i64,
    due_date: String,
    group_id: Option<i64>,
    paid: Option<String>,
    done: Option<String>,
    paid_date: Option<String>,
    receipt_url: Option<String>,
}

pub(crate) fn read_houses(reader: impl Read) -> Res<Vec<House>> {
    read_records(reader, |r: HouseRecord| {
        Ok(House {
            id: r.id,
            responsible: r.responsible,
            role: match r.role {
                Some(role) => {
                    Role::from_str(&role).with_context(|| format!("Invalid role '{role}'"))?
                }
                None => Role::default(),
            },
            location: r.location,
            email: r.email,
        })
    })
}

pub(crate) fn read_contributions(reader: impl Read) -> Res<Vec<Contribution>> {
    read_records(reader, |r: ContributionRecord| {
        let charge_type = r
            .charge_type
            .map(|t| ChargeType::from_str(&t).with_context(|| format!("Invalid charge type '{t}'")))
            .transpose()?;
        Ok(Contribution {
            id: r.id,
            name: r.name,
            description: r.description,
            border_color: r.border_color,
            charge_day: r.charge_day,
            period_days: r.period_days,
            charge_type,
        })
    })
}

pub(crate) fn read_charges(reader: impl Read) -> Res<Vec<Charge>> {
    read_records(reader, |r: ChargeRecord| {
        Ok(Charge {
            house_id: r.house_id,
            contribution_id: r.contribution_id,
            due_date: parse_date(&r.due_date)?,
            group_id: r.group_id,
            paid: r
                .paid
                .map(|p| Decimal::from_str(&p).with_context(|| format!("Invalid amount '{p}'")))
                .transpose()?,
            completed: match r.done {
                Some(flag) => Completion::parse_flag(&flag)?,
                None => Completion::Pending,
            },
            paid_date: r.paid_date.as_deref().map(parse_date).transpose()?,
            receipt_url: r.receipt_url,
        })
    })
}

/// Opens `path` for one of the `read_*` functions.
pub(crate) fn open(path: &Path) -> Res<std::fs::File> {
    std::fs::File::open(path).with_context(|| format!("Unable to open file {}", path.display()))
}

fn parse_date(s: &str) -> Res<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

fn read_records<R, T, F>(reader: impl Read, convert: F) -> Res<Vec<T>>
where
    R: DeserializeOwned,
    F: Fn(R) -> Res<T>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut items = Vec::new();
    for (ix, result) in rdr.deserialize::<R>().enumerate() {
        // Line 1 is the header.
        let line = ix + 2;
        let record = result.with_context(|| format!("Unable to read the record on line {line}"))?;
        items.push(convert(record).with_context(|| format!("Invalid record on line {line}"))?);
    }
    Ok(items)
}
