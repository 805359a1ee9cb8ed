//! Keeps track of a residential community's dues: houses, the contributions they owe, and the
//! work groups that share a contribution's turns.
//!
//! The heart of the crate is [`group_contributions`], which folds the flat rows of the datastore
//! into the nested work groups view as seen by one requester.

mod aggregate;
pub mod args;
mod backup;
pub mod commands;
mod config;
mod db;
mod error;
mod import;
pub mod model;
mod source;
mod utils;

#[cfg(test)]
mod test;

pub use aggregate::group_contributions;
pub use config::Config;
pub use error::{Error, ErrorType, IntoResult, Result};
pub use import::Entity;
pub use model::{
    CalendarEntry, Completion, ContributionRow, GroupedContribution, Requester, Role, Status,
};
