//! Command handlers for the dues CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod calendar;
mod groups;
mod import;
mod init;
mod pay;
mod unassign;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use calendar::calendar;
pub use groups::groups;
pub use import::{import, ImportSummary};
pub use init::init;
pub use pay::pay;
pub use unassign::unassign;

/// What a command hands back to `main`: a line of text for the user and, for commands that
/// produce data, that data in serializable form.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T: Serialize + Clone + Debug> {
    message: String,
    structure: Option<T>,
}

impl<T: Serialize + Clone + Debug, S: Into<String>> From<S> for Out<T> {
    fn from(message: S) -> Self {
        Self::new_message(message)
    }
}

impl<T: Serialize + Clone + Debug> Out<T> {
    pub fn new(message: impl Into<String>, structure: T) -> Self {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// An output that carries no data.
    pub fn new_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Logs the message at info. The data, if any, is logged as pretty JSON at debug so that
    /// `--log-level debug` shows exactly what the command produced.
    pub fn print(&self) {
        info!("{}", self.message);
        let Some(structure) = &self.structure else {
            return;
        };
        match serde_json::to_string_pretty(structure) {
            Ok(json) => debug!("{json}"),
            Err(e) => debug!("The command output could not be serialized: {e}"),
        }
    }
}

/// The local date, used when a command is not given an explicit date.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{count} {}", if count == 1 { singular } else { plural })
}
