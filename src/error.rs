//! Error types for the dues library.
//!
//! Internally everything returns `Res<T>`, which is an `anyhow::Result`. At the command boundary
//! the error is tagged with an `ErrorType` and becomes the public `Error` via `pub_result`.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad categories of failure that a caller may want to distinguish.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The dues home directory or `config.json` is missing or invalid.
    Config,
    /// A SQLite operation failed.
    Database,
    /// A CSV import file could not be read or validated.
    Import,
    /// The request refers to something that does not exist, e.g. an unknown house.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, source: anyhow::Error) -> Self {
        Self { error_type, source }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The alternate form prints the whole context chain.
        write!(f, "{} error: {:#}", self.error_type, self.source)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Converts an internal result into the public `Result` by tagging it with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context() {
        let res: Res<()> = Err(anyhow::anyhow!("no such file")).context("Unable to load config");
        let err = res.pub_result(ErrorType::Config).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        let message = err.to_string();
        assert!(message.starts_with("config error: "));
        assert!(message.contains("Unable to load config"));
        assert!(message.contains("no such file"));
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Database.to_string(), "database");
        assert_eq!("import".parse::<ErrorType>().unwrap(), ErrorType::Import);
    }
}
